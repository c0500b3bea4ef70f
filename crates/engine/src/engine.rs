use parser::ast::{Ast, Statement};

use crate::memory::{MemoryBackend, QueryResults};

/// Outcome of executing a program: one entry per statement, in order. A
/// failing statement lands in `errors` and does not stop the rest.
#[derive(Debug)]
pub struct ExecuteResult {
    pub results: Vec<StatementResult>,
    pub errors: Vec<anyhow::Error>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum StatementResult {
    Created,
    Inserted,
    Rows(QueryResults),
}

/// Owns the catalog and runs parsed programs against it.
pub struct Engine {
    backend: MemoryBackend,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            backend: MemoryBackend::new(),
        }
    }

    pub fn execute(&mut self, program: &Ast) -> ExecuteResult {
        let mut results = vec![];
        let mut errors = vec![];

        if program.statements.is_empty() {
            log::debug!("no statements found");
        }

        for statement in &program.statements {
            let result = match statement {
                Statement::Create(create) => {
                    log::debug!("creating table {}", create.name.value);
                    self.backend
                        .create_table(create)
                        .map(|_| StatementResult::Created)
                }
                Statement::Insert(insert) => {
                    log::debug!("inserting into {}", insert.table.value);
                    self.backend.insert(insert).map(|_| StatementResult::Inserted)
                }
                Statement::Select(select) => {
                    log::debug!("selecting {} item(s)", select.items.len());
                    self.backend.select(select).map(StatementResult::Rows)
                }
            };

            match result {
                Ok(statement_result) => results.push(statement_result),
                Err(statement_error) => errors.push(statement_error.into()),
            }
        }

        ExecuteResult { results, errors }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

#[cfg(test)]
mod engine_tests {
    use crate::engine::*;
    use crate::memory::ExecuteError;

    #[test]
    fn test_execute_runs_statements_in_order() {
        let program = parser::parse(
            "CREATE TABLE t (a int); INSERT INTO t VALUES (5); SELECT a FROM t;",
        )
        .unwrap();

        let mut engine = Engine::new();
        let outcome = engine.execute(&program);

        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.results[0], StatementResult::Created);
        assert_eq!(outcome.results[1], StatementResult::Inserted);

        match &outcome.results[2] {
            StatementResult::Rows(results) => {
                assert_eq!(results.rows[0][0].as_int(), 5);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_failing_statement_does_not_stop_the_rest() {
        let program = parser::parse(
            "CREATE TABLE t (a int); \
             INSERT INTO missing VALUES (1); \
             INSERT INTO t VALUES (2); \
             SELECT a FROM t;",
        )
        .unwrap();

        let mut engine = Engine::new();
        let outcome = engine.execute(&program);

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(
            outcome.errors[0].downcast_ref::<ExecuteError>(),
            Some(&ExecuteError::TableDoesNotExist)
        );
    }

    #[test]
    fn test_empty_program_executes_to_nothing() {
        let program = parser::parse("").unwrap();

        let mut engine = Engine::new();
        let outcome = engine.execute(&program);

        assert!(outcome.results.is_empty());
        assert!(outcome.errors.is_empty());
    }
}

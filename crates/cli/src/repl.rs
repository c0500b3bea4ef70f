use std::{
    io::{stdin, stdout, Write},
    process::exit,
};

use cli_common::ParseError;
use engine::engine::{Engine, ExecuteResult, StatementResult};
use engine::memory::{ColumnType, QueryResults};

pub struct Repl {
    engine: Engine,
}

#[derive(Debug)]
pub enum ReplResult {
    Exit,
    Help,
    RunDebug,
    NoInput,
    UnrecognisedInput,
    Ok(CommandResult),
}

#[derive(Debug)]
pub enum CommandResult {
    ParseError(ParseError),
    Failed(String),
    Ok(ExecuteResult),
}

impl Repl {
    pub fn new() -> Self {
        Repl {
            engine: Engine::new(),
        }
    }

    pub fn run(&mut self) {
        loop {
            Repl::print_prompt();

            let mut buf = String::new();
            match stdin().read_line(&mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let command_status = self.handle_repl_command(&buf);

                    match command_status {
                        ReplResult::Ok(command_result) => print_command_result(&command_result),
                        ReplResult::Help => {
                            println!("Statements end with ';'. Try .dbg for a demo, .exit to leave.");
                        }
                        ReplResult::RunDebug => {
                            self.eval_and_report("CREATE TABLE users (id int, name text);");
                            self.eval_and_report("INSERT INTO users VALUES (1, 'alice');");
                            self.eval_and_report("SELECT id, name FROM users;");
                        }
                        ReplResult::UnrecognisedInput => {
                            println!("Error! Command not recognised.");
                        }
                        ReplResult::Exit => {
                            println!("Goodbye.");
                            break;
                        }
                        ReplResult::NoInput => {
                            continue;
                        }
                    };
                }
                Err(err) => eprintln!("{err}"),
            }
        }

        exit(0);
    }

    pub fn eval_command(&mut self, input: &str) -> CommandResult {
        match parser::parse(input) {
            Ok(program) => CommandResult::Ok(self.engine.execute(&program)),
            Err(e) => CommandResult::ParseError(e),
        }
    }

    pub fn eval_file(&mut self, file: &str) -> CommandResult {
        match std::fs::read_to_string(file) {
            Ok(file_content) => self.eval_command(&file_content),
            Err(_) => CommandResult::Failed(String::from("Failed to open file.")),
        }
    }

    fn eval_and_report(&mut self, input: &str) {
        let result = self.eval_command(input);
        print_command_result(&result);
    }

    /// Handle user input via REPL. This will either eval a command or
    /// short-circuit for a meta command.
    fn handle_repl_command(&mut self, buf: &str) -> ReplResult {
        let fmt_buf = buf.trim();

        if Repl::is_meta_command(fmt_buf) {
            Repl::handle_meta_command(fmt_buf)
        } else {
            let command_result = self.eval_command(fmt_buf);
            ReplResult::Ok(command_result)
        }
    }

    fn is_meta_command(buf: &str) -> bool {
        buf.starts_with('.') || buf.is_empty()
    }

    fn handle_meta_command(buf: &str) -> ReplResult {
        match buf.to_lowercase().as_ref() {
            ".exit" | ".quit" | ".close" => ReplResult::Exit,
            ".help" | ".h" | ".?" => ReplResult::Help,
            ".dbg" => ReplResult::RunDebug,
            "" => ReplResult::NoInput,
            _ => ReplResult::UnrecognisedInput,
        }
    }

    fn print_prompt() {
        print!("> ");
        stdout().flush().unwrap();
    }
}

pub fn print_command_result(result: &CommandResult) {
    match result {
        CommandResult::ParseError(err) => println!("Syntax Error: {err}"),
        CommandResult::Failed(err) => println!("Program Error: {err}"),
        CommandResult::Ok(outcome) => {
            for err in &outcome.errors {
                println!("Execution Error: {err}");
            }

            for result in &outcome.results {
                match result {
                    StatementResult::Created | StatementResult::Inserted => println!("ok"),
                    StatementResult::Rows(results) => {
                        print_query_results(results);
                        println!("ok");
                    }
                }
            }
        }
    }
}

fn print_query_results(results: &QueryResults) {
    if results.columns.is_empty() {
        println!("No results");
        return;
    }

    let mut builder = tabled::builder::Builder::default();
    builder.push_record(results.columns.iter().map(|column| column.name.clone()));

    for row in &results.rows {
        builder.push_record(row.iter().zip(&results.columns).map(|(cell, column)| {
            match column.column_type {
                ColumnType::Int => cell.as_int().to_string(),
                ColumnType::Text => cell.as_text().into_owned(),
            }
        }));
    }

    let mut table = builder.build();
    table.with(tabled::settings::Style::psql());
    println!("{table}");
}

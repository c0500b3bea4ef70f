use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use lexer::token::{Token, TokenKind};
use parser::ast::{CreateStatement, Expression, InsertStatement, SelectStatement};
use thiserror::Error;

/// The closed set of errors a backend operation can produce.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum ExecuteError {
    #[error("table does not exist")]
    TableDoesNotExist,
    #[error("column does not exist")]
    ColumnDoesNotExist,
    #[error("select item is not valid")]
    InvalidSelectItem,
    #[error("invalid datatype")]
    InvalidDatatype,
    #[error("missing values")]
    MissingValues,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ColumnType {
    Int,
    Text,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Int => write!(f, "int"),
            ColumnType::Text => write!(f, "text"),
        }
    }
}

/// An opaque byte-string cell. The column's declared type dictates how the
/// bytes are read back.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct MemoryCell(Vec<u8>);

impl MemoryCell {
    /// Encode a literal token. Numerics become an 8-byte big-endian signed
    /// integer, strings keep their raw UTF-8 bytes, anything else becomes
    /// an empty cell.
    fn from_token(token: &Token) -> MemoryCell {
        match token.kind {
            TokenKind::Numeric => {
                let n: i64 = token
                    .value
                    .parse()
                    .expect("numeric token does not hold a base-10 integer");
                MemoryCell(n.to_be_bytes().to_vec())
            }
            TokenKind::String => MemoryCell(token.value.as_bytes().to_vec()),
            _ => MemoryCell(Vec::new()),
        }
    }

    /// Read the cell as a big-endian signed 64-bit integer.
    pub fn as_int(&self) -> i64 {
        let bytes: [u8; 8] = self
            .0
            .as_slice()
            .try_into()
            .expect("int cell is not 8 bytes");
        i64::from_be_bytes(bytes)
    }

    /// Read the cell as text.
    pub fn as_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

// Column names, column types, and rows are parallel sequences; every row
// holds exactly one cell per column.
#[derive(Debug, Default)]
struct Table {
    columns: Vec<String>,
    column_types: Vec<ColumnType>,
    rows: Vec<Vec<MemoryCell>>,
}

/// A column descriptor in a result set.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ResultColumn {
    pub name: String,
    pub column_type: ColumnType,
}

/// A materialized result set, independent of the backend once returned.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct QueryResults {
    pub columns: Vec<ResultColumn>,
    pub rows: Vec<Vec<MemoryCell>>,
}

/// The catalog. Tables live here for the lifetime of the backend; rows are
/// append-only and there is no DROP.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: HashMap<String, Table>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend {
            tables: HashMap::new(),
        }
    }

    /// Register a table under the statement's name, then populate its
    /// columns. A datatype keyword other than `int`/`text` fails after the
    /// table is already registered, leaving it partially populated. A name
    /// collision silently replaces the previous table.
    pub fn create_table(&mut self, statement: &CreateStatement) -> Result<(), ExecuteError> {
        let name = statement.name.value.clone();

        self.tables.insert(name.clone(), Table::default());
        let table = self.tables.get_mut(&name).expect("table registered above");

        for column in &statement.columns {
            table.columns.push(column.name.value.clone());

            let datatype = match column.datatype.value.as_str() {
                "int" => ColumnType::Int,
                "text" => ColumnType::Text,
                _ => return Err(ExecuteError::InvalidDatatype),
            };
            table.column_types.push(datatype);
        }

        Ok(())
    }

    /// Append one row. The value count must match the column count before
    /// any cell is encoded.
    pub fn insert(&mut self, statement: &InsertStatement) -> Result<(), ExecuteError> {
        let table = self
            .tables
            .get_mut(&statement.table.value)
            .ok_or(ExecuteError::TableDoesNotExist)?;

        if statement.values.len() != table.columns.len() {
            return Err(ExecuteError::MissingValues);
        }

        let row = statement
            .values
            .iter()
            .map(|value| {
                let Expression::Literal(token) = value;
                MemoryCell::from_token(token)
            })
            .collect();

        table.rows.push(row);
        Ok(())
    }

    /// Project the selected columns over every row, in declaration order.
    /// Item positions are resolved once before the row loop; a
    /// non-identifier literal item is skipped and produces no column.
    /// Never mutates.
    pub fn select(&self, statement: &SelectStatement) -> Result<QueryResults, ExecuteError> {
        let from = statement
            .from
            .as_ref()
            .ok_or(ExecuteError::TableDoesNotExist)?;
        let table = self
            .tables
            .get(&from.value)
            .ok_or(ExecuteError::TableDoesNotExist)?;

        let mut columns = Vec::new();
        let mut positions = Vec::new();

        for item in &statement.items {
            let Expression::Literal(token) = item;

            if token.kind != TokenKind::Identifier {
                log::warn!("skipping non-identifier select item: {}", token.value);
                continue;
            }

            let position = table
                .columns
                .iter()
                .position(|column| column == &token.value)
                .ok_or(ExecuteError::ColumnDoesNotExist)?;

            columns.push(ResultColumn {
                name: token.value.clone(),
                column_type: table.column_types[position],
            });
            positions.push(position);
        }

        let rows = table
            .rows
            .iter()
            .map(|row| positions.iter().map(|&position| row[position].clone()).collect())
            .collect();

        Ok(QueryResults { columns, rows })
    }
}

use derive_more::derive::From;
use std::fmt;
use thiserror::Error;

/// Lexing failure: a byte no sub-lexer accepts.
/// `hint` names the most recent token produced before the failure, if any.
#[derive(Clone, PartialEq, Debug)]
pub struct LexError {
    pub hint: Option<String>,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hint {
            Some(hint) => write!(
                f,
                "unrecognized token after {hint}, at {}:{}",
                self.line, self.column
            ),
            None => write!(f, "unrecognized token at {}:{}", self.line, self.column),
        }
    }
}

impl std::error::Error for LexError {}

#[derive(Clone, PartialEq, Debug)]
pub enum SyntaxErrorKind {
    ExpectedStatement,
    ExpectedSemicolon,
    ExpectedTableName,
    ExpectedColumnName,
    ExpectedColumnType,
    ExpectedComma,
    ExpectedExpression,
    ExpectedLeftParen,
    ExpectedRightParen,
    ExpectedValuesKeyword,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxErrorKind::ExpectedStatement => write!(f, "expected statement"),
            SyntaxErrorKind::ExpectedSemicolon => {
                write!(f, "expected semicolon delimiter between statements")
            }
            SyntaxErrorKind::ExpectedTableName => write!(f, "expected table name"),
            SyntaxErrorKind::ExpectedColumnName => write!(f, "expected column name"),
            SyntaxErrorKind::ExpectedColumnType => write!(f, "expected column type"),
            SyntaxErrorKind::ExpectedComma => write!(f, "expected comma"),
            SyntaxErrorKind::ExpectedExpression => write!(f, "expected expression"),
            SyntaxErrorKind::ExpectedLeftParen => write!(f, "expected left parenthesis"),
            SyntaxErrorKind::ExpectedRightParen => write!(f, "expected right parenthesis"),
            SyntaxErrorKind::ExpectedValuesKeyword => write!(f, "expected VALUES"),
        }
    }
}

/// Parsing failure at a specific token. `got` holds the offending token's
/// value, or "end of input" when the stream ran out.
#[derive(Clone, PartialEq, Debug, Error)]
#[error("[{line},{column}]: {kind}, got: {got}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub got: String,
    pub line: u32,
    pub column: u32,
}

#[derive(Clone, PartialEq, Debug, From, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(LexError),
    #[error(transparent)]
    Syntax(SyntaxError),
}

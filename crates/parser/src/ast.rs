use lexer::token::Token;

/// A parsed program: a flat ordered sequence of statements.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Ast {
    pub statements: Vec<Statement>,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Create(CreateStatement),
}

/// `select <items> [from <table>]`. A missing `from` clause parses; the
/// backend rejects it when the statement is executed.
#[derive(Clone, PartialEq, Debug)]
pub struct SelectStatement {
    pub items: Vec<Expression>,
    pub from: Option<Token>,
}

/// `insert into <table> values ( <values> )`
#[derive(Clone, PartialEq, Debug)]
pub struct InsertStatement {
    pub table: Token,
    pub values: Vec<Expression>,
}

/// `create table <name> ( <columns> )`
#[derive(Clone, PartialEq, Debug)]
pub struct CreateStatement {
    pub name: Token,
    pub columns: Vec<ColumnDefinition>,
}

/// A column name plus its datatype keyword. The parser accepts any keyword
/// as the datatype; the backend rejects everything but `int` and `text`.
#[derive(Clone, PartialEq, Debug)]
pub struct ColumnDefinition {
    pub name: Token,
    pub datatype: Token,
}

/// Expressions are a single literal token today. Binary operators and
/// function calls belong here once they exist.
#[derive(Clone, PartialEq, Debug)]
pub enum Expression {
    Literal(Token),
}

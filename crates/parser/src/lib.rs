use cli_common::{ParseError, SyntaxError, SyntaxErrorKind};
use lexer::token::{Keyword, Symbol, Token, TokenKind};

pub mod ast;

use ast::*;

/// Lex and parse `source` into an Ast. An empty source yields an Ast with
/// zero statements.
pub fn parse(source: &str) -> Result<Ast, ParseError> {
    let tokens = lexer::lex(source)?;

    Parser::new(tokens).parse().map_err(ParseError::from)
}

/// Recursive descent over a token stream. Every sub-parser takes the
/// cursor as an explicit parameter and returns `Option<(T, usize)>`; on
/// failure the caller's cursor is untouched, which is what makes the
/// statement alternation composable without savepoints.
pub struct Parser {
    tokens: Vec<Token>,
    diagnostic: Option<(usize, SyntaxError)>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            diagnostic: None,
        }
    }

    /// Consume the whole stream into statements separated and terminated by
    /// one-or-more semicolons. Trailing semicolons are fine; a missing
    /// terminator is not.
    pub fn parse(mut self) -> Result<Ast, SyntaxError> {
        let mut statements = Vec::new();
        let mut cursor = 0;

        while cursor < self.tokens.len() {
            let Some((statement, new_cursor)) = self.parse_statement(cursor) else {
                return Err(self.deepest_or(cursor, SyntaxErrorKind::ExpectedStatement));
            };
            cursor = new_cursor;
            statements.push(statement);
            self.diagnostic = None;

            let mut at_least_one_semicolon = false;
            while self.expect_token(cursor, &Token::symbol(Symbol::Semicolon)) {
                cursor += 1;
                at_least_one_semicolon = true;
            }
            if !at_least_one_semicolon {
                return Err(self.syntax_error(cursor, SyntaxErrorKind::ExpectedSemicolon));
            }
        }

        Ok(Ast { statements })
    }

    fn parse_statement(&mut self, initial: usize) -> Option<(Statement, usize)> {
        if let Some((select, cursor)) = self.parse_select_statement(initial) {
            return Some((Statement::Select(select), cursor));
        }

        if let Some((insert, cursor)) = self.parse_insert_statement(initial) {
            return Some((Statement::Insert(insert), cursor));
        }

        if let Some((create, cursor)) = self.parse_create_table_statement(initial) {
            return Some((Statement::Create(create), cursor));
        }

        None
    }

    // select := 'select' expr_list ['from' identifier]
    fn parse_select_statement(&mut self, initial: usize) -> Option<(SelectStatement, usize)> {
        let mut cursor = initial;

        if !self.expect_token(cursor, &Token::keyword(Keyword::Select)) {
            return None;
        }
        cursor += 1;

        let stops = [
            Token::keyword(Keyword::From),
            Token::symbol(Symbol::Semicolon),
        ];
        let (items, new_cursor) = self.parse_expressions(cursor, &stops)?;
        cursor = new_cursor;

        let mut from = None;
        if self.expect_token(cursor, &Token::keyword(Keyword::From)) {
            cursor += 1;

            let Some((table, new_cursor)) = self.parse_token(cursor, TokenKind::Identifier) else {
                self.note(cursor, SyntaxErrorKind::ExpectedTableName);
                return None;
            };
            from = Some(table);
            cursor = new_cursor;
        }

        Some((SelectStatement { items, from }, cursor))
    }

    // insert := 'insert' 'into' identifier 'values' '(' expr_list ')'
    fn parse_insert_statement(&mut self, initial: usize) -> Option<(InsertStatement, usize)> {
        let mut cursor = initial;

        if !self.expect_token(cursor, &Token::keyword(Keyword::Insert)) {
            return None;
        }
        cursor += 1;

        if !self.expect_token(cursor, &Token::keyword(Keyword::Into)) {
            return None;
        }
        cursor += 1;

        let Some((table, new_cursor)) = self.parse_token(cursor, TokenKind::Identifier) else {
            self.note(cursor, SyntaxErrorKind::ExpectedTableName);
            return None;
        };
        cursor = new_cursor;

        if !self.expect_token(cursor, &Token::keyword(Keyword::Values)) {
            self.note(cursor, SyntaxErrorKind::ExpectedValuesKeyword);
            return None;
        }
        cursor += 1;

        if !self.expect_token(cursor, &Token::symbol(Symbol::LeftParen)) {
            self.note(cursor, SyntaxErrorKind::ExpectedLeftParen);
            return None;
        }
        cursor += 1;

        let stops = [Token::symbol(Symbol::RightParen)];
        let (values, new_cursor) = self.parse_expressions(cursor, &stops)?;
        cursor = new_cursor;

        if !self.expect_token(cursor, &Token::symbol(Symbol::RightParen)) {
            self.note(cursor, SyntaxErrorKind::ExpectedRightParen);
            return None;
        }
        cursor += 1;

        Some((InsertStatement { table, values }, cursor))
    }

    // create := 'create' 'table' identifier '(' col_def_list ')'
    fn parse_create_table_statement(&mut self, initial: usize) -> Option<(CreateStatement, usize)> {
        let mut cursor = initial;

        if !self.expect_token(cursor, &Token::keyword(Keyword::Create)) {
            return None;
        }
        cursor += 1;

        if !self.expect_token(cursor, &Token::keyword(Keyword::Table)) {
            return None;
        }
        cursor += 1;

        let Some((name, new_cursor)) = self.parse_token(cursor, TokenKind::Identifier) else {
            self.note(cursor, SyntaxErrorKind::ExpectedTableName);
            return None;
        };
        cursor = new_cursor;

        if !self.expect_token(cursor, &Token::symbol(Symbol::LeftParen)) {
            self.note(cursor, SyntaxErrorKind::ExpectedLeftParen);
            return None;
        }
        cursor += 1;

        let delimiter = Token::symbol(Symbol::RightParen);
        let (columns, new_cursor) = self.parse_column_definitions(cursor, &delimiter)?;
        cursor = new_cursor;

        if !self.expect_token(cursor, &Token::symbol(Symbol::RightParen)) {
            self.note(cursor, SyntaxErrorKind::ExpectedRightParen);
            return None;
        }
        cursor += 1;

        Some((CreateStatement { name, columns }, cursor))
    }

    // col_def_list := col_def (',' col_def)*  -- may be empty
    fn parse_column_definitions(
        &mut self,
        initial: usize,
        delimiter: &Token,
    ) -> Option<(Vec<ColumnDefinition>, usize)> {
        let mut cursor = initial;
        let mut columns = Vec::new();

        loop {
            if cursor >= self.tokens.len() {
                return None;
            }
            if &self.tokens[cursor] == delimiter {
                break;
            }

            if !columns.is_empty() {
                if !self.expect_token(cursor, &Token::symbol(Symbol::Comma)) {
                    self.note(cursor, SyntaxErrorKind::ExpectedComma);
                    return None;
                }
                cursor += 1;
            }

            let Some((name, new_cursor)) = self.parse_token(cursor, TokenKind::Identifier) else {
                self.note(cursor, SyntaxErrorKind::ExpectedColumnName);
                return None;
            };
            cursor = new_cursor;

            let Some((datatype, new_cursor)) = self.parse_token(cursor, TokenKind::Keyword) else {
                self.note(cursor, SyntaxErrorKind::ExpectedColumnType);
                return None;
            };
            cursor = new_cursor;

            columns.push(ColumnDefinition { name, datatype });
        }

        Some((columns, cursor))
    }

    // expr_list := expr (',' expr)*  -- may be empty; terminated by any
    // token in the caller's stop-set
    fn parse_expressions(
        &mut self,
        initial: usize,
        delimiters: &[Token],
    ) -> Option<(Vec<Expression>, usize)> {
        let mut cursor = initial;
        let mut expressions = Vec::new();

        'outer: loop {
            if cursor >= self.tokens.len() {
                return None;
            }

            let current = &self.tokens[cursor];
            for delimiter in delimiters {
                if delimiter == current {
                    break 'outer;
                }
            }

            if !expressions.is_empty() {
                if !self.expect_token(cursor, &Token::symbol(Symbol::Comma)) {
                    self.note(cursor, SyntaxErrorKind::ExpectedComma);
                    return None;
                }
                cursor += 1;
            }

            let Some((expression, new_cursor)) = self.parse_expression(cursor) else {
                self.note(cursor, SyntaxErrorKind::ExpectedExpression);
                return None;
            };
            cursor = new_cursor;
            expressions.push(expression);
        }

        Some((expressions, cursor))
    }

    // expr := identifier | numeric | string_literal
    fn parse_expression(&mut self, initial: usize) -> Option<(Expression, usize)> {
        const KINDS: [TokenKind; 3] = [
            TokenKind::Identifier,
            TokenKind::Numeric,
            TokenKind::String,
        ];

        for kind in KINDS {
            if let Some((token, cursor)) = self.parse_token(initial, kind) {
                return Some((Expression::Literal(token), cursor));
            }
        }

        None
    }

    /// Consume one token of the required kind, or fail without advancing.
    fn parse_token(&self, initial: usize, kind: TokenKind) -> Option<(Token, usize)> {
        let token = self.tokens.get(initial)?;

        if token.kind == kind {
            return Some((token.clone(), initial + 1));
        }
        None
    }

    fn expect_token(&self, cursor: usize, expected: &Token) -> bool {
        self.tokens.get(cursor).map_or(false, |t| t == expected)
    }

    /// Record an advisory at `cursor`, keeping only the deepest one.
    /// Alternatives that lose the alternation still leave their advisories
    /// behind; the deepest point reached is the one worth reporting.
    fn note(&mut self, cursor: usize, kind: SyntaxErrorKind) {
        if let Some((deepest, _)) = &self.diagnostic {
            if cursor < *deepest {
                return;
            }
        }

        let error = self.syntax_error(cursor, kind);
        self.diagnostic = Some((cursor, error));
    }

    fn deepest_or(&mut self, cursor: usize, kind: SyntaxErrorKind) -> SyntaxError {
        match self.diagnostic.take() {
            Some((_, error)) => error,
            None => self.syntax_error(cursor, kind),
        }
    }

    fn syntax_error(&self, cursor: usize, kind: SyntaxErrorKind) -> SyntaxError {
        let token = match self.tokens.get(cursor) {
            Some(token) => Some(token),
            None => self.tokens.last(),
        };

        match token {
            Some(token) => SyntaxError {
                kind,
                got: token.value.clone(),
                line: token.loc.line,
                column: token.loc.column,
            },
            None => SyntaxError {
                kind,
                got: String::from("end of input"),
                line: 0,
                column: 0,
            },
        }
    }
}

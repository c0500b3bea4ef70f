use cli_common::LexError;
use token::*;

pub mod token;

/// Byte offset plus the source position it corresponds to.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Cursor {
    pointer: usize,
    loc: Location,
}

/// What a sub-lexer produced: a token, or consumed bytes with nothing to
/// emit (whitespace).
enum Scanned {
    Emit(Token),
    Skip,
}

type SubLexer = fn(&str, Cursor) -> Option<(Scanned, Cursor)>;

/// Tokenize `source`. Succeeds when every byte is consumed by some
/// sub-lexer; fails at the first byte none accepts. Sub-lexers run in a
/// fixed order: keyword before identifier so `select` is not an identifier,
/// symbol early because it also consumes whitespace.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    const SUB_LEXERS: [SubLexer; 5] = [
        lex_keyword,
        lex_symbol,
        lex_string,
        lex_numeric,
        lex_identifier,
    ];

    let mut tokens: Vec<Token> = Vec::new();
    let mut cur = Cursor::default();

    'next: while cur.pointer < source.len() {
        for sub_lexer in SUB_LEXERS {
            if let Some((scanned, new_cursor)) = sub_lexer(source, cur) {
                cur = new_cursor;
                if let Scanned::Emit(token) = scanned {
                    tokens.push(token);
                }
                continue 'next;
            }
        }

        return Err(LexError {
            hint: tokens.last().map(|t| t.value.clone()),
            line: cur.loc.line,
            column: cur.loc.column,
        });
    }

    Ok(tokens)
}

fn lex_keyword(source: &str, ic: Cursor) -> Option<(Scanned, Cursor)> {
    let options: Vec<&'static str> = Keyword::ALL.iter().map(|k| k.as_str()).collect();
    let matched = longest_match(source, ic, &options)?;

    let mut cur = ic;
    cur.pointer += matched.len();
    cur.loc.column += matched.len() as u32;

    Some((
        Scanned::Emit(Token::new(matched, TokenKind::Keyword, ic.loc)),
        cur,
    ))
}

fn lex_symbol(source: &str, ic: Cursor) -> Option<(Scanned, Cursor)> {
    let bytes = source.as_bytes();
    let mut cur = ic;

    match bytes[ic.pointer] {
        b'\n' => {
            cur.pointer += 1;
            cur.loc.line += 1;
            cur.loc.column = 0;
            return Some((Scanned::Skip, cur));
        }
        b'\t' | b' ' => {
            cur.pointer += 1;
            cur.loc.column += 1;
            return Some((Scanned::Skip, cur));
        }
        _ => {}
    }

    let options: Vec<&'static str> = Symbol::ALL.iter().map(|s| s.as_str()).collect();
    let matched = longest_match(source, ic, &options)?;

    cur.pointer = ic.pointer + matched.len();
    cur.loc.column = ic.loc.column + matched.len() as u32;

    Some((
        Scanned::Emit(Token::new(matched, TokenKind::Symbol, ic.loc)),
        cur,
    ))
}

fn lex_string(source: &str, ic: Cursor) -> Option<(Scanned, Cursor)> {
    let (value, cur) = lex_character_delimited(source, ic, b'\'')?;

    Some((
        Scanned::Emit(Token::new(value, TokenKind::String, ic.loc)),
        cur,
    ))
}

fn lex_identifier(source: &str, ic: Cursor) -> Option<(Scanned, Cursor)> {
    // Double-quoted identifiers keep their text verbatim.
    if let Some((value, cur)) = lex_character_delimited(source, ic, b'"') {
        return Some((
            Scanned::Emit(Token::new(value, TokenKind::Identifier, ic.loc)),
            cur,
        ));
    }

    let bytes = source.as_bytes();
    let mut cur = ic;

    let c = bytes[cur.pointer];
    if !c.is_ascii_alphabetic() {
        return None;
    }

    let mut value = String::new();
    value.push(c.to_ascii_lowercase() as char);
    cur.pointer += 1;
    cur.loc.column += 1;

    while cur.pointer < bytes.len() {
        let c = bytes[cur.pointer];

        if c.is_ascii_alphanumeric() || c == b'$' || c == b'_' {
            value.push(c.to_ascii_lowercase() as char);
            cur.pointer += 1;
            cur.loc.column += 1;
            continue;
        }
        break;
    }

    Some((
        Scanned::Emit(Token::new(value, TokenKind::Identifier, ic.loc)),
        cur,
    ))
}

fn lex_numeric(source: &str, ic: Cursor) -> Option<(Scanned, Cursor)> {
    let bytes = source.as_bytes();
    let mut cur = ic;

    let mut decimal_found = false;
    let mut exponent_found = false;

    while cur.pointer < bytes.len() {
        let c = bytes[cur.pointer];

        let is_digit = c.is_ascii_digit();
        let is_decimal = c == b'.';
        let is_exponent = c == b'e' || c == b'E';

        // The first byte must open a number.
        if cur.pointer == ic.pointer {
            if !is_digit && !is_decimal {
                return None;
            }
            decimal_found = is_decimal;
            cur.pointer += 1;
            cur.loc.column += 1;
            continue;
        }

        if is_decimal {
            if decimal_found {
                return None;
            }
            decimal_found = true;
            cur.pointer += 1;
            cur.loc.column += 1;
            continue;
        }

        if is_exponent {
            if exponent_found {
                return None;
            }
            decimal_found = true;
            exponent_found = true;

            // An exponent at the end of input has nothing to bind to.
            if cur.pointer == bytes.len() - 1 {
                return None;
            }
            let next = bytes[cur.pointer + 1];
            if next == b'-' || next == b'+' {
                cur.pointer += 1;
                cur.loc.column += 1;
            }
            cur.pointer += 1;
            cur.loc.column += 1;
            continue;
        }

        if !is_digit {
            break;
        }
        cur.pointer += 1;
        cur.loc.column += 1;
    }

    if cur.pointer == ic.pointer {
        return None;
    }

    Some((
        Scanned::Emit(Token::new(
            &source[ic.pointer..cur.pointer],
            TokenKind::Numeric,
            ic.loc,
        )),
        cur,
    ))
}

/// Consume a run delimited by `delimiter`. A doubled delimiter inside the
/// run is an escape producing a single delimiter in the value. No match if
/// the opening delimiter is absent or the closing one never arrives.
fn lex_character_delimited(source: &str, ic: Cursor, delimiter: u8) -> Option<(String, Cursor)> {
    let bytes = source.as_bytes();

    if ic.pointer >= bytes.len() || bytes[ic.pointer] != delimiter {
        return None;
    }

    let mut cur = ic;
    cur.pointer += 1;
    cur.loc.column += 1;

    let mut value: Vec<u8> = Vec::new();
    while cur.pointer < bytes.len() {
        let c = bytes[cur.pointer];

        if c == delimiter {
            // Closing delimiter, unless doubled.
            if cur.pointer + 1 >= bytes.len() || bytes[cur.pointer + 1] != delimiter {
                cur.pointer += 1;
                cur.loc.column += 1;
                return Some((String::from_utf8_lossy(&value).into_owned(), cur));
            }
            cur.pointer += 1;
            cur.loc.column += 1;
        }

        value.push(c);
        cur.pointer += 1;
        cur.loc.column += 1;
    }

    None
}

/// Pick the longest option that exactly equals a prefix of the remaining
/// input, matching case-insensitively. Walks one byte at a time,
/// eliminating options that stop sharing a prefix with the accumulator or
/// are shorter than it; the winner is the longest exact hit. This is what
/// keeps `into` from lexing as `int` plus `o`.
fn longest_match<'a>(source: &str, ic: Cursor, options: &[&'a str]) -> Option<&'a str> {
    let bytes = source.as_bytes();

    let mut value = String::new();
    let mut eliminated = vec![false; options.len()];
    let mut best: Option<&'a str> = None;

    let mut pointer = ic.pointer;
    while pointer < bytes.len() {
        value.push(bytes[pointer].to_ascii_lowercase() as char);
        pointer += 1;

        for (i, option) in options.iter().enumerate() {
            if eliminated[i] {
                continue;
            }

            if *option == value {
                eliminated[i] = true;
                if option.len() > best.map_or(0, str::len) {
                    best = Some(option);
                }
                continue;
            }

            let too_long = value.len() > option.len();
            if too_long || !option.starts_with(&value) {
                eliminated[i] = true;
            }
        }

        if eliminated.iter().all(|&e| e) {
            break;
        }
    }

    best
}


#[cfg(test)]
mod lexer_tests {
    use crate::token::*;
    use crate::*;

    #[test]
    fn test_empty_source() {
        assert_eq!(lex(""), Ok(vec![]));
    }

    #[test]
    fn test_keyword_canonicalization() {
        let tokens = lex("SELECT Select select").unwrap();

        let expected = vec![
            Token::keyword(Keyword::Select),
            Token::keyword(Keyword::Select),
            Token::keyword(Keyword::Select),
        ];

        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_into_is_not_int_followed_by_o() {
        let tokens = lex("into").unwrap();

        assert_eq!(tokens, vec![Token::keyword(Keyword::Into)]);
    }

    #[test]
    fn test_symbols() {
        let tokens = lex(";*,()").unwrap();

        let expected = vec![
            Token::symbol(Symbol::Semicolon),
            Token::symbol(Symbol::Asterisk),
            Token::symbol(Symbol::Comma),
            Token::symbol(Symbol::LeftParen),
            Token::symbol(Symbol::RightParen),
        ];

        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_whitespace_emits_no_tokens() {
        assert_eq!(lex(" \t\n \t"), Ok(vec![]));
    }

    #[test]
    fn test_newline_advances_line_and_resets_column() {
        let tokens = lex("select\nid").unwrap();

        assert_eq!(tokens[0].loc, Location { line: 0, column: 0 });
        assert_eq!(tokens[1].loc, Location { line: 1, column: 0 });
    }

    #[test]
    fn test_token_locations_on_one_line() {
        let tokens = lex("select id, name").unwrap();

        assert_eq!(tokens[0].loc, Location { line: 0, column: 0 });
        assert_eq!(tokens[1].loc, Location { line: 0, column: 7 });
        assert_eq!(tokens[2].loc, Location { line: 0, column: 9 });
        assert_eq!(tokens[3].loc, Location { line: 0, column: 11 });
    }

    #[test]
    fn test_string_literal() {
        let tokens = lex("'hello'").unwrap();

        assert_eq!(
            tokens,
            vec![Token::new("hello", TokenKind::String, Location::default())]
        );
    }

    #[test]
    fn test_doubled_quote_escapes() {
        let tokens = lex("'it''s'").unwrap();

        assert_eq!(
            tokens,
            vec![Token::new("it's", TokenKind::String, Location::default())]
        );
    }

    #[test]
    fn test_unterminated_string_fails() {
        let err = lex("'abc").unwrap_err();

        assert_eq!(err.hint, None);
        assert_eq!((err.line, err.column), (0, 0));
    }

    #[test]
    fn test_numeric_integer() {
        let tokens = lex("123").unwrap();

        assert_eq!(
            tokens,
            vec![Token::new("123", TokenKind::Numeric, Location::default())]
        );
    }

    #[test]
    fn test_numeric_scientific() {
        let tokens = lex("1e+10").unwrap();

        assert_eq!(
            tokens,
            vec![Token::new("1e+10", TokenKind::Numeric, Location::default())]
        );
    }

    #[test]
    fn test_numeric_leading_decimal() {
        let tokens = lex(".5").unwrap();

        assert_eq!(
            tokens,
            vec![Token::new(".5", TokenKind::Numeric, Location::default())]
        );
    }

    #[test]
    fn test_numeric_double_decimal_fails() {
        assert!(lex("1..2").is_err());
    }

    #[test]
    fn test_numeric_dangling_exponent_fails() {
        assert!(lex("1e").is_err());
    }

    #[test]
    fn test_identifier_is_lowercased() {
        let tokens = lex("UserS").unwrap();

        assert_eq!(
            tokens,
            vec![Token::new(
                "users",
                TokenKind::Identifier,
                Location::default()
            )]
        );
    }

    #[test]
    fn test_identifier_with_dollar_and_underscore() {
        let tokens = lex("a$b_c1").unwrap();

        assert_eq!(
            tokens,
            vec![Token::new(
                "a$b_c1",
                TokenKind::Identifier,
                Location::default()
            )]
        );
    }

    #[test]
    fn test_double_quoted_identifier_kept_verbatim() {
        let tokens = lex("\"UsErS\"").unwrap();

        assert_eq!(
            tokens,
            vec![Token::new(
                "UsErS",
                TokenKind::Identifier,
                Location::default()
            )]
        );
    }

    #[test]
    fn test_unrecognized_byte_reports_prior_token() {
        let err = lex("select !").unwrap_err();

        assert_eq!(err.hint.as_deref(), Some("select"));
        assert_eq!((err.line, err.column), (0, 7));
    }

    #[test]
    fn test_select_statement_tokens() {
        let tokens = lex("SELECT id, name FROM users;").unwrap();

        let expected = vec![
            Token::keyword(Keyword::Select),
            Token::new("id", TokenKind::Identifier, Location::default()),
            Token::symbol(Symbol::Comma),
            Token::new("name", TokenKind::Identifier, Location::default()),
            Token::keyword(Keyword::From),
            Token::new("users", TokenKind::Identifier, Location::default()),
            Token::symbol(Symbol::Semicolon),
        ];

        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_insert_statement_tokens() {
        let tokens = lex("insert into t values (1, 'x');").unwrap();

        let expected = vec![
            Token::keyword(Keyword::Insert),
            Token::keyword(Keyword::Into),
            Token::new("t", TokenKind::Identifier, Location::default()),
            Token::keyword(Keyword::Values),
            Token::symbol(Symbol::LeftParen),
            Token::new("1", TokenKind::Numeric, Location::default()),
            Token::symbol(Symbol::Comma),
            Token::new("x", TokenKind::String, Location::default()),
            Token::symbol(Symbol::RightParen),
            Token::symbol(Symbol::Semicolon),
        ];

        assert_eq!(tokens, expected);
    }
}

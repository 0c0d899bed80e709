//! Phase 2: Parser
//!
//! The parser walks the token stream with a single cursor and builds one
//! mapping per indentation depth. Each nesting level is a recursive call to
//! [`Parser::parse_level`]; a level ends when a line with fewer leading tabs
//! appears, and those tabs are left in place for the enclosing level.

use tracing::{debug, trace};

use crate::error::{ParseContext, ParseError, Result};
use crate::token::{Token, TokenKind};
use crate::value::{Mapping, Value};

/// Returned by [`Parser::current`] when the cursor runs past the stream.
static END: Token = Token {
    kind: TokenKind::EndOfInput,
    literal: String::new(),
    line: 0,
    col: 0,
};

/// Parse a complete token stream into the root mapping.
pub fn parse_tokens(tokens: &[Token], ctx: &ParseContext) -> Result<Mapping> {
    Parser::new(tokens, ctx).parse_level(0)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    ctx: &'a ParseContext,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], ctx: &'a ParseContext) -> Self {
        Self { tokens, pos: 0, ctx }
    }

    /// Parse the entries of one nesting level.
    fn parse_level(&mut self, depth: usize) -> Result<Mapping> {
        trace!(depth, pos = self.pos, "enter level");
        let mut map = Mapping::new();

        loop {
            self.skip_blank_lines()?;

            if self.current().kind == TokenKind::EndOfInput {
                trace!(depth, entries = map.len(), "end of input");
                return Ok(map);
            }

            let tabs = self.count(TokenKind::Tab);
            if tabs > depth {
                let tok = self.current();
                return Err(self.error_at(
                    ParseError::TooManyTabs {
                        expected: depth,
                        got: tabs,
                        loc: String::new(),
                    },
                    tok,
                ));
            }
            if tabs < depth {
                if map.is_empty() {
                    let tok = self.current();
                    return Err(self.error_at(ParseError::IncompleteNested(String::new()), tok));
                }
                trace!(depth, entries = map.len(), "leave level");
                return Ok(map);
            }
            self.pos += depth;

            self.expect(TokenKind::Identifier)?;
            let key_tok = self.current();
            let key = key_tok.literal.clone();
            self.pos += 1;

            self.expect(TokenKind::ColonSign)?;
            self.pos += 1;

            let next = self.current();
            match next.kind {
                TokenKind::NewLine => {
                    self.pos += 1;
                    debug!(key = %key, depth = depth + 1, "nested mapping");
                    let sub = self.parse_level(depth + 1)?;
                    if sub.is_empty() {
                        return Err(
                            self.error_at(ParseError::UnfinishedNested(key, String::new()), key_tok)
                        );
                    }
                    self.insert(&mut map, key, key_tok, Value::Mapping(sub))?;
                }
                kind if kind.is_scalar() => {
                    if map.contains_key(&key) {
                        return Err(
                            self.error_at(ParseError::DuplicateKey(key, String::new()), key_tok)
                        );
                    }
                    let value = self.scalar(next)?;
                    self.pos += 1;
                    self.expect(TokenKind::NewLine)?;
                    self.insert(&mut map, key, key_tok, value)?;
                }
                TokenKind::Illegal => {
                    return Err(self.illegal(next));
                }
                kind => {
                    return Err(
                        self.error_at(ParseError::UnexpectedAfterColon(kind, String::new()), next)
                    );
                }
            }
        }
    }

    /// Skip newlines and comment lines before the next entry.
    fn skip_blank_lines(&mut self) -> Result<()> {
        loop {
            let tok = self.current();
            match tok.kind {
                TokenKind::NewLine => self.pos += 1,
                TokenKind::Comment => {
                    self.pos += 1;
                    let after = self.current();
                    if after.kind != TokenKind::NewLine {
                        return Err(self.error_at(
                            ParseError::ExpectedNewLineAfterComment(after.kind, String::new()),
                            after,
                        ));
                    }
                    self.pos += 1;
                }
                TokenKind::Illegal => return Err(self.illegal(tok)),
                _ => return Ok(()),
            }
        }
    }

    /// Store `key` in `map`, rejecting a key already present.
    fn insert(&self, map: &mut Mapping, key: String, key_tok: &Token, value: Value) -> Result<()> {
        if map.contains_key(&key) {
            return Err(self.error_at(ParseError::DuplicateKey(key, String::new()), key_tok));
        }
        trace!(key = %key, value = ?value, "entry");
        map.insert(key, value);
        Ok(())
    }

    /// Convert a scalar token to its value.
    fn scalar(&self, tok: &Token) -> Result<Value> {
        let invalid = || {
            self.error_at(
                ParseError::InvalidNumber(tok.literal.clone(), String::new()),
                tok,
            )
        };
        match tok.kind {
            TokenKind::Int => tok
                .literal
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| invalid()),
            TokenKind::Float => match tok.literal.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::Float(f)),
                _ => Err(invalid()),
            },
            TokenKind::String => Ok(Value::String(tok.literal.clone())),
            TokenKind::Bool => Ok(Value::Bool(tok.literal == "true")),
            kind => Err(self.error_at(ParseError::UnexpectedAfterColon(kind, String::new()), tok)),
        }
    }

    // ------------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------------

    fn current(&self) -> &'a Token {
        self.tokens.get(self.pos).unwrap_or(&END)
    }

    /// Count consecutive tokens of `kind` at the cursor without consuming them.
    fn count(&self, kind: TokenKind) -> usize {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .take_while(|t| t.kind == kind)
            .count()
    }

    /// Require the current token to be of `kind`.
    fn expect(&self, kind: TokenKind) -> Result<()> {
        let tok = self.current();
        if tok.kind == kind {
            return Ok(());
        }
        if tok.kind == TokenKind::Illegal {
            return Err(self.illegal(tok));
        }
        Err(self.error_at(
            ParseError::ExpectedToken {
                expected: kind,
                got: tok.kind,
                loc: String::new(),
            },
            tok,
        ))
    }

    fn illegal(&self, tok: &Token) -> ParseError {
        self.error_at(ParseError::IllegalToken(tok.literal.clone(), String::new()), tok)
    }

    fn error_at(&self, err: ParseError, tok: &Token) -> ParseError {
        err.with_location(self.ctx, tok.line, tok.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn tok(kind: TokenKind, literal: &str) -> Token {
        Token::new(kind, literal, 0, 0)
    }

    fn parse(tokens: &[Token]) -> Result<Mapping> {
        parse_tokens(tokens, &ParseContext::new(None))
    }

    #[test]
    fn test_parse_single_value() {
        let tokens = vec![
            tok(TokenKind::NewLine, "\n"),
            tok(TokenKind::Identifier, "lorem"),
            tok(TokenKind::ColonSign, ":"),
            tok(TokenKind::Int, "5"),
            tok(TokenKind::NewLine, "\n"),
            tok(TokenKind::EndOfInput, ""),
        ];
        let map = parse(&tokens).unwrap();
        assert_eq!(map, HashMap::from([("lorem".to_string(), Value::Integer(5))]));
    }

    #[test]
    fn test_parse_all_scalar_kinds() {
        let tokens = vec![
            tok(TokenKind::Identifier, "foo"),
            tok(TokenKind::ColonSign, ":"),
            tok(TokenKind::Int, "42"),
            tok(TokenKind::NewLine, "\n"),
            tok(TokenKind::Identifier, "bar"),
            tok(TokenKind::ColonSign, ":"),
            tok(TokenKind::Float, "3.14"),
            tok(TokenKind::NewLine, "\n"),
            tok(TokenKind::Identifier, "str"),
            tok(TokenKind::ColonSign, ":"),
            tok(TokenKind::String, "lorem ipsum"),
            tok(TokenKind::NewLine, "\n"),
            tok(TokenKind::Identifier, "yes"),
            tok(TokenKind::ColonSign, ":"),
            tok(TokenKind::Bool, "true"),
            tok(TokenKind::NewLine, "\n"),
            tok(TokenKind::Identifier, "no"),
            tok(TokenKind::ColonSign, ":"),
            tok(TokenKind::Bool, "false"),
            tok(TokenKind::NewLine, "\n"),
            tok(TokenKind::EndOfInput, ""),
        ];
        let map = parse(&tokens).unwrap();
        assert_eq!(map["foo"], Value::Integer(42));
        assert_eq!(map["bar"], Value::Float(3.14));
        assert_eq!(map["str"], Value::String("lorem ipsum".into()));
        assert_eq!(map["yes"], Value::Bool(true));
        assert_eq!(map["no"], Value::Bool(false));
    }

    #[test]
    fn test_nested_level_leaves_tabs_for_parent() {
        // a:
        // \tb:
        // \t\tc: 1
        // \td: 2
        let tokens = vec![
            tok(TokenKind::Identifier, "a"),
            tok(TokenKind::ColonSign, ":"),
            tok(TokenKind::NewLine, "\n"),
            tok(TokenKind::Tab, "\t"),
            tok(TokenKind::Identifier, "b"),
            tok(TokenKind::ColonSign, ":"),
            tok(TokenKind::NewLine, "\n"),
            tok(TokenKind::Tab, "\t"),
            tok(TokenKind::Tab, "\t"),
            tok(TokenKind::Identifier, "c"),
            tok(TokenKind::ColonSign, ":"),
            tok(TokenKind::Int, "1"),
            tok(TokenKind::NewLine, "\n"),
            tok(TokenKind::Tab, "\t"),
            tok(TokenKind::Identifier, "d"),
            tok(TokenKind::ColonSign, ":"),
            tok(TokenKind::Int, "2"),
            tok(TokenKind::NewLine, "\n"),
            tok(TokenKind::EndOfInput, ""),
        ];
        let map = parse(&tokens).unwrap();
        let a = map["a"].as_mapping().unwrap();
        assert_eq!(a["d"], Value::Integer(2));
        assert_eq!(a["b"].get("c"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_missing_end_of_input_is_treated_as_end() {
        let tokens = vec![
            tok(TokenKind::Identifier, "a"),
            tok(TokenKind::ColonSign, ":"),
            tok(TokenKind::Int, "1"),
            tok(TokenKind::NewLine, "\n"),
        ];
        assert_eq!(parse(&tokens).unwrap()["a"], Value::Integer(1));
    }

    #[test]
    fn test_comment_must_be_followed_by_new_line() {
        let tokens = vec![
            tok(TokenKind::Comment, "// note"),
            tok(TokenKind::Identifier, "a"),
            tok(TokenKind::ColonSign, ":"),
            tok(TokenKind::Int, "1"),
            tok(TokenKind::NewLine, "\n"),
            tok(TokenKind::EndOfInput, ""),
        ];
        assert!(matches!(
            parse(&tokens),
            Err(ParseError::ExpectedNewLineAfterComment(TokenKind::Identifier, _))
        ));
    }

    #[test]
    fn test_unexpected_token_after_colon() {
        let tokens = vec![
            tok(TokenKind::Identifier, "a"),
            tok(TokenKind::ColonSign, ":"),
            tok(TokenKind::Tab, "\t"),
            tok(TokenKind::EndOfInput, ""),
        ];
        assert!(matches!(
            parse(&tokens),
            Err(ParseError::UnexpectedAfterColon(TokenKind::Tab, _))
        ));
    }

    #[test]
    fn test_missing_colon_token() {
        let tokens = vec![
            tok(TokenKind::Identifier, "a"),
            tok(TokenKind::Int, "1"),
            tok(TokenKind::NewLine, "\n"),
            tok(TokenKind::EndOfInput, ""),
        ];
        assert!(matches!(
            parse(&tokens),
            Err(ParseError::ExpectedToken {
                expected: TokenKind::ColonSign,
                got: TokenKind::Int,
                ..
            })
        ));
    }

    #[test]
    fn test_illegal_token_is_reported() {
        let tokens = vec![
            tok(TokenKind::Identifier, "a"),
            tok(TokenKind::ColonSign, ":"),
            tok(TokenKind::Illegal, "boom"),
        ];
        match parse(&tokens) {
            Err(ParseError::IllegalToken(msg, _)) => assert_eq!(msg, "boom"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_integer_overflow_is_an_error() {
        let tokens = vec![
            tok(TokenKind::Identifier, "big"),
            tok(TokenKind::ColonSign, ":"),
            tok(TokenKind::Int, "9223372036854775808"),
            tok(TokenKind::NewLine, "\n"),
            tok(TokenKind::EndOfInput, ""),
        ];
        match parse(&tokens) {
            Err(ParseError::InvalidNumber(lit, _)) => assert_eq!(lit, "9223372036854775808"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

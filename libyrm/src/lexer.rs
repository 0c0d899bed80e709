//! Phase 1: Lexer
//!
//! The lexer converts source text into a flat token stream. It is a state
//! machine over bytes: every state consumes some input, emits zero or more
//! tokens, and names the state to run next. Lexing stops after the first
//! `EndOfInput` or `Illegal` token.
//!
//! - `NewLine`: start of a line (tabs, comments, keys, blank lines)
//! - `Identifier` / `Colon`: a key and the colon that must follow it
//! - `Value`: whitespace after the colon, then a scalar or a newline
//! - `Number` / `Bool` / `String`: scalar literals
//! - `Comment`: a `//` line

use tracing::trace;

use crate::error::{ParseContext, ParseError, Result};
use crate::token::{Token, TokenKind};

/// Lexer state; each variant names the routine that runs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NewLine,
    Identifier,
    Colon,
    Value,
    Number,
    Bool,
    String,
    Comment,
    /// Terminal: end of input or an illegal token was emitted.
    Halt,
}

/// Byte-level lexer over a single input.
struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    ctx: &'a ParseContext,
    /// Start of the pending token.
    start: usize,
    /// Current byte position.
    pos: usize,
    /// Zero-based line number at `start`.
    line: usize,
    /// Byte offset where `line` begins.
    line_start: usize,
    tokens: Vec<Token>,
    error: Option<ParseError>,
}

/// Scan source text into tokens, reporting the first lexical error.
pub fn lex(input: &str, ctx: &ParseContext) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(input, ctx);
    lexer.run();
    match lexer.error {
        Some(err) => Err(err),
        None => Ok(lexer.tokens),
    }
}

/// Scan source text into the raw token stream.
///
/// On malformed input the stream ends with a single [`TokenKind::Illegal`]
/// token whose literal is the error message; otherwise it ends with
/// [`TokenKind::EndOfInput`].
pub fn tokenize(input: &str) -> Vec<Token> {
    let ctx = ParseContext::default();
    let mut lexer = Lexer::new(input, &ctx);
    lexer.run();
    lexer.tokens
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str, ctx: &'a ParseContext) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            ctx,
            start: 0,
            pos: 0,
            line: 0,
            line_start: 0,
            tokens: Vec::new(),
            error: None,
        }
    }

    fn run(&mut self) {
        let mut state = State::NewLine;
        while state != State::Halt {
            trace!(?state, pos = self.pos, "lexer state");
            state = match state {
                State::NewLine => self.lex_new_line(),
                State::Identifier => self.lex_identifier(),
                State::Colon => self.lex_colon(),
                State::Value => self.lex_value(),
                State::Number => self.lex_number(),
                State::Bool => self.lex_bool(),
                State::String => self.lex_string(),
                State::Comment => self.lex_comment(),
                State::Halt => State::Halt,
            };
        }
    }

    // ------------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------------

    fn current(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        if self.pos < self.bytes.len() {
            self.pos += 1;
        }
    }

    /// Consume bytes while `pred` holds.
    fn accept_run(&mut self, pred: impl Fn(u8) -> bool) {
        while self.current().is_some_and(&pred) {
            self.pos += 1;
        }
    }

    /// Drop the pending text without emitting it.
    fn ignore(&mut self) {
        self.start = self.pos;
    }

    /// Emit the pending text as a token of `kind`.
    fn emit(&mut self, kind: TokenKind) {
        let tok = Token::new(
            kind,
            &self.input[self.start..self.pos],
            self.line,
            self.start - self.line_start,
        );
        trace!(kind = %tok.kind, literal = ?tok.literal, line = tok.line, col = tok.col, "token");
        self.tokens.push(tok);
        self.start = self.pos;
        if kind == TokenKind::NewLine {
            self.line += 1;
            self.line_start = self.pos;
        }
    }

    /// Emit the terminal end-of-input token.
    fn emit_end(&mut self) -> State {
        self.ignore();
        self.emit(TokenKind::EndOfInput);
        State::Halt
    }

    /// Emit an illegal token for `err` at the current position and halt.
    fn illegal(&mut self, err: ParseError) -> State {
        let col = self.pos - self.line_start;
        let err = err.with_location(self.ctx, self.line, col);
        trace!(error = %err, "illegal token");
        self.tokens.push(Token::new(
            TokenKind::Illegal,
            err.to_string(),
            self.line,
            col,
        ));
        self.error = Some(err);
        State::Halt
    }

    /// The character at the current position, for error messages.
    fn current_char(&self) -> char {
        self.input[self.pos..]
            .chars()
            .next()
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    // ------------------------------------------------------------------------
    // States
    // ------------------------------------------------------------------------

    fn lex_new_line(&mut self) -> State {
        match self.current() {
            Some(b'\n') => {
                self.advance();
                self.emit(TokenKind::NewLine);
                State::NewLine
            }
            Some(b'\t') => {
                self.advance();
                self.emit(TokenKind::Tab);
                State::NewLine
            }
            Some(b'/') => State::Comment,
            Some(b) if is_letter(b) => State::Identifier,
            Some(b' ') => {
                self.advance();
                self.ignore();
                State::NewLine
            }
            None => self.emit_end(),
            Some(_) => {
                let c = self.current_char();
                self.illegal(ParseError::UnexpectedChar(c, String::new()))
            }
        }
    }

    fn lex_identifier(&mut self) -> State {
        self.accept_run(is_letter);
        self.emit(TokenKind::Identifier);
        State::Colon
    }

    fn lex_colon(&mut self) -> State {
        if self.current() != Some(b':') {
            return self.illegal(ParseError::ExpectedColon(String::new()));
        }
        self.advance();
        self.emit(TokenKind::ColonSign);
        State::Value
    }

    fn lex_value(&mut self) -> State {
        self.accept_run(|b| b == b' ' || b == b'\t');
        self.ignore();

        match self.current() {
            Some(b'\n') => {
                self.advance();
                self.emit(TokenKind::NewLine);
                State::NewLine
            }
            Some(b'0'..=b'9' | b'+' | b'-' | b'.') => State::Number,
            Some(b'"') => State::String,
            Some(b't' | b'f') => State::Bool,
            None => self.emit_end(),
            Some(_) => {
                let c = self.current_char();
                self.illegal(ParseError::UnknownIdentifier(c, String::new()))
            }
        }
    }

    fn lex_number(&mut self) -> State {
        if matches!(self.current(), Some(b'+' | b'-')) {
            self.advance();
        }
        self.accept_run(is_digit);
        if self.current() == Some(b'.') {
            self.advance();
            self.accept_run(is_digit);
            self.emit(TokenKind::Float);
        } else {
            self.emit(TokenKind::Int);
        }
        State::Value
    }

    fn lex_bool(&mut self) -> State {
        let expected: &'static str = if self.current() == Some(b't') {
            "true"
        } else {
            "false"
        };
        for &b in expected.as_bytes() {
            if self.current() != Some(b) {
                return self.illegal(ParseError::InvalidBool(expected, String::new()));
            }
            self.advance();
        }
        self.emit(TokenKind::Bool);
        State::Value
    }

    fn lex_string(&mut self) -> State {
        // Opening quote
        self.advance();
        self.ignore();

        loop {
            match self.current() {
                Some(b'\\') => match self.peek(1) {
                    None | Some(b'\n') => {
                        self.advance();
                        return self.illegal(ParseError::UnterminatedString(String::new()));
                    }
                    Some(_) => self.pos += 2,
                },
                None | Some(b'\n') => {
                    return self.illegal(ParseError::UnterminatedString(String::new()));
                }
                Some(b'"') => break,
                Some(_) => self.advance(),
            }
        }

        self.emit(TokenKind::String);

        // Closing quote
        self.advance();
        self.ignore();
        State::Value
    }

    fn lex_comment(&mut self) -> State {
        if self.current() != Some(b'/') || self.peek(1) != Some(b'/') {
            return self.illegal(ParseError::MalformedComment(String::new()));
        }
        self.accept_run(|b| b != b'\n');
        self.emit(TokenKind::Comment);

        if self.current() == Some(b'\n') {
            self.advance();
            self.emit(TokenKind::NewLine);
            State::NewLine
        } else {
            self.emit_end()
        }
    }
}

fn is_letter(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_digit(b: u8) -> bool {
    b.is_ascii_digit() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).iter().map(|t| t.kind).collect()
    }

    fn lex_err(input: &str) -> ParseError {
        lex(input, &ParseContext::new(None)).unwrap_err()
    }

    #[test]
    fn test_empty_input() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, EndOfInput);
        assert_eq!(tokens[0].literal, "");
    }

    #[test]
    fn test_simple_value() {
        let tokens = tokenize("value: \t 5   \t\n");
        let pairs: Vec<(TokenKind, &str)> =
            tokens.iter().map(|t| (t.kind, t.literal.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                (Identifier, "value"),
                (ColonSign, ":"),
                (Int, "5"),
                (NewLine, "\n"),
                (EndOfInput, ""),
            ]
        );
    }

    #[test]
    fn test_nested_block() {
        assert_eq!(
            kinds("bar:\n\tbaz: \t7\t\n"),
            vec![Identifier, ColonSign, NewLine, Tab, Identifier, ColonSign, Int, NewLine, EndOfInput]
        );
    }

    #[test]
    fn test_key_without_value_at_end() {
        assert_eq!(kinds("thing:"), vec![Identifier, ColonSign, EndOfInput]);
    }

    #[test]
    fn test_missing_colon() {
        assert_eq!(kinds("something"), vec![Identifier, Illegal]);
        assert!(matches!(lex_err("something"), ParseError::ExpectedColon(_)));
        assert!(matches!(lex_err("key = 1\n"), ParseError::ExpectedColon(_)));
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("a: 0.0\nb: 15823\nc: -1_000\nd: +.5\ne: 3.\n");
        let nums: Vec<(TokenKind, &str)> = tokens
            .iter()
            .filter(|t| matches!(t.kind, Int | Float))
            .map(|t| (t.kind, t.literal.as_str()))
            .collect();
        assert_eq!(
            nums,
            vec![
                (Float, "0.0"),
                (Int, "15823"),
                (Int, "-1_000"),
                (Float, "+.5"),
                (Float, "3."),
            ]
        );
    }

    #[test]
    fn test_string_literal_is_raw() {
        let tokens = tokenize(r#"s: "lorem \"ipsum\" \n""#);
        assert_eq!(tokens[2].kind, String);
        assert_eq!(tokens[2].literal, r#"lorem \"ipsum\" \n"#);
        assert_eq!(tokens[3].kind, EndOfInput);
    }

    #[test]
    fn test_string_with_utf8() {
        let tokens = tokenize("s: \"grüße\"\n");
        assert_eq!(tokens[2].literal, "grüße");
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(
            lex_err("a: \"unterminated\n"),
            ParseError::UnterminatedString(_)
        ));
        assert!(matches!(
            lex_err("a: \"unterminated"),
            ParseError::UnterminatedString(_)
        ));
        assert!(matches!(
            lex_err("a: \"escape at end\\"),
            ParseError::UnterminatedString(_)
        ));
        assert!(matches!(
            lex_err("a: \"escaped newline\\\n\""),
            ParseError::UnterminatedString(_)
        ));
    }

    #[test]
    fn test_booleans() {
        let tokens = tokenize("a: true\nb: false\n");
        let bools: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == Bool)
            .map(|t| t.literal.as_str())
            .collect();
        assert_eq!(bools, vec!["true", "false"]);
    }

    #[test]
    fn test_invalid_booleans() {
        assert!(matches!(lex_err("a: tru\n"), ParseError::InvalidBool("true", _)));
        assert!(matches!(lex_err("a: fals"), ParseError::InvalidBool("false", _)));
        assert!(matches!(lex_err("a: fire\n"), ParseError::InvalidBool("false", _)));
    }

    #[test]
    fn test_unknown_value_start() {
        assert_eq!(kinds("a: yes\n"), vec![Identifier, ColonSign, Illegal]);
        match lex_err("a: yes\n") {
            ParseError::UnknownIdentifier(c, loc) => {
                assert_eq!(c, 'y');
                assert_eq!(loc, " at 1:4");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_comment_lines() {
        let tokens = tokenize("// some comment\nx: 1\n");
        assert_eq!(tokens[0].kind, Comment);
        assert_eq!(tokens[0].literal, "// some comment");
        assert_eq!(tokens[1].kind, NewLine);

        let tokens = tokenize("// some comment");
        assert_eq!(tokens[0].literal, "// some comment");
        assert_eq!(tokens[1].kind, EndOfInput);
    }

    #[test]
    fn test_malformed_comment() {
        assert_eq!(kinds("/ oops\n"), vec![Illegal]);
        assert!(matches!(lex_err("/ oops\n"), ParseError::MalformedComment(_)));
    }

    #[test]
    fn test_unexpected_line_start() {
        assert!(matches!(
            lex_err("1: 2\n"),
            ParseError::UnexpectedChar('1', _)
        ));
        assert!(matches!(
            lex_err("a: 1\r\n"),
            ParseError::UnknownIdentifier('\r', _)
        ));
    }

    #[test]
    fn test_leading_spaces_are_ignored() {
        assert_eq!(
            kinds("  a: 1\n"),
            vec![Identifier, ColonSign, Int, NewLine, EndOfInput]
        );
    }

    #[test]
    fn test_token_positions() {
        let tokens = tokenize("a:\n\tbc: 12\n");
        let bc = &tokens[4];
        assert_eq!(bc.kind, Identifier);
        assert_eq!((bc.line, bc.col), (1, 1));
        let int = &tokens[6];
        assert_eq!(int.kind, Int);
        assert_eq!((int.line, int.col), (1, 5));
    }

    #[test]
    fn test_error_location_uses_filename() {
        let ctx = ParseContext::new(Some("conf.yrm"));
        let err = lex("a: 1\nb: ?\n", &ctx).unwrap_err();
        assert_eq!(err.to_string(), "Unknown identifier '?' at 2:4 of <conf.yrm>");
    }

    #[test]
    fn test_lexing_stops_at_first_illegal() {
        let tokens = tokenize("a: ?\nb: 1\n");
        assert_eq!(tokens.last().map(|t| t.kind), Some(Illegal));
        assert_eq!(tokens.len(), 3);
    }
}

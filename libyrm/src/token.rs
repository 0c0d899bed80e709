//! Token model shared by the lexer and the parser.

use std::fmt;

/// Kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A key: `[A-Za-z_]+`.
    Identifier,
    /// The `:` after a key.
    ColonSign,
    /// A `\n` byte.
    NewLine,
    /// One indentation tab.
    Tab,
    /// A full `//...` line, newline excluded.
    Comment,
    Int,
    Float,
    /// Quoted string content, quotes excluded and escapes left raw.
    String,
    Bool,
    EndOfInput,
    /// Lexical error sentinel; the literal holds the message.
    Illegal,
}

impl TokenKind {
    /// Returns `true` for the kinds that carry a scalar value.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            TokenKind::Int | TokenKind::Float | TokenKind::String | TokenKind::Bool
        )
    }

    fn name(self) -> &'static str {
        match self {
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::ColonSign => "COLON_SIGN",
            TokenKind::NewLine => "NEW_LINE",
            TokenKind::Tab => "TAB",
            TokenKind::Comment => "COMMENT",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::String => "STRING",
            TokenKind::Bool => "BOOL",
            TokenKind::EndOfInput => "EOF",
            TokenKind::Illegal => "ILLEGAL",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single token in the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    /// Zero-based line of the token's first byte.
    pub line: usize,
    /// Zero-based byte column of the token's first byte.
    pub col: usize,
}

impl Token {
    /// Create a token.
    pub fn new(kind: TokenKind, literal: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            kind,
            literal: literal.into(),
            line,
            col,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Illegal
            | TokenKind::EndOfInput
            | TokenKind::ColonSign
            | TokenKind::NewLine
            | TokenKind::Tab => write!(f, "{}", self.kind),
            _ => write!(f, "{} with value '{}'", self.kind, self.literal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_structural_token() {
        let tok = Token::new(TokenKind::ColonSign, ":", 0, 3);
        assert_eq!(tok.to_string(), "COLON_SIGN");
    }

    #[test]
    fn test_display_valued_token() {
        let tok = Token::new(TokenKind::Int, "8080", 0, 6);
        assert_eq!(tok.to_string(), "INT with value '8080'");
    }

    #[test]
    fn test_is_scalar() {
        assert!(TokenKind::Bool.is_scalar());
        assert!(TokenKind::String.is_scalar());
        assert!(!TokenKind::NewLine.is_scalar());
        assert!(!TokenKind::Identifier.is_scalar());
    }
}

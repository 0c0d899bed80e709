//! Error types for YRM parsing and encoding.

use std::io;

use thiserror::Error;

use crate::token::TokenKind;

/// Result type for YRM parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format a location suffix for error messages.
    pub fn loc_suffix(&self, line: usize, col: usize) -> String {
        match &self.filename {
            Some(name) => format!(" at {}:{} of <{}>", line + 1, col + 1, name),
            None => format!(" at {}:{}", line + 1, col + 1),
        }
    }
}

/// Error type for YRM parsing.
///
/// The trailing `String` of each located variant is the location suffix
/// produced by [`ParseContext::loc_suffix`].
#[derive(Error, Debug)]
pub enum ParseError {
    /// A key was not followed by a colon.
    #[error("Expected ':' after key{0}")]
    ExpectedColon(String),

    /// A value started with a byte that begins no scalar.
    #[error("Unknown identifier {0:?}{1}")]
    UnknownIdentifier(char, String),

    /// A line started with a byte that begins no key, tab or comment.
    #[error("Unexpected character {0:?} at line start{1}")]
    UnexpectedChar(char, String),

    /// A value starting with `t` or `f` that is not `true` or `false`.
    #[error("Invalid boolean value (expected '{0}'){1}")]
    InvalidBool(&'static str, String),

    /// Newline or end of input inside a quoted string.
    #[error("Unterminated quoted string{0}")]
    UnterminatedString(String),

    /// A single `/` at the start of a line.
    #[error("Comment must start with two forward slashes{0}")]
    MalformedComment(String),

    /// A line indented deeper than the current nesting level.
    #[error("Expected {expected} tabs, got {got} tabs{loc}")]
    TooManyTabs {
        expected: usize,
        got: usize,
        loc: String,
    },

    /// Dedent out of a nesting level that holds no entries.
    #[error("Incomplete nested structure{0}")]
    IncompleteNested(String),

    /// A `key:` block that closed without any entries.
    #[error("Unfinished nested structure under \"{0}\"{1}")]
    UnfinishedNested(String, String),

    /// The same key written twice in one mapping.
    #[error("Duplicate key \"{0}\"{1}")]
    DuplicateKey(String, String),

    /// A token of the wrong kind where a specific kind is required.
    #[error("Expected {expected}, got {got}{loc}")]
    ExpectedToken {
        expected: TokenKind,
        got: TokenKind,
        loc: String,
    },

    /// A comment line not terminated by a newline.
    #[error("Expected new line after comment, got {0}{1}")]
    ExpectedNewLineAfterComment(TokenKind, String),

    /// A colon followed by neither a scalar nor a newline.
    #[error("Unexpected {0} after colon{1}")]
    UnexpectedAfterColon(TokenKind, String),

    /// A numeric literal that does not convert to `i64`/`f64`.
    #[error("Invalid number \"{0}\"{1}")]
    InvalidNumber(String, String),

    /// An illegal token handed to the parser.
    #[error("Illegal token: {0}{1}")]
    IllegalToken(String, String),

    /// The input file could not be read.
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl ParseError {
    /// Create an error with location information.
    pub fn with_location(self, ctx: &ParseContext, line: usize, col: usize) -> Self {
        let suffix = ctx.loc_suffix(line, col);
        match self {
            ParseError::ExpectedColon(_) => ParseError::ExpectedColon(suffix),
            ParseError::UnknownIdentifier(c, _) => ParseError::UnknownIdentifier(c, suffix),
            ParseError::UnexpectedChar(c, _) => ParseError::UnexpectedChar(c, suffix),
            ParseError::InvalidBool(lit, _) => ParseError::InvalidBool(lit, suffix),
            ParseError::UnterminatedString(_) => ParseError::UnterminatedString(suffix),
            ParseError::MalformedComment(_) => ParseError::MalformedComment(suffix),
            ParseError::TooManyTabs { expected, got, .. } => ParseError::TooManyTabs {
                expected,
                got,
                loc: suffix,
            },
            ParseError::IncompleteNested(_) => ParseError::IncompleteNested(suffix),
            ParseError::UnfinishedNested(key, _) => ParseError::UnfinishedNested(key, suffix),
            ParseError::DuplicateKey(key, _) => ParseError::DuplicateKey(key, suffix),
            ParseError::ExpectedToken { expected, got, .. } => ParseError::ExpectedToken {
                expected,
                got,
                loc: suffix,
            },
            ParseError::ExpectedNewLineAfterComment(got, _) => {
                ParseError::ExpectedNewLineAfterComment(got, suffix)
            }
            ParseError::UnexpectedAfterColon(got, _) => {
                ParseError::UnexpectedAfterColon(got, suffix)
            }
            ParseError::InvalidNumber(lit, _) => ParseError::InvalidNumber(lit, suffix),
            ParseError::IllegalToken(msg, _) => ParseError::IllegalToken(msg, suffix),
            err @ ParseError::Io { .. } => err,
        }
    }
}

/// Error type for encoding a document back into YRM text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// YRM documents are always mappings at the root.
    #[error("Top-level value must be a mapping")]
    RootNotMapping,

    /// A nested mapping with no entries has no YRM spelling.
    #[error("Empty mapping at \"{0}\"")]
    EmptyMapping(String),

    /// Keys must match `[A-Za-z_]+`.
    #[error("Invalid key \"{0}\"")]
    InvalidKey(String),

    /// NaN and infinities have no YRM literal.
    #[error("Non-finite float at \"{0}\"")]
    NonFiniteFloat(String),

    /// A string that would not lex back to the same text.
    #[error("String at \"{0}\" cannot be quoted")]
    UnquotableString(String),
}

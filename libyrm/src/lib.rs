//! YRM configuration format parser.
//!
//! YRM is a tab-indented, YAML-like configuration format. A document is a
//! mapping of keys to scalars (integers, floats, booleans, strings) or to
//! nested mappings, with nesting expressed by leading tabs:
//!
//! ```text
//! // service settings
//! host: "localhost"
//! port: 8080
//! db:
//! 	user: "admin"
//! 	pool: 16
//! ```
//!
//! # Parsing Pipeline
//!
//! The parser operates in two phases:
//!
//! 1. **Lexer**: Converts source text into a token stream, stopping at the
//!    first illegal construct.
//!
//! 2. **Parser**: Consumes the token stream, building one mapping per
//!    indentation depth.

mod encode;
mod error;
mod lexer;
mod parser;
mod token;
mod value;

use std::fs;
use std::path::Path;

use tracing::debug;

pub use encode::{encode, Format};
pub use error::{EncodeError, ParseContext, ParseError, Result};
pub use lexer::{lex, tokenize};
pub use parser::parse_tokens;
pub use token::{Token, TokenKind};
pub use value::{Mapping, Value};

/// Parse a YRM document from a string.
///
/// # Example
///
/// ```
/// use libyrm::{parse, Value};
///
/// let doc = parse("port: 8080\n").unwrap();
/// assert_eq!(doc["port"], Value::Integer(8080));
/// ```
pub fn parse(input: &str) -> Result<Mapping> {
    parse_with_filename(input, None)
}

/// Parse a YRM document from a string with a filename for error messages.
pub fn parse_with_filename(input: &str, filename: Option<&str>) -> Result<Mapping> {
    let ctx = ParseContext::new(filename);

    // Phase 1: Lex source into tokens
    let tokens = lexer::lex(input, &ctx)?;
    debug!(tokens = tokens.len(), filename, "lexed");

    // Phase 2: Parse tokens into the root mapping
    let doc = parser::parse_tokens(&tokens, &ctx)?;
    debug!(entries = doc.len(), filename, "parsed");
    Ok(doc)
}

/// Read and parse a YRM file.
///
/// Read failures are reported as [`ParseError::Io`] naming `path`; parse
/// errors carry the file name in their location.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Mapping> {
    let path = path.as_ref();
    let input = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    parse_with_filename(&input, Some(&filename))
}

//! Encode YRM values to output formats.
//!
//! JSON is always available. YRM output writes a document back in canonical
//! form (tab indentation, sorted keys), which only works for values the
//! format can spell.

use crate::error::EncodeError;
use crate::value::{Mapping, Value};

/// Output format for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON (pretty-printed, sorted keys)
    Json,
    /// YRM (canonical)
    Yrm,
}

/// Encode a value to a string in the specified format.
///
/// YAML, TOML, and CBOR are handled by the CLI tool using dedicated
/// libraries.
pub fn encode(value: &Value, format: Format) -> Result<String, EncodeError> {
    match format {
        Format::Json => Ok(encode_json(value, 0)),
        Format::Yrm => match value {
            Value::Mapping(map) => {
                let mut out = String::new();
                encode_yrm_mapping(&mut out, map, 0, "")?;
                Ok(out)
            }
            _ => Err(EncodeError::RootNotMapping),
        },
    }
}

// =============================================================================
// JSON Encoder
// =============================================================================

fn encode_json(value: &Value, indent: usize) -> String {
    let pad = "    ".repeat(indent);
    let pad1 = "    ".repeat(indent + 1);

    match value {
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Float(f) => {
            if f.is_nan() || f.is_infinite() {
                "null".to_string() // JSON doesn't support NaN/Infinity
            } else {
                format!("{}", f)
            }
        }
        Value::String(s) => encode_json_string(s),
        Value::Mapping(map) => {
            if map.is_empty() {
                "{}".to_string()
            } else {
                let items: Vec<String> = sorted_keys(map)
                    .into_iter()
                    .map(|k| {
                        format!(
                            "{}{}: {}",
                            pad1,
                            encode_json_string(k),
                            encode_json(&map[k], indent + 1)
                        )
                    })
                    .collect();
                format!("{{\n{}\n{}}}", items.join(",\n"), pad)
            }
        }
    }
}

fn encode_json_string(s: &str) -> String {
    let mut result = String::from("\"");
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\x08' => result.push_str("\\b"),
            '\x0c' => result.push_str("\\f"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

// =============================================================================
// YRM Encoder
// =============================================================================

fn encode_yrm_mapping(
    out: &mut String,
    map: &Mapping,
    depth: usize,
    path: &str,
) -> Result<(), EncodeError> {
    for key in sorted_keys(map) {
        let key_path = format!("{}/{}", path, key);
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_alphabetic() || b == b'_') {
            return Err(EncodeError::InvalidKey(key_path));
        }
        for _ in 0..depth {
            out.push('\t');
        }
        out.push_str(key);
        out.push(':');

        match &map[key] {
            Value::Mapping(sub) => {
                if sub.is_empty() {
                    return Err(EncodeError::EmptyMapping(key_path));
                }
                out.push('\n');
                encode_yrm_mapping(out, sub, depth + 1, &key_path)?;
                continue;
            }
            Value::Integer(n) => {
                out.push(' ');
                out.push_str(&n.to_string());
            }
            Value::Float(f) => {
                if !f.is_finite() {
                    return Err(EncodeError::NonFiniteFloat(key_path));
                }
                out.push(' ');
                out.push_str(&encode_yrm_float(*f));
            }
            Value::Bool(b) => {
                out.push(' ');
                out.push_str(if *b { "true" } else { "false" });
            }
            Value::String(s) => {
                if !is_quotable(s) {
                    return Err(EncodeError::UnquotableString(key_path));
                }
                out.push_str(" \"");
                out.push_str(s);
                out.push('"');
            }
        }
        out.push('\n');
    }
    Ok(())
}

/// Floats are told apart from integers by the dot.
fn encode_yrm_float(f: f64) -> String {
    let s = format!("{}", f);
    if s.contains('.') {
        s
    } else {
        format!("{}.0", s)
    }
}

/// Whether `s` placed between quotes lexes back to exactly `s`.
fn is_quotable(s: &str) -> bool {
    let mut bytes = s.bytes();
    while let Some(b) = bytes.next() {
        match b {
            b'\n' | b'"' => return false,
            b'\\' => match bytes.next() {
                None | Some(b'\n') => return false,
                Some(_) => {}
            },
            _ => {}
        }
    }
    true
}

fn sorted_keys(map: &Mapping) -> Vec<&String> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    keys
}

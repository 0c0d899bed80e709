//! TOML transcoding: convert YRM documents to TOML text.
//!
//! Mapping from YRM to TOML:
//!   - Value::Integer       -> TOML integer
//!   - Value::Float         -> TOML float
//!   - Value::Bool          -> TOML boolean
//!   - Value::String        -> TOML string (raw text, escapes not decoded)
//!   - Value::Mapping       -> TOML table
//!
//! YRM documents are always mappings at the root, so every document has a
//! TOML spelling; only a bare scalar value is rejected.

use libyrm::Value;
use toml_edit::DocumentMut;

/// Encode a YRM value as a TOML string.
pub fn encode(value: &Value) -> Result<String, String> {
    match value_to_toml(value) {
        toml_edit::Item::Table(table) => {
            let mut doc = DocumentMut::new();
            for (key, value) in table.iter() {
                doc[key] = value.clone();
            }
            Ok(doc.to_string())
        }
        _ => Err("TOML requires the top-level value to be a table".to_string()),
    }
}

fn value_to_toml(value: &Value) -> toml_edit::Item {
    match value {
        Value::Integer(n) => toml_edit::Item::Value(toml_edit::Value::Integer(
            toml_edit::Formatted::new(*n),
        )),
        Value::Float(f) => {
            toml_edit::Item::Value(toml_edit::Value::Float(toml_edit::Formatted::new(*f)))
        }
        Value::Bool(b) => {
            toml_edit::Item::Value(toml_edit::Value::Boolean(toml_edit::Formatted::new(*b)))
        }
        Value::String(s) => toml_edit::Item::Value(toml_edit::Value::String(
            toml_edit::Formatted::new(s.clone()),
        )),
        Value::Mapping(obj) => {
            let mut table = toml_edit::Table::new();
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            for k in keys {
                table.insert(k, value_to_toml(&obj[k]));
            }
            toml_edit::Item::Table(table)
        }
    }
}

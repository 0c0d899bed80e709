//! YRM value representation.

use std::collections::HashMap;
use std::fmt;

/// A YRM mapping: string keys, unique, unordered.
pub type Mapping = HashMap<String, Value>;

/// A YRM value.
#[derive(Clone, PartialEq)]
pub enum Value {
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating-point number.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// String contents as written between the quotes; escapes are not decoded.
    String(String),
    /// Nested mapping.
    Mapping(Mapping),
}

impl Value {
    /// Returns the integer value if this is an `Integer`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float value if this is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean value if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a reference to the mapping if this is a `Mapping`.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Returns `true` if this is a `Mapping`.
    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    /// Looks up `key` if this is a `Mapping`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Looks up a value by a `/`-separated path of keys, e.g. `/db/port`.
    ///
    /// The empty path refers to `self`. Returns `None` when a segment is
    /// missing or a scalar is reached before the path ends.
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(self);
        }
        let rest = path.strip_prefix('/')?;
        rest.split('/').try_fold(self, |value, key| value.get(key))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Mapping(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                f.debug_map()
                    .entries(keys.into_iter().map(|k| (k, &map[k])))
                    .finish()
            }
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Mapping(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        Value::Mapping(HashMap::from([
            ("name".to_string(), Value::from("svc")),
            (
                "db".to_string(),
                Value::Mapping(HashMap::from([
                    ("port".to_string(), Value::from(5432)),
                    ("ratio".to_string(), Value::from(0.5)),
                ])),
            ),
        ]))
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from(7).as_integer(), Some(7));
        assert_eq!(Value::from(7).as_float(), None);
        assert_eq!(Value::from(1.5).as_float(), Some(1.5));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert!(sample().is_mapping());
        assert!(Value::from("x").as_mapping().is_none());
    }

    #[test]
    fn test_get_and_pointer() {
        let v = sample();
        assert_eq!(v.get("name"), Some(&Value::from("svc")));
        assert_eq!(v.pointer("/db/port"), Some(&Value::Integer(5432)));
        assert_eq!(v.pointer(""), Some(&v));
        assert_eq!(v.pointer("/db/missing"), None);
        assert_eq!(v.pointer("/name/deeper"), None);
        assert_eq!(v.pointer("db/port"), None);
    }

    #[test]
    fn test_debug_sorts_keys() {
        assert_eq!(
            format!("{:?}", sample()),
            r#"{"db": {"port": 5432, "ratio": 0.5}, "name": "svc"}"#
        );
    }
}

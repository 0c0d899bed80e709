//! YAML transcoding: convert YRM documents to YAML text.
//!
//! Mapping from YRM to YAML:
//!   - Value::Integer      -> YAML integer
//!   - Value::Float        -> YAML float
//!   - Value::Bool         -> YAML bool
//!   - Value::String       -> YAML string (raw text, escapes not decoded)
//!   - Value::Mapping      -> YAML mapping (keys sorted)

use libyrm::Value;

/// Encode a YRM value as a YAML string.
pub fn encode(value: &Value) -> Result<String, String> {
    let yaml_value = value_to_yaml(value);
    serde_yaml::to_string(&yaml_value).map_err(|e| format!("YAML encode error: {}", e))
}

fn value_to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Integer(n) => serde_yaml::Value::Number(serde_yaml::Number::from(*n)),
        Value::Float(f) => serde_yaml::Value::Number(serde_yaml::Number::from(*f)),
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::Mapping(obj) => {
            let mut map = serde_yaml::Mapping::new();
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            for k in keys {
                map.insert(serde_yaml::Value::String(k.clone()), value_to_yaml(&obj[k]));
            }
            serde_yaml::Value::Mapping(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_nested() {
        let doc = libyrm::parse("name: \"svc\"\nlimits:\n\tcpu: 0.5\n\tmem: 512\n").unwrap();
        let yaml = encode(&Value::Mapping(doc)).unwrap();
        assert_eq!(yaml, "limits:\n  cpu: 0.5\n  mem: 512\nname: svc\n");
    }
}

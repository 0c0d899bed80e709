//! CBOR transcoding: convert YRM documents to CBOR binary data.
//!
//! Mapping from YRM to CBOR:
//!   - Value::Integer -> CBOR integer (smallest encoding that fits)
//!   - Value::Float   -> CBOR float64 (always 9 bytes, never downgraded)
//!   - Value::Bool    -> CBOR bool (simple values 20/21)
//!   - Value::String  -> CBOR text string (determinate length)
//!   - Value::Mapping -> CBOR map (determinate length, text string keys, sorted)

use ciborium::value::Value as CborValue;
use libyrm::Value;
use std::fmt::Write as FmtWrite;

// ---------------------------------------------------------------------------
// Encode (YRM -> CBOR)
//
// We write CBOR directly rather than going through ciborium's Value type
// because ciborium downgrades float64 to float16/float32 when the value is
// representable in fewer bytes. YRM floats always stay CBOR float64 (major
// type 7, additional info 27, 8-byte IEEE 754 payload).
// ---------------------------------------------------------------------------

/// Encode a YRM value as CBOR bytes.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    write_value(&mut buf, value);
    buf
}

fn write_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(n) => write_integer(buf, *n),
        Value::Float(f) => {
            // Always encode as CBOR float64 (major 7, info 27)
            buf.push(0xfb);
            buf.extend_from_slice(&f.to_be_bytes());
        }
        Value::Bool(b) => {
            // CBOR simple value 20 = false, 21 = true
            buf.push(if *b { 0xf5 } else { 0xf4 });
        }
        Value::String(s) => write_text(buf, s),
        Value::Mapping(obj) => {
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            write_type_and_length(buf, 5, keys.len() as u64); // major 5 = map
            for k in keys {
                write_text(buf, k);
                write_value(buf, &obj[k]);
            }
        }
    }
}

/// Write a determinate-length text string (major 3).
fn write_text(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    write_type_and_length(buf, 3, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Write a CBOR major type + length/value argument.
///
/// CBOR encodes the major type in the high 3 bits and uses the low 5 bits
/// plus optional following bytes for the argument:
///   0-23:    argument in the low 5 bits (1 byte total)
///   24:      1-byte argument follows
///   25:      2-byte argument follows
///   26:      4-byte argument follows
///   27:      8-byte argument follows
fn write_type_and_length(buf: &mut Vec<u8>, major: u8, val: u64) {
    let high = major << 5;
    match val {
        0..=23 => {
            buf.push(high | val as u8);
        }
        24..=0xff => {
            buf.push(high | 24);
            buf.push(val as u8);
        }
        0x100..=0xffff => {
            buf.push(high | 25);
            buf.extend_from_slice(&(val as u16).to_be_bytes());
        }
        0x10000..=0xffff_ffff => {
            buf.push(high | 26);
            buf.extend_from_slice(&(val as u32).to_be_bytes());
        }
        _ => {
            buf.push(high | 27);
            buf.extend_from_slice(&val.to_be_bytes());
        }
    }
}

/// Write an integer as the smallest CBOR integer encoding.
///
/// Major 0 encodes n directly; major 1 encodes -1 - n, so a negative
/// `n` is written with argument `!n` (which equals `-1 - n`).
fn write_integer(buf: &mut Vec<u8>, n: i64) {
    if n < 0 {
        write_type_and_length(buf, 1, !n as u64);
    } else {
        write_type_and_length(buf, 0, n as u64);
    }
}

// ---------------------------------------------------------------------------
// Diagnostic notation (RFC 8949 §8)
// ---------------------------------------------------------------------------

/// Render CBOR bytes as diagnostic notation.
///
/// Rendering works from the decoded wire bytes rather than from the YRM
/// value, so float widths and key order show exactly what was encoded.
pub fn diagnostic(input: &[u8]) -> Result<String, String> {
    let cbor_value: CborValue =
        ciborium::de::from_reader(input).map_err(|e| format!("CBOR decode error: {}", e))?;
    let mut out = String::new();
    diag_value(&mut out, &cbor_value, 0);
    out.push('\n');
    Ok(out)
}

fn diag_value(out: &mut String, val: &CborValue, indent: usize) {
    match val {
        CborValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        CborValue::Integer(i) => {
            let n: i128 = (*i).into();
            let _ = write!(out, "{}", n);
        }
        CborValue::Float(f) => diag_float(out, *f),
        CborValue::Text(s) => diag_text(out, s),
        CborValue::Map(pairs) => diag_map(out, pairs, indent),
        other => {
            let _ = write!(out, "<?unknown {:?}>", other);
        }
    }
}

fn diag_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("NaN");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "Infinity" } else { "-Infinity" });
    } else if f.fract() == 0.0 && f.abs() < 1e18 {
        let _ = write!(out, "{:.1}", f);
    } else {
        let s = f.to_string();
        out.push_str(&s);
        if !s.contains('.') {
            out.push_str(".0");
        }
    }
}

fn diag_text(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn diag_map(out: &mut String, pairs: &[(CborValue, CborValue)], indent: usize) {
    if pairs.is_empty() {
        out.push_str("{}");
        return;
    }
    let child = " ".repeat(indent + 2);
    out.push_str("{\n");
    for (i, (k, v)) in pairs.iter().enumerate() {
        out.push_str(&child);
        diag_value(out, k, indent + 2);
        out.push_str(": ");
        diag_value(out, v, indent + 2);
        if i + 1 < pairs.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str(&" ".repeat(indent));
    out.push('}');
}

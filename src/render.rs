//! Row rendering.
//!
//! Turns a row into the tuple-style line printed by the dumper, for example
//! `(1, 'alice', None)`. Column order is preserved exactly.

use crate::db::Value;
use ipnetwork::IpNetwork;
use std::fmt::{self, Write};

/// Display adapter for a row of values.
pub struct RowDisplay<'a>(pub &'a [Value]);

impl fmt::Display for RowDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('(')?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_value(f, value)?;
        }
        // A single-element tuple keeps its trailing comma so it never reads as a bare value.
        if self.0.len() == 1 {
            f.write_char(',')?;
        }
        f.write_char(')')
    }
}

/// Renders a full row as a tuple line.
pub fn render_row(row: &[Value]) -> String {
    RowDisplay(row).to_string()
}

/// Renders a single value the way it appears inside a row tuple.
pub fn render_value(value: &Value) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_value(&mut out, value);
    out
}

fn write_value<W: Write>(out: &mut W, value: &Value) -> fmt::Result {
    match value {
        Value::Null => out.write_str("None"),
        Value::Bool(true) => out.write_str("True"),
        Value::Bool(false) => out.write_str("False"),
        Value::Int(i) => write!(out, "{i}"),
        Value::Float(f) => write_float(out, *f),
        Value::Decimal(d) => write!(out, "{d}"),
        Value::String(s) => write_quoted(out, s),
        Value::Bytes(b) => write_bytes(out, b),
        Value::Date(d) => write_quoted(out, &d.to_string()),
        Value::Time(t) => write_quoted(out, &t.to_string()),
        Value::TimeTz(t, offset) => write_quoted(out, &format!("{t}{offset}")),
        Value::Timestamp(ts) => write_quoted(out, &ts.to_string()),
        Value::TimestampTz(ts) => write_quoted(
            out,
            &ts.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string(),
        ),
        Value::Interval(interval) => write_quoted(out, &interval.to_string()),
        Value::Uuid(u) => write_quoted(out, &u.hyphenated().to_string()),
        Value::Inet(net) => {
            // A host address prints without its full-width prefix, as Postgres does.
            let text = if net.prefix() == max_prefix(net) {
                net.ip().to_string()
            } else {
                net.to_string()
            };
            write_quoted(out, &text)
        }
        Value::Json(json) => write_json(out, json),
        Value::Array(items) => {
            out.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write_value(out, item)?;
            }
            out.write_char(']')
        }
        Value::Unsupported(type_name) => write!(out, "<{}>", type_name.to_lowercase()),
    }
}

fn max_prefix(net: &IpNetwork) -> u8 {
    match net {
        IpNetwork::V4(_) => 32,
        IpNetwork::V6(_) => 128,
    }
}

/// Writes a JSON document with the same literal forms as top-level values.
fn write_json<W: Write>(out: &mut W, json: &serde_json::Value) -> fmt::Result {
    use serde_json::Value as Json;

    match json {
        Json::Null => out.write_str("None"),
        Json::Bool(true) => out.write_str("True"),
        Json::Bool(false) => out.write_str("False"),
        Json::Number(n) => match n.as_f64().filter(|_| n.is_f64()) {
            Some(f) => write_float(out, f),
            None => write!(out, "{n}"),
        },
        Json::String(s) => write_quoted(out, s),
        Json::Array(items) => {
            out.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write_json(out, item)?;
            }
            out.write_char(']')
        }
        Json::Object(map) => {
            out.write_char('{')?;
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write_quoted(out, key)?;
                out.write_str(": ")?;
                write_json(out, item)?;
            }
            out.write_char('}')
        }
    }
}

/// Writes the shortest round-trip form of a float.
///
/// Integral values keep a `.0` and exponents carry a sign and at least two
/// digits, e.g. `1e+16` and `1.5e-07`.
fn write_float<W: Write>(out: &mut W, f: f64) -> fmt::Result {
    if f.is_nan() {
        return out.write_str("nan");
    }

    let repr = format!("{f:?}");
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            write!(out, "{mantissa}e{sign}{digits:0>2}")
        }
        None => out.write_str(&repr),
    }
}

/// Writes a quoted string literal.
///
/// Single quotes are used unless the text contains a single quote and no
/// double quote.
fn write_quoted<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    out.write_char(quote)?;
    for c in s.chars() {
        match c {
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if c == quote => {
                out.write_char('\\')?;
                out.write_char(c)?;
            }
            c if c.is_control() && (c as u32) < 0x100 => write!(out, "\\x{:02x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char(quote)
}

fn write_bytes<W: Write>(out: &mut W, bytes: &[u8]) -> fmt::Result {
    out.write_str("b'")?;
    for &b in bytes {
        match b {
            b'\\' => out.write_str("\\\\")?,
            b'\'' => out.write_str("\\'")?,
            b'\n' => out.write_str("\\n")?,
            b'\r' => out.write_str("\\r")?,
            b'\t' => out.write_str("\\t")?,
            0x20..=0x7e => out.write_char(b as char)?,
            _ => write!(out, "\\x{b:02x}")?,
        }
    }
    out.write_char('\'')
}

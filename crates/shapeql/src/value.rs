//! GraphQL input values as they appear in field arguments and variable defaults.

use indexmap::IndexMap;
use serde::Serialize;

/// A GraphQL input value decoded from an annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Bare identifier, emitted verbatim (`DESC`, `ACTIVE`).
    Enum(String),
    List(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Format as an argument literal.
    ///
    /// `Null` and an empty enum produce empty text, which callers treat as
    /// "omit this argument".
    pub fn to_literal(&self) -> String {
        match self {
            Value::Null => String::new(),
            other => other.render(),
        }
    }

    /// Format as a variable default (`= value`). Unlike [`Value::to_literal`],
    /// `Null` renders as `null`.
    pub fn to_default(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            other => other.render(),
        }
    }

    fn render(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            // Keep a fractional part so `1.0` stays a Float literal.
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.1}", f),
            Value::Float(f) => f.to_string(),
            Value::String(s) => quote(s),
            Value::Enum(e) => e.clone(),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.render()).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Object(fields) => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.render()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
        }
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

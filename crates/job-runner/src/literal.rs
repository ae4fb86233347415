//! Script literal rendering
//!
//! Values are written in a syntax the catalog's Python scripts accept:
//! double-quoted strings with backslash escapes, `[...]` sequences,
//! `{"key": value}` mappings and `None` / `True` / `False` scalars.

use serde_json::Value;
use std::fmt::Write;

/// Render a double-quoted, escaped string literal
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a sequence literal from already-rendered elements
pub fn sequence<I>(items: I) -> String
where
    I: IntoIterator<Item = String>,
{
    format!("[{}]", items.into_iter().collect::<Vec<_>>().join(", "))
}

/// Render an arbitrary JSON value as a script literal
pub fn json(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => sequence(items.iter().map(json)),
        Value::Object(map) => {
            let entries = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quote(k), json(v)))
                .collect::<Vec<_>>();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r#"say "hi"\now"#), r#""say \"hi\"\\now""#);
        assert_eq!(quote("a\nb\tc"), r#""a\nb\tc""#);
        assert_eq!(quote("\u{1}"), r#""\u0001""#);
    }

    #[test]
    fn test_quote_keeps_unicode() {
        assert_eq!(quote("héllo ✓"), "\"héllo ✓\"");
    }

    #[test]
    fn test_json_scalars() {
        assert_eq!(json(&json!(null)), "None");
        assert_eq!(json(&json!(true)), "True");
        assert_eq!(json(&json!(false)), "False");
        assert_eq!(json(&json!(12)), "12");
        assert_eq!(json(&json!(1.5)), "1.5");
    }

    #[test]
    fn test_json_nested() {
        let value = json!([{"uuid": "u1", "new_url": "https://x/y"}, ["a", "b"]]);
        assert_eq!(
            json(&value),
            r#"[{"uuid": "u1", "new_url": "https://x/y"}, ["a", "b"]]"#
        );
    }
}

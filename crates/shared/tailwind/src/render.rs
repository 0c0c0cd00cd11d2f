//! Canonical `tailwind.config.js` output.

use crate::document::{OPTIONS_KEY, REQUIRE_KEY, TailwindConfig};
use serde_json::{Map, Value};
use std::fmt::Write;

const TYPE_ANNOTATION: &str = "/** @type {import('tailwindcss').Config} */";
const INDENT: char = '\t';

impl TailwindConfig {
    /// Renders the document as a CommonJS config module.
    ///
    /// Keys come out as `content`, `theme`, `darkMode` (only when set), `plugins`, then
    /// any extra keys in document order. Arrays of scalars stay on one line.
    #[must_use]
    pub fn to_js(&self) -> String {
        let mut root = Map::new();
        root.insert(
            "content".to_owned(),
            Value::Array(self.content.iter().cloned().map(Value::String).collect()),
        );

        let mut theme = Map::new();
        theme.insert("extend".to_owned(), self.theme.extend.clone());
        theme.extend(self.theme.overrides.clone());
        root.insert("theme".to_owned(), Value::Object(theme));

        if let Some(mode) = &self.dark_mode {
            root.insert("darkMode".to_owned(), Value::from(mode.clone()));
        }
        root.insert(
            "plugins".to_owned(),
            Value::Array(self.plugins.iter().map(|p| require_call(&p.specifier, p.options.as_ref())).collect()),
        );
        for (key, value) in &self.extra {
            root.entry(key.clone()).or_insert_with(|| value.clone());
        }

        let mut out = String::with_capacity(256);
        out.push_str(TYPE_ANNOTATION);
        out.push_str("\nmodule.exports = ");
        write_value(&mut out, &Value::Object(root), 0);
        out.push_str(";\n");
        out
    }
}

fn require_call(specifier: &str, options: Option<&Value>) -> Value {
    let mut call = Map::new();
    call.insert(REQUIRE_KEY.to_owned(), Value::String(specifier.to_owned()));
    if let Some(options) = options {
        call.insert(OPTIONS_KEY.to_owned(), options.clone());
    }
    Value::Object(call)
}

/// `{ "require": "x" }` or `{ "require": "x", "options": {..} }`.
fn as_require(map: &Map<String, Value>) -> Option<(&str, Option<&Value>)> {
    let specifier = map.get(REQUIRE_KEY)?.as_str()?;
    let options = map.get(OPTIONS_KEY);
    let expected_len = 1 + usize::from(options.is_some());
    (map.len() == expected_len && options.is_none_or(Value::is_object))
        .then_some((specifier, options))
}

fn is_inline(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => {
            map.is_empty() || as_require(map).is_some_and(|(_, options)| options.is_none())
        },
        _ => true,
    }
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(out, s),
        Value::Array(items) if items.iter().all(is_inline) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item, depth);
            }
            out.push(']');
        },
        Value::Array(items) => {
            out.push_str("[\n");
            for item in items {
                indent(out, depth + 1);
                write_value(out, item, depth + 1);
                out.push_str(",\n");
            }
            indent(out, depth);
            out.push(']');
        },
        Value::Object(map) => {
            if let Some((specifier, options)) = as_require(map) {
                out.push_str("require(");
                write_string(out, specifier);
                out.push(')');
                if let Some(options) = options {
                    out.push('(');
                    write_value(out, options, depth);
                    out.push(')');
                }
            } else if map.is_empty() {
                out.push_str("{}");
            } else {
                out.push_str("{\n");
                for (key, item) in map {
                    indent(out, depth + 1);
                    write_key(out, key);
                    out.push_str(": ");
                    write_value(out, item, depth + 1);
                    out.push_str(",\n");
                }
                indent(out, depth);
                out.push('}');
            }
        },
    }
}

fn indent(out: &mut String, depth: usize) {
    out.extend(std::iter::repeat_n(INDENT, depth));
}

fn write_key(out: &mut String, key: &str) {
    let mut chars = key.chars();
    let plain = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if plain {
        out.push_str(key);
    } else {
        write_string(out, key);
    }
}

/// Double-quoted JS string literal.
pub(crate) fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' | '\u{2029}' => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            },
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:x}}}", u32::from(c));
            },
            c => out.push(c),
        }
    }
    out.push('"');
}

use crate::document::TailwindConfig;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// One field that differs between two documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDiff {
    /// Dotted path, e.g. `theme.extend.colors`.
    pub field: String,
    pub left: Option<Value>,
    pub right: Option<Value>,
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<Value>| v.as_ref().map_or_else(|| "<absent>".to_owned(), Value::to_string);
        write!(f, "{}: {} -> {}", self.field, show(&self.left), show(&self.right))
    }
}

impl TailwindConfig {
    /// Field-level differences from `self` to `other`.
    ///
    /// Objects are compared key by key; arrays and scalars as a whole, since `content`
    /// and `plugins` order is significant.
    #[must_use]
    pub fn diff(&self, other: &Self) -> Vec<FieldDiff> {
        let left = serde_json::to_value(self).unwrap_or(Value::Null);
        let right = serde_json::to_value(other).unwrap_or(Value::Null);
        let mut diffs = Vec::new();
        walk(String::new(), Some(&left), Some(&right), &mut diffs);
        diffs
    }
}

fn walk(path: String, left: Option<&Value>, right: Option<&Value>, out: &mut Vec<FieldDiff>) {
    match (left, right) {
        (Some(Value::Object(l)), Some(Value::Object(r))) => {
            let keys = l.keys().chain(r.keys().filter(|k| !l.contains_key(*k)));
            for key in keys {
                let child = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
                walk(child, l.get(key), r.get(key), out);
            }
        },
        (l, r) if l == r => {},
        (l, r) => out.push(FieldDiff { field: path, left: l.cloned(), right: r.cloned() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DarkMode;
    use serde_json::json;

    #[test]
    fn identical_documents_have_no_diff() {
        let config = TailwindConfig::new(["a"]);
        assert!(config.diff(&config.clone()).is_empty());
    }

    #[test]
    fn reports_each_differing_field() {
        let mut left = TailwindConfig::new(["./dynamic/**/*.html"]);
        left.dark_mode = Some(DarkMode::Class);
        left.theme.extend = json!({ "colors": { "a": "#000" } });

        let mut right = TailwindConfig::new(["./templates/**/*.html"]);
        right.theme.extend = json!({ "colors": { "a": "#fff" } });

        let diffs = left.diff(&right);
        let fields: Vec<_> = diffs.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, ["content", "theme.extend.colors.a", "darkMode"]);
        assert_eq!(diffs[2].right, None);
        assert_eq!(diffs[2].to_string(), "darkMode: \"class\" -> <absent>");
    }
}

//! The configuration document model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// Key marking a `require(...)` call in the JSON form.
pub(crate) const REQUIRE_KEY: &str = "require";
/// Key holding the options object passed to a required plugin.
pub(crate) const OPTIONS_KEY: &str = "options";

/// A Tailwind CSS configuration document (`tailwind.config.js`).
///
/// Read once and never mutated by the loader. Unknown top-level keys are kept in
/// [`TailwindConfig::extra`] so they survive a render round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailwindConfig {
    /// Globs of the files scanned for class names, in document order.
    pub content: Vec<String>,
    #[serde(default)]
    pub theme: Theme,
    /// Absent means the tool's default, `media`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<DarkMode>,
    #[serde(default)]
    pub plugins: Vec<PluginRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl PartialEq for TailwindConfig {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
            && self.theme == other.theme
            && self.dark_mode == other.dark_mode
            && self.plugins == other.plugins
            && self.extra == other.extra
    }
}

impl TailwindConfig {
    /// A document with the given content globs, an empty `theme.extend` and nothing else.
    #[must_use]
    pub fn new<I, S>(content: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            content: content.into_iter().map(Into::into).collect(),
            theme: Theme::default(),
            dark_mode: None,
            plugins: Vec::new(),
            extra: Map::new(),
            base_dir: None,
        }
    }

    /// Directory the `content` globs are relative to; `.` when the document was not loaded
    /// from a file.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        self.base_dir.as_deref().unwrap_or_else(|| Path::new("."))
    }

    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// The effective dark-mode strategy, applying the tool's default.
    #[must_use]
    pub fn effective_dark_mode(&self) -> DarkMode {
        self.dark_mode.clone().unwrap_or(DarkMode::Media)
    }
}

/// `theme`: `extend` plus any overriding keys, preserved verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "empty_object")]
    pub extend: Value,
    #[serde(flatten)]
    pub overrides: Map<String, Value>,
}

impl Default for Theme {
    fn default() -> Self {
        Self { extend: empty_object(), overrides: Map::new() }
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// `darkMode` as the external tool understands it.
///
/// Values the tool does not recognize are kept in [`DarkMode::Other`] so validation can
/// report them instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum DarkMode {
    Media,
    Class,
    Selector,
    /// `["class", "<selector>"]`
    ClassWith(String),
    /// `["selector", "<selector>"]`
    SelectorWith(String),
    Other(Value),
}

impl DarkMode {
    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// The custom selector of a tuple form.
    #[must_use]
    pub fn selector(&self) -> Option<&str> {
        match self {
            Self::ClassWith(selector) | Self::SelectorWith(selector) => Some(selector),
            _ => None,
        }
    }
}

impl From<Value> for DarkMode {
    fn from(value: Value) -> Self {
        match &value {
            Value::String(mode) => match mode.as_str() {
                "media" => Self::Media,
                "class" => Self::Class,
                "selector" => Self::Selector,
                _ => Self::Other(value),
            },
            Value::Array(items) => match items.as_slice() {
                [Value::String(mode), Value::String(selector)] if mode == "class" => {
                    Self::ClassWith(selector.clone())
                },
                [Value::String(mode), Value::String(selector)] if mode == "selector" => {
                    Self::SelectorWith(selector.clone())
                },
                _ => Self::Other(value),
            },
            _ => Self::Other(value),
        }
    }
}

impl From<DarkMode> for Value {
    fn from(mode: DarkMode) -> Self {
        match mode {
            DarkMode::Media => Self::from("media"),
            DarkMode::Class => Self::from("class"),
            DarkMode::Selector => Self::from("selector"),
            DarkMode::ClassWith(selector) => Self::from(vec!["class".to_owned(), selector]),
            DarkMode::SelectorWith(selector) => Self::from(vec!["selector".to_owned(), selector]),
            DarkMode::Other(value) => value,
        }
    }
}

impl fmt::Display for DarkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::from(self.clone()))
    }
}

/// A plugin activated through `require("<specifier>")`, optionally called with options.
///
/// The JSON form is either the bare specifier or `{ "require": "...", "options": {...} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct PluginRef {
    pub specifier: String,
    pub options: Option<Value>,
}

impl PluginRef {
    pub fn new(specifier: impl Into<String>) -> Self {
        Self { specifier: specifier.into(), options: None }
    }

    #[must_use]
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }
}

impl TryFrom<Value> for PluginRef {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(specifier) => Ok(Self::new(specifier)),
            Value::Object(mut map) => {
                let Some(Value::String(specifier)) = map.remove(REQUIRE_KEY) else {
                    return Err(format!("plugin objects need a string `{REQUIRE_KEY}` key"));
                };
                let options = map.remove(OPTIONS_KEY);
                if let Some(key) = map.keys().next() {
                    return Err(format!("unexpected plugin key `{key}`"));
                }
                Ok(Self { specifier, options })
            },
            other => Err(format!("a plugin must be a require(...) reference, found {other}")),
        }
    }
}

impl From<PluginRef> for Value {
    fn from(plugin: PluginRef) -> Self {
        match plugin.options {
            None => Self::String(plugin.specifier),
            Some(options) => {
                let mut map = Map::new();
                map.insert(REQUIRE_KEY.to_owned(), Self::String(plugin.specifier));
                map.insert(OPTIONS_KEY.to_owned(), options);
                Self::Object(map)
            },
        }
    }
}

impl fmt::Display for PluginRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.options {
            None => write!(f, "require({:?})", self.specifier),
            Some(options) => write!(f, "require({:?})({options})", self.specifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dark_mode_recognizes_every_strategy() {
        assert_eq!(DarkMode::from(json!("media")), DarkMode::Media);
        assert_eq!(DarkMode::from(json!("class")), DarkMode::Class);
        assert_eq!(DarkMode::from(json!("selector")), DarkMode::Selector);
        assert_eq!(
            DarkMode::from(json!(["class", ".dark"])),
            DarkMode::ClassWith(".dark".to_owned())
        );
        assert_eq!(
            DarkMode::from(json!(["selector", "[data-mode=\"dark\"]"])),
            DarkMode::SelectorWith("[data-mode=\"dark\"]".to_owned())
        );
    }

    #[test]
    fn unknown_dark_modes_are_kept() {
        let mode = DarkMode::from(json!("sometimes"));
        assert!(!mode.is_recognized());
        assert_eq!(Value::from(mode), json!("sometimes"));
        assert!(!DarkMode::from(json!(["media", "x"])).is_recognized());
    }

    #[test]
    fn plugin_json_forms() {
        let bare: PluginRef = serde_json::from_value(json!("flowbite/plugin")).unwrap();
        assert_eq!(bare, PluginRef::new("flowbite/plugin"));

        let with_options: PluginRef = serde_json::from_value(json!({
            "require": "@tailwindcss/typography",
            "options": { "className": "prose" }
        }))
        .unwrap();
        assert_eq!(with_options.options, Some(json!({ "className": "prose" })));
        assert_eq!(
            serde_json::to_value(&with_options).unwrap(),
            json!({ "require": "@tailwindcss/typography", "options": { "className": "prose" } })
        );

        assert!(serde_json::from_value::<PluginRef>(json!(42)).is_err());
        assert!(serde_json::from_value::<PluginRef>(json!({ "require": "x", "extra": 1 })).is_err());
    }

    #[test]
    fn base_dir_is_not_part_of_equality() {
        let a = TailwindConfig::new(["./src/**/*.html"]);
        let b = a.clone().with_base_dir("/srv/site");
        assert_eq!(a, b);
        assert_eq!(a.base_dir(), Path::new("."));
        assert_eq!(b.base_dir(), Path::new("/srv/site"));
    }

    #[test]
    fn missing_dark_mode_means_media() {
        assert_eq!(TailwindConfig::new(["a"]).effective_dark_mode(), DarkMode::Media);
    }
}

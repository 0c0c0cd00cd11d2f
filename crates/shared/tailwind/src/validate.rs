use crate::content::compile_glob;
use crate::document::{DarkMode, TailwindConfig};
use serde::Serialize;
use std::fmt;

/// One broken rule, addressed by a field path such as `content[1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub field: String,
    pub message: String,
}

/// Every problem found in a document, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    problems: Vec<Problem>,
}

impl ValidationReport {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.problems.push(Problem { field: field.into(), message: message.into() });
    }

    #[must_use]
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.problems.len()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, problem) in self.problems.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", problem.field, problem.message)?;
        }
        Ok(())
    }
}

impl TailwindConfig {
    /// Checks the document against the rules the build tool relies on.
    ///
    /// # Errors
    /// A report listing every violation, not only the first.
    pub fn validate(&self) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::default();

        if self.content.is_empty() {
            report.push("content", "must list at least one glob");
        }
        for (i, pattern) in self.content.iter().enumerate() {
            let field = format!("content[{i}]");
            if pattern.trim().is_empty() {
                report.push(field, "must not be blank");
            } else if let Err(err) = compile_glob(pattern) {
                report.push(field, format!("invalid glob {pattern:?}: {err}"));
            }
        }

        if !self.theme.extend.is_object() {
            report.push("theme.extend", format!("must be an object, found {}", self.theme.extend));
        }

        match &self.dark_mode {
            Some(DarkMode::Other(value)) => report.push(
                "darkMode",
                format!(
                    "unrecognized strategy {value}; expected \"media\", \"class\", \"selector\" \
                     or [\"class\" | \"selector\", \"<selector>\"]"
                ),
            ),
            Some(mode @ (DarkMode::ClassWith(_) | DarkMode::SelectorWith(_)))
                if mode.selector().is_some_and(|s| s.trim().is_empty()) =>
            {
                report.push("darkMode", "the custom selector must not be blank");
            },
            _ => {},
        }

        if self.plugins.is_empty() {
            report.push("plugins", "must register at least one plugin");
        }
        for (i, plugin) in self.plugins.iter().enumerate() {
            if plugin.specifier.trim().is_empty() {
                report.push(format!("plugins[{i}]"), "module specifier must not be blank");
            }
            if plugin.options.as_ref().is_some_and(|o| !o.is_object()) {
                report.push(format!("plugins[{i}]"), "options must be an object");
            }
        }

        if report.is_empty() { Ok(()) } else { Err(report) }
    }
}

use crate::validate::ValidationReport;
use std::borrow::Cow;

/// A specialized [`TailwindError`] enum of this crate.
#[tally_derive::tally_error]
pub enum TailwindError {
    /// Reading a document from disk failed.
    #[error("I/O error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    /// The JavaScript module is outside the supported subset or malformed.
    #[error("Parse error{} at {line}:{column}: {message}", format_context(.context))]
    Parse {
        message: Cow<'static, str>,
        line: usize,
        column: usize,
        context: Option<Cow<'static, str>>,
    },

    #[error("JSON error{}: {source}", format_context(.context))]
    Json {
        #[source]
        source: serde_json::Error,
        context: Option<Cow<'static, str>>,
    },

    /// A `content` entry is not a valid glob.
    #[error("Glob error{}: {source}", format_context(.context))]
    Glob {
        #[source]
        source: globset::Error,
        context: Option<Cow<'static, str>>,
    },

    /// The file extension names no known document format.
    #[error("Unsupported format{}: {message}", format_context(.context))]
    UnsupportedFormat { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The document parsed but breaks one or more rules.
    #[error("Invalid configuration{}: {report}", format_context(.context))]
    Invalid { report: ValidationReport, context: Option<Cow<'static, str>> },
}

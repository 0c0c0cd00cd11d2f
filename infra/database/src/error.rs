use std::borrow::Cow;

/// A specialized [`DatabaseError`] enum of this crate.
#[tally_derive::tally_error]
pub enum DatabaseError {
    /// Validation errors.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A document with the same id (or unique key) already exists.
    #[error("Duplicate document{}: {message}", format_context(.context))]
    Duplicate { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Snapshot file I/O.
    #[error("I/O error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    /// Snapshot (de)serialization.
    #[error("Serialization error{}: {source}", format_context(.context))]
    Serde {
        #[source]
        source: serde_json::Error,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal database error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

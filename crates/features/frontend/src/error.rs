use std::borrow::Cow;

/// A specialized [`FrontendError`] enum of this crate.
#[tally_derive::tally_error]
pub enum FrontendError {
    #[error("Template error{}: {source}", format_context(.context))]
    Template { source: minijinja::Error, context: Option<Cow<'static, str>> },
    /// A Tailwind document failed to load or validate while `frontend.strict` is on.
    #[error("Tailwind document error{}: {message}", format_context(.context))]
    Tailwind { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal frontend error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

use std::borrow::Cow;
use tally_database::DatabaseError;

/// A specialized [`TodosError`] enum of this crate.
#[tally_derive::tally_error]
pub enum TodosError {
    #[error("Todo storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },
    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal todos error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

use crate::{ID_LENGTH, SAFE_ALPHABET};
use std::borrow::Cow;

#[tally_derive::tally_error]
pub enum ResourceGuardError {
    #[error("Resource validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Utilities for safe resource handling and ID validation.
#[derive(Debug)]
pub struct ResourceGuard;

impl ResourceGuard {
    /// Validates an id taken from a path or query before it reaches the store.
    ///
    /// Accepts exactly what `safe_nanoid!()` produces: [`ID_LENGTH`] characters from
    /// [`SAFE_ALPHABET`].
    ///
    /// # Errors
    /// Returns an error if the length or any character is off.
    pub fn verify<I>(id: &I) -> Result<&str, ResourceGuardError>
    where
        I: AsRef<str> + ?Sized,
    {
        let id = id.as_ref();

        if id.chars().count() != ID_LENGTH {
            return Err(ResourceGuardError::Validation {
                message: format!("expected {ID_LENGTH} characters, got {}", id.chars().count()).into(),
                context: Some("ID length".into()),
            });
        }
        if let Some(bad) = id.chars().find(|c| !SAFE_ALPHABET.contains(c)) {
            return Err(ResourceGuardError::Validation {
                message: format!("unexpected character {bad:?}").into(),
                context: Some("ID alphabet".into()),
            });
        }
        Ok(id)
    }
}

use std::borrow::Cow;
use tally_database::DatabaseError;
use tally_kernel::server::ApiError;
use tracing::debug;

/// A specialized [`IdentityError`] enum of this crate.
#[tally_derive::tally_error]
pub enum IdentityError {
    /// Configuration errors for identity/authentication.
    #[error("Identity config error{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// The token was well formed and signed by us, but its `exp` has passed.
    #[error("Token expired{}: {message}", format_context(.context))]
    Expired { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// Bad signature, malformed token or missing claims.
    #[error("Invalid token{}: {message}", format_context(.context))]
    InvalidToken { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Password hashing error{}: {message}", format_context(.context))]
    Password { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Token encoding error{}: {source}", format_context(.context))]
    Jwt { source: jsonwebtoken::errors::Error, context: Option<Cow<'static, str>> },
    /// GitHub answered, but not with what we asked for.
    #[error("Upstream error{}: {message}", format_context(.context))]
    Upstream { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("HTTP error{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },
    #[error("Storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },
    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal identity error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Expired { .. } | IdentityError::InvalidToken { .. } => {
                debug!(error = %err, "Credential rejected");
                Self::unauthorized()
            },
            IdentityError::Upstream { .. } | IdentityError::Http { .. } => {
                Self::bad_gateway(err.to_string())
            },
            IdentityError::Database { source, .. } => source.into(),
            other => Self::from(other.to_string()),
        }
    }
}

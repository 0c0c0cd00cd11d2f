use crate::Identity;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use tally_domain::records::UserRecord;
use tally_kernel::server::{ApiError, ApiState};

/// The account behind a request's bearer token.
///
/// Rejects with the generic 401 when the token is missing, expired, invalid or
/// names an account that no longer exists.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserRecord);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    ApiState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = ApiState::from_ref(state);
        let identity = Identity::from_state(&state)?;
        identity.resolve(&parts.headers).map(Self)
    }
}

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::borrow::Cow;
use tally_database::DatabaseError;
use tally_derive::api_model;
use tally_domain::constants::{ERROR_CONNECTION_VALIDATION, TOKEN_TYPE};
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Body of every error response.
#[api_model(rename_all = "snake_case")]
pub struct ErrorBody {
    pub detail: String,
}

/// Errors a handler may return; each maps to one status code.
#[tally_derive::tally_error]
pub enum ApiError {
    /// 401 with `WWW-Authenticate: Bearer`.
    #[error("Unauthorized{}: {message}", format_context(.context))]
    Unauthorized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Conflict{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// 422, the status axum and the JSON extractors use for semantic errors.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// An upstream service (GitHub) failed.
    #[error("Bad gateway{}: {message}", format_context(.context))]
    BadGateway { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// 500; the message is logged, never sent.
    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ApiError {
    /// The one 401 every credential failure collapses into.
    #[must_use]
    pub const fn unauthorized() -> Self {
        Self::Unauthorized { message: Cow::Borrowed(ERROR_CONNECTION_VALIDATION), context: None }
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: message.into(), context: None }
    }

    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Conflict { message: message.into(), context: None }
    }

    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }

    pub fn bad_gateway(message: impl Into<Cow<'static, str>>) -> Self {
        Self::BadGateway { message: message.into(), context: None }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Duplicate { message, context } => Self::Conflict { message, context },
            DatabaseError::Validation { message, context } => Self::Validation { message, context },
            other => Self::Internal { message: other.to_string().into(), context: None },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            Self::Internal { .. } => {
                error!(error = %self, "Request failed");
                "Internal Server Error".to_owned()
            },
            Self::Unauthorized { message, .. }
            | Self::NotFound { message, .. }
            | Self::Conflict { message, .. }
            | Self::Validation { message, .. }
            | Self::BadGateway { message, .. } => message.to_string(),
        };

        let mut response = (status, Json(ErrorBody { detail })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(TOKEN_TYPE));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: ApiError) -> (StatusCode, Option<HeaderValue>, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let auth = response.headers().get(header::WWW_AUTHENTICATE).cloned();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, auth, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unauthorized_carries_bearer_challenge() {
        let (status, auth, body) = body_of(ApiError::unauthorized()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(auth.unwrap(), "Bearer");
        assert_eq!(body["detail"], ERROR_CONNECTION_VALIDATION);
    }

    #[tokio::test]
    async fn internal_details_stay_private() {
        let (status, auth, body) = body_of(ApiError::from("disk on fire")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(auth.is_none());
        assert_eq!(body["detail"], "Internal Server Error");
    }

    #[tokio::test]
    async fn messages_are_passed_through() {
        let (status, _, body) = body_of(ApiError::conflict("taken")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["detail"], "taken");
    }

    #[test]
    fn database_errors_map_to_statuses() {
        let dup = DatabaseError::Duplicate { message: "x".into(), context: None };
        assert_eq!(ApiError::from(dup).status(), StatusCode::CONFLICT);

        let internal = DatabaseError::Internal { message: "x".into(), context: None };
        assert_eq!(ApiError::from(internal).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

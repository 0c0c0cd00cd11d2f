//! Signed access and refresh tokens.

use crate::error::{IdentityError, IdentityErrorExt};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_domain::config::JwtConfig;
use tracing::debug;

const ALLOWED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Payload of every token we issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account email.
    pub sub: String,
    /// Account id.
    pub id: String,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Which half of the session this token is.
    pub typ: TokenKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Both halves of a freshly started session.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies HMAC-signed JWTs.
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    leeway: u64,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// # Errors
    /// [`IdentityError::Config`] for an empty secret, a non-HMAC algorithm or a TTL that
    /// does not fit a duration.
    pub fn from_config(config: &JwtConfig) -> Result<Self, IdentityError> {
        if config.secret.is_empty() {
            return Err(IdentityError::Config {
                message: "the JWT secret must not be empty".into(),
                context: Some("security.jwt.secret".into()),
            });
        }
        let algorithm = config
            .algorithm
            .parse::<Algorithm>()
            .ok()
            .filter(|alg| ALLOWED_ALGORITHMS.contains(alg))
            .ok_or_else(|| IdentityError::Config {
                message: format!("unsupported algorithm '{}', expected HS256, HS384 or HS512", config.algorithm)
                    .into(),
                context: Some("security.jwt.algorithm".into()),
            })?;

        let ttl = |value: u64, unit: fn(i64) -> Option<Duration>, key: &'static str| {
            i64::try_from(value).ok().and_then(unit).ok_or_else(|| IdentityError::Config {
                message: format!("{value} is out of range").into(),
                context: Some(key.into()),
            })
        };

        Ok(Self {
            algorithm,
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            access_ttl: ttl(config.access_ttl_minutes, Duration::try_minutes, "security.jwt.access_ttl_minutes")?,
            refresh_ttl: ttl(config.refresh_ttl_days, Duration::try_days, "security.jwt.refresh_ttl_days")?,
            leeway: config.leeway_seconds,
        })
    }

    #[must_use]
    pub const fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// # Errors
    /// [`IdentityError::Jwt`] if signing fails.
    pub fn issue(&self, kind: TokenKind, email: &str, user_id: &str) -> Result<String, IdentityError> {
        self.issue_with_ttl(kind, email, user_id, self.ttl(kind))
    }

    /// # Errors
    /// [`IdentityError::Jwt`] if signing fails.
    pub fn issue_pair(&self, email: &str, user_id: &str) -> Result<TokenPair, IdentityError> {
        Ok(TokenPair {
            access_token: self.issue(TokenKind::Access, email, user_id)?,
            refresh_token: self.issue(TokenKind::Refresh, email, user_id)?,
        })
    }

    /// # Errors
    /// [`IdentityError::Jwt`] if signing fails.
    pub fn issue_with_ttl(
        &self,
        kind: TokenKind,
        email: &str,
        user_id: &str,
        ttl: Duration,
    ) -> Result<String, IdentityError> {
        let claims = Claims {
            sub: email.to_owned(),
            id: user_id.to_owned(),
            exp: (Utc::now() + ttl).timestamp(),
            typ: kind,
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding).context("Signing token")
    }

    /// Checks signature, expiry and claims, and that the token is of the `expected` kind.
    ///
    /// # Errors
    /// * [`IdentityError::Expired`] when only the expiry is wrong.
    /// * [`IdentityError::InvalidToken`] for everything else.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, IdentityError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = self.leeway;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => {
                    IdentityError::Expired { message: err.to_string().into(), context: None }
                },
                _ => IdentityError::InvalidToken { message: err.to_string().into(), context: None },
            })?
            .claims;

        if claims.sub.is_empty() || claims.id.is_empty() {
            return Err(IdentityError::InvalidToken {
                message: "token is missing its subject or id".into(),
                context: None,
            });
        }
        if claims.typ != expected {
            return Err(IdentityError::InvalidToken {
                message: format!("expected a {expected:?} token, got {:?}", claims.typ).into(),
                context: None,
            });
        }

        let remaining = claims.exp - Utc::now().timestamp();
        debug!(sub = %claims.sub, remaining_secs = remaining, "Time till token expiration");
        Ok(claims)
    }
}

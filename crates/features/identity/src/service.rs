//! Account and session operations behind the HTTP handlers.

use crate::credentials::bearer_token;
use crate::error::IdentityError;
use crate::github::GithubUser;
use crate::password::{hash_password, verify_password};
use crate::tokens::{TokenKind, TokenPair};
use crate::Identity;
use axum::http::HeaderMap;
use tally_database::DatabaseError;
use tally_domain::records::{UserProfile, UserRecord};
use tally_kernel::safe_nanoid;
use tally_kernel::server::{ApiError, ApiResult, ApiState};
use tracing::{debug, info, warn};

impl Identity {
    /// The registered slice.
    ///
    /// # Errors
    /// [`ApiError::Internal`] when the server was assembled without it.
    pub fn from_state(state: &ApiState) -> ApiResult<Self> {
        state.try_get_slice::<Self>().cloned().map_err(|e| ApiError::from(e.to_string()))
    }

    #[must_use]
    pub fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        self.users.find_one(|user| user.email == email)
    }

    /// Resolves the bearer token in `headers` to a stored account.
    ///
    /// # Errors
    /// [`ApiError::Unauthorized`] for every credential failure.
    pub fn resolve(&self, headers: &HeaderMap) -> ApiResult<UserRecord> {
        let token = bearer_token(headers).ok_or_else(ApiError::unauthorized)?;
        let claims = self.tokens.verify(&token, TokenKind::Access)?;
        self.users
            .get(&claims.id)
            .filter(|user| user.email == claims.sub)
            .ok_or_else(ApiError::unauthorized)
    }

    /// Creates an account with a password.
    ///
    /// # Errors
    /// * [`ApiError::Validation`] for a blank email or password.
    /// * [`ApiError::Conflict`] when the email is taken.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        profile: Option<UserProfile>,
    ) -> ApiResult<UserRecord> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::validation("Email and password are required."));
        }

        let password = password.to_owned();
        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| ApiError::from(e.to_string()))??;

        let user = UserRecord {
            id: safe_nanoid!(),
            email: email.to_owned(),
            password_hash: Some(hash),
            profile,
            refresh_token: None,
            github_login: None,
        };

        match self.users.insert_unique_by(user, |user| user.email.clone()).await {
            Ok(user) => {
                info!(user_id = %user.id, "User registered");
                Ok(user)
            },
            Err(DatabaseError::Duplicate { .. }) => {
                Err(ApiError::conflict(format!("Email address already registered: {email}")))
            },
            Err(err) => Err(err.into()),
        }
    }

    /// The account when `password` matches its hash.
    ///
    /// # Errors
    /// [`ApiError::Unauthorized`] for an unknown email, a wrong password or a
    /// password-less account.
    pub async fn authenticate(&self, email: &str, password: &str) -> ApiResult<UserRecord> {
        let user = self.find_by_email(email).ok_or_else(ApiError::unauthorized)?;
        let Some(hash) = user.password_hash.clone() else {
            debug!(user_id = %user.id, "Password login for an account without a password");
            return Err(ApiError::unauthorized());
        };

        let password = password.to_owned();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| ApiError::from(e.to_string()))?;

        if matches {
            Ok(user)
        } else {
            warn!(user_id = %user.id, "Rejected password login");
            Err(ApiError::unauthorized())
        }
    }

    /// Issues a token pair and records the refresh token as the only valid one.
    ///
    /// # Errors
    /// [`ApiError::Internal`] if signing or storing fails.
    pub async fn start_session(&self, user: &UserRecord) -> ApiResult<TokenPair> {
        let pair = self.tokens.issue_pair(&user.email, &user.id).map_err(ApiError::from)?;
        let refresh = pair.refresh_token.clone();
        self.users
            .update(&user.id, |stored| stored.refresh_token = Some(refresh))
            .await?
            .ok_or_else(ApiError::unauthorized)?;
        info!(user_id = %user.id, "Session started");
        Ok(pair)
    }

    /// A new access token for a valid refresh token that is still the stored one.
    ///
    /// # Errors
    /// [`ApiError::Unauthorized`] otherwise.
    pub fn refresh(&self, refresh_token: &str) -> ApiResult<String> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;
        let user = self.users.get(&claims.id).ok_or_else(ApiError::unauthorized)?;
        if user.refresh_token.as_deref() != Some(refresh_token) {
            warn!(user_id = %user.id, "Refresh with a token that is not the current one");
            return Err(ApiError::unauthorized());
        }
        info!(user_id = %user.id, "Token refresh granted");
        self.tokens.issue(TokenKind::Access, &user.email, &user.id).map_err(ApiError::from)
    }

    /// Forgets the stored refresh token.
    ///
    /// # Errors
    /// [`ApiError::Internal`] if storing fails.
    pub async fn end_session(&self, user_id: &str) -> ApiResult<()> {
        self.users.update(user_id, |stored| stored.refresh_token = None).await?;
        info!(user_id, "Session ended");
        Ok(())
    }

    /// Links a GitHub identity to an account, creating a password-less one when needed.
    ///
    /// # Errors
    /// [`ApiError::Internal`] if storing fails.
    pub async fn upsert_github_user(&self, github: &GithubUser) -> ApiResult<UserRecord> {
        let username = github.username();
        let existing = self
            .users
            .find_one(|user| user.github_login.as_deref() == Some(github.login.as_str()))
            .or_else(|| self.find_by_email(username));

        if let Some(existing) = existing {
            let login = github.login.clone();
            return self
                .users
                .update(&existing.id, |stored| stored.github_login = Some(login))
                .await?
                .ok_or_else(ApiError::unauthorized);
        }

        let profile = github.avatar_url.as_ref().map(|pfp| UserProfile {
            name: github.name.clone().unwrap_or_else(|| github.login.clone()),
            pfp: pfp.clone(),
        });
        let user = UserRecord {
            id: safe_nanoid!(),
            email: username.to_owned(),
            password_hash: None,
            profile,
            refresh_token: None,
            github_login: Some(github.login.clone()),
        };
        let user = self.users.insert_unique_by(user, |user| user.email.clone()).await?;
        info!(user_id = %user.id, login = %github.login, "User registered through GitHub");
        Ok(user)
    }
}

//! GitHub OAuth web flow: authorize redirect, code exchange and user lookup.

use crate::error::{IdentityError, IdentityErrorExt};
use reqwest::header;
use serde::Deserialize;
use std::time::Duration;
use tally_domain::config::GithubConfig;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("tally/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The parts of a GitHub user we keep.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubUser {
    pub login: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl GithubUser {
    /// Email when GitHub exposes one, the login otherwise.
    #[must_use]
    pub fn username(&self) -> &str {
        self.email.as_deref().filter(|email| !email.trim().is_empty()).unwrap_or(&self.login)
    }
}

#[derive(Deserialize)]
struct TokenReply {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    config: GithubConfig,
}

impl GithubClient {
    /// # Errors
    /// [`IdentityError::Http`] if the HTTP client cannot be built.
    pub fn new(config: GithubConfig) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Building GitHub client")?;
        Ok(Self { http, config })
    }

    /// Where the browser is sent to grant access.
    #[must_use]
    pub fn authorize_url(&self) -> String {
        format!("{}?client_id={}", self.config.authorize_url, self.config.client_id)
    }

    /// Trades the one-time `code` for a GitHub access token.
    ///
    /// # Errors
    /// [`IdentityError::Http`] on transport failures, [`IdentityError::Upstream`] when
    /// GitHub answers without a token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, IdentityError> {
        let reply: TokenReply = self
            .http
            .post(&self.config.token_url)
            .header(header::ACCEPT, "application/json")
            .query(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .context("Exchanging GitHub code")?
            .error_for_status()
            .context("Exchanging GitHub code")?
            .json()
            .await
            .context("Reading GitHub token reply")?;

        match reply {
            TokenReply { access_token: Some(token), .. } if !token.is_empty() => {
                debug!("GitHub code exchanged");
                Ok(token)
            },
            TokenReply { error, error_description, .. } => Err(IdentityError::Upstream {
                message: format!(
                    "{}: {}",
                    error.as_deref().unwrap_or("no_token"),
                    error_description.as_deref().unwrap_or("GitHub returned no access token")
                )
                .into(),
                context: Some("GitHub token exchange".into()),
            }),
        }
    }

    /// # Errors
    /// [`IdentityError::Http`] on transport failures or a non-success status.
    pub async fn fetch_user(&self, access_token: &str) -> Result<GithubUser, IdentityError> {
        let user: GithubUser = self
            .http
            .get(&self.config.user_url)
            .header(header::ACCEPT, "application/json")
            .bearer_auth(access_token)
            .send()
            .await
            .context("Fetching GitHub user")?
            .error_for_status()
            .context("Fetching GitHub user")?
            .json()
            .await
            .context("Reading GitHub user")?;

        info!(login = %user.login, "GitHub user resolved");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_carries_the_client_id() {
        let client = GithubClient::new(GithubConfig {
            client_id: "abc123".to_owned(),
            ..GithubConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.authorize_url(),
            "https://github.com/login/oauth/authorize?client_id=abc123"
        );
    }

    #[test]
    fn username_prefers_email() {
        let mut user: GithubUser = serde_json::from_str(r#"{"login":"octo","email":null}"#).unwrap();
        assert_eq!(user.username(), "octo");
        user.email = Some("octo@example.com".to_owned());
        assert_eq!(user.username(), "octo@example.com");
    }
}

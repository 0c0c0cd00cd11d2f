//! Identity feature slice: accounts, password and GitHub login, JWT sessions and the
//! [`AuthUser`] extractor every protected route uses.

mod credentials;
mod error;
mod extractor;
mod github;
mod handlers;
mod password;
mod router;
mod service;
mod tokens;

pub use credentials::{access_cookie, bearer_token, expired_cookie};
pub use error::{IdentityError, IdentityErrorExt};
pub use extractor::AuthUser;
pub use github::{GithubClient, GithubUser};
pub use handlers::{CreateUserRequest, LoginForm, ProfileBody, TokenResponse, UserView};
pub use password::{hash_password, verify_password};
pub use router::router;
pub use tokens::{Claims, TokenKind, TokenPair, TokenService};

use tally_database::{Collection, Database};
use tally_domain::config::ApiConfig;
use tally_domain::records::UserRecord;
use tally_kernel::domain::registry::InitializedSlice;
use tracing::info;

/// Identity feature state
#[tally_derive::tally_slice]
pub struct Identity {
    pub users: Collection<UserRecord>,
    pub tokens: TokenService,
    /// `None` while GitHub login is not configured.
    pub github: Option<GithubClient>,
}

/// Initialize the identity feature.
///
/// # Errors
/// * [`IdentityError::Config`] for unusable JWT settings.
/// * [`IdentityError::Database`] if the users collection cannot be opened.
pub async fn init(config: &ApiConfig, database: &Database) -> Result<InitializedSlice, IdentityError> {
    let tokens = TokenService::from_config(&config.security.jwt)?;
    let users = database.collection::<UserRecord>().await.context("Opening users")?;
    let github = if config.security.github.is_enabled() {
        Some(GithubClient::new(config.security.github.clone())?)
    } else {
        None
    };

    info!(users = users.len(), github = github.is_some(), "Identity server slice initialized");

    Ok(InitializedSlice::new(Identity::new(IdentityInner { users, tokens, github })))
}

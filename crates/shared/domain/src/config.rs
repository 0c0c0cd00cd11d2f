use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Every section of `server.toml`.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub frontend: FrontendConfig,
    pub logging: LoggingConfig,
}

/// Arc-wrapped configuration, cheap to clone into handlers and slices.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(from = "ApiConfigInner")]
pub struct ApiConfig {
    inner: Arc<ApiConfigInner>,
}

impl From<ApiConfigInner> for ApiConfig {
    fn from(inner: ApiConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// PEM certificate and key for HTTPS.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt: JwtConfig,
    pub github: GithubConfig,
}

/// Access/refresh token signing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    /// `HS256`, `HS384` or `HS512`.
    pub algorithm: String,
    pub access_ttl_minutes: u64,
    pub refresh_ttl_days: u64,
    pub leeway_seconds: u64,
}

/// GitHub OAuth application. Login through GitHub is off while `client_id` is empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub user_url: String,
}

impl GithubConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.client_id.trim().is_empty()
    }
}

/// Embedded document store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub data_dir: PathBuf,
    /// Write JSON snapshots after every change; `false` keeps data in memory only.
    pub persist: bool,
}

/// Static assets and page templates.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub static_dir: PathBuf,
    pub templates_dir: PathBuf,
}

/// Tailwind configuration documents describing the frontend build.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    pub tailwind_configs: Vec<PathBuf>,
    /// Refuse to start when a document is missing or invalid.
    pub strict: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for rolling log files; console only when unset.
    pub path: Option<PathBuf>,
    pub json: bool,
    /// Filter directives such as `tally=debug,tower_http=info`.
    pub filter: Option<String>,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 8181, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "dev-only-change-me".to_owned(),
            algorithm: "HS256".to_owned(),
            access_ttl_minutes: 30,
            refresh_ttl_days: 7,
            leeway_seconds: 0,
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            authorize_url: "https://github.com/login/oauth/authorize".to_owned(),
            token_url: "https://github.com/login/oauth/access_token".to_owned(),
            user_url: "https://api.github.com/user".to_owned(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("data"), persist: true }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("assets"),
            templates_dir: PathBuf::from("frontend/templates"),
        }
    }
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self { tailwind_configs: vec![PathBuf::from("tailwind.config.js")], strict: false }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), path: None, json: false, filter: None }
    }
}

use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides, e.g. `TALLY__SERVER__PORT`.
pub const ENV_PREFIX: &str = "TALLY";
const ENV_SEPARATOR: &str = "__";
/// Keys whose environment value is a comma separated list.
const LIST_KEYS: &[&str] = &["frontend.tailwind_configs"];

/// Custom error type for config loading.
#[tally_derive::tally_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration from a file overlaid with `TALLY__*` environment variables.
///
/// 1. **Base File**: `path` (default `server`, so `server.toml`); it must exist.
/// 2. **Environment Overrides**: nested keys are joined with a double underscore
///    (`TALLY__SECURITY__JWT__SECRET` maps to `security.jwt.secret`).
///
/// # Errors
/// Fails when the file is missing or its content does not match `T`.
///
/// # Example
/// ```rust
/// use tally_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_config_with_env(path, None)
}

/// Same as [`load_config`] but reads overrides from `env` instead of the process environment.
///
/// Keys in `env` use the full variable names (`TALLY__SERVER__PORT`).
///
/// # Errors
/// See [`load_config`].
pub fn load_config_with_env<T>(
    path: Option<impl AsRef<Path>>,
    env: Option<HashMap<String, String>>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());

    let environment = LIST_KEYS.iter().fold(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .list_separator(",")
            .try_parsing(true)
            .source(env),
        |environment, key| environment.with_list_parse_key(key),
    );

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(environment);

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

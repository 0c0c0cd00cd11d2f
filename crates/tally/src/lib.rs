//! Facade crate for Tally features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Call [`init`] once at startup to build every feature slice.
//! - Mount [`router`] on the application state assembled from those slices.

use tally_database::Database;
use tally_domain::config::ApiConfig;
use tally_domain::registry::InitializedSlice;
use tally_kernel::server::ApiState;
use tracing::info;
use utoipa_axum::router::OpenApiRouter;

pub use tally_database as database;
pub use tally_domain as domain;
pub use tally_kernel as kernel;
pub use tally_tailwind as tailwind;

pub mod server {
    pub mod router {
        pub use tally_kernel::server::router::system_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use tally_frontend as frontend;
    pub use tally_identity as identity;
    pub use tally_todos as todos;

    /// Features compiled into this build, in initialization order.
    pub const ENABLED: &[&str] = &["identity", "todos", "frontend"];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

pub type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Initialize all features for server mode.
///
/// # Errors
/// Returns an error if any feature initialization fails.
pub async fn init(
    config: &ApiConfig,
    database: &Database,
) -> Result<Vec<InitializedSlice>, InitError> {
    let slices = vec![
        // Identity first: every other slice authenticates through it
        features::identity::init(config, database).await?,
        features::todos::init(database).await?,
        features::frontend::init(config)?,
    ];

    info!(slices = ?slices.iter().map(|s| s.name).collect::<Vec<_>>(), "Feature slices ready");
    Ok(slices)
}

/// System routes plus every feature's routes, with their `OpenAPI` paths.
pub fn router() -> OpenApiRouter<ApiState> {
    server::router::system_router()
        .merge(features::identity::router())
        .merge(features::todos::router())
        .merge(features::frontend::router())
}

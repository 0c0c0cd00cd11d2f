//! Frontend feature slice: Jinja pages and the Tailwind documents the pages are styled with.

mod error;
mod handlers;
mod tailwind;

pub use error::{FrontendError, FrontendErrorExt};
pub use handlers::{SAMPLE_ITEMS, SampleItem};
pub use tailwind::{ProblemBody, TailwindReport, check_documents};

use minijinja::{Environment, path_loader};
use tally_domain::config::ApiConfig;
use tally_kernel::domain::registry::InitializedSlice;
use tally_kernel::server::ApiState;
use tracing::{info, warn};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[tally_derive::tally_slice]
pub struct Frontend {
    pub templates: Environment<'static>,
    /// Startup state of every configured Tailwind document, in configuration order.
    pub tailwind: Vec<TailwindReport>,
}

/// Initialize the frontend feature.
///
/// # Errors
/// [`FrontendError::Tailwind`] for a broken document when `frontend.strict` is set.
pub fn init(config: &ApiConfig) -> Result<InitializedSlice, FrontendError> {
    let templates_dir = &config.storage.templates_dir;
    if !templates_dir.is_dir() {
        warn!(dir = %templates_dir.display(), "Templates directory is missing");
    }

    let mut templates = Environment::new();
    templates.set_loader(path_loader(templates_dir));

    let tailwind = check_documents(&config.frontend.tailwind_configs, config.frontend.strict)?;

    info!(
        templates = %templates_dir.display(),
        tailwind_documents = tailwind.len(),
        "Frontend server slice initialized"
    );

    Ok(InitializedSlice::new(Frontend::new(FrontendInner { templates, tailwind })))
}

/// `GET /jinja/` and `GET /api/v1/frontend/tailwind`.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::jinja_handler))
        .routes(routes!(handlers::tailwind_handler))
}

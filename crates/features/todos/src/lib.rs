//! Todos feature slice: each user's task list.

mod error;
mod handlers;

pub use error::{TodosError, TodosErrorExt};
pub use handlers::{DeletedResponse, TodoRequest, TodoView};

use tally_database::{Collection, Database};
use tally_domain::records::TodoRecord;
use tally_kernel::domain::registry::InitializedSlice;
use tally_kernel::server::ApiState;
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[tally_derive::tally_slice]
pub struct Todos {
    pub store: Collection<TodoRecord>,
}

/// Initialize the todos feature.
///
/// # Errors
/// [`TodosError::Database`] if the collection cannot be opened.
pub async fn init(database: &Database) -> Result<InitializedSlice, TodosError> {
    let store = database.collection::<TodoRecord>().await.context("Opening todos")?;
    info!(todos = store.len(), "Todos server slice initialized");
    Ok(InitializedSlice::new(Todos::new(TodosInner { store })))
}

/// `/api/v1/todo/*`; every route requires an authenticated user.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::list_handler, handlers::create_handler))
        .routes(routes!(handlers::update_handler, handlers::delete_handler))
}

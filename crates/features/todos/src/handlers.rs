use crate::Todos;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tally_derive::{api_handler, api_model};
use tally_domain::records::TodoRecord;
use tally_identity::AuthUser;
use tally_kernel::prelude::*;
use tracing::{debug, info};

#[api_model(rename_all = "snake_case")]
pub struct TodoRequest {
    pub name: String,
    pub description: String,
    pub task_complete: bool,
}

#[api_model(rename_all = "snake_case")]
pub struct TodoView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub task_complete: bool,
}

impl From<TodoRecord> for TodoView {
    fn from(todo: TodoRecord) -> Self {
        Self {
            id: todo.id,
            name: todo.name,
            description: todo.description,
            task_complete: todo.task_complete,
        }
    }
}

#[api_model(rename_all = "snake_case")]
pub struct DeletedResponse {
    pub deleted: String,
}

fn todos(state: &ApiState) -> ApiResult<Todos> {
    state.try_get_slice::<Todos>().cloned().map_err(|e| ApiError::from(e.to_string()))
}

fn not_found(id: &str) -> ApiError {
    ApiError::not_found(format!("Todo not found: {id}"))
}

/// The caller's todo with `id`; malformed ids and other users' todos are both 404.
fn owned(todos: &Todos, owner: &str, id: &str) -> ApiResult<TodoRecord> {
    let id = ResourceGuard::verify(id).map_err(|err| {
        debug!(error = %err, "Rejected todo id");
        not_found(id)
    })?;
    todos.store.get(id).filter(|todo| todo.owner_id == owner).ok_or_else(|| not_found(id))
}

fn validate(request: &TodoRequest) -> ApiResult<()> {
    if request.name.trim().is_empty() {
        return Err(ApiError::validation("A todo needs a name."));
    }
    Ok(())
}

#[api_handler(
    get,
    path = "/api/v1/todo/",
    responses(
        (status = OK, description = "The caller's todos, oldest first", body = [TodoView]),
        (status = UNAUTHORIZED, description = "Missing or bad credentials", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TODOS_TAG,
)]
pub(crate) async fn list_handler(
    State(state): State<ApiState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<TodoView>>> {
    let todos = todos(&state)?;
    let items = todos.store.find(|todo| todo.owner_id == user.id);
    Ok(Json(items.into_iter().map(TodoView::from).collect()))
}

#[api_handler(
    post,
    path = "/api/v1/todo/",
    request_body = TodoRequest,
    responses(
        (status = CREATED, description = "Todo created", body = TodoView),
        (status = UNPROCESSABLE_ENTITY, description = "Blank name", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TODOS_TAG,
)]
pub(crate) async fn create_handler(
    State(state): State<ApiState>,
    AuthUser(user): AuthUser,
    Json(request): Json<TodoRequest>,
) -> ApiResult<(StatusCode, Json<TodoView>)> {
    validate(&request)?;
    let todos = todos(&state)?;
    let todo = todos
        .store
        .insert(TodoRecord {
            id: safe_nanoid!(),
            owner_id: user.id,
            name: request.name,
            description: request.description,
            task_complete: request.task_complete,
        })
        .await?;
    info!(todo_id = %todo.id, "Todo created");
    Ok((StatusCode::CREATED, Json(todo.into())))
}

#[api_handler(
    put,
    path = "/api/v1/todo/{id}",
    params(("id" = String, Path, description = "Todo id")),
    request_body = TodoRequest,
    responses(
        (status = OK, description = "Todo updated", body = TodoView),
        (status = NOT_FOUND, description = "No such todo for this user", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TODOS_TAG,
)]
pub(crate) async fn update_handler(
    State(state): State<ApiState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(request): Json<TodoRequest>,
) -> ApiResult<Json<TodoView>> {
    validate(&request)?;
    let todos = todos(&state)?;
    let todo = owned(&todos, &user.id, &id)?;
    let updated = todos
        .store
        .update(&todo.id, |stored| {
            stored.name = request.name;
            stored.description = request.description;
            stored.task_complete = request.task_complete;
        })
        .await?
        .ok_or_else(|| not_found(&id))?;
    info!(todo_id = %updated.id, "Todo updated");
    Ok(Json(updated.into()))
}

#[api_handler(
    delete,
    path = "/api/v1/todo/{id}",
    params(("id" = String, Path, description = "Todo id")),
    responses(
        (status = OK, description = "Todo deleted", body = DeletedResponse),
        (status = NOT_FOUND, description = "No such todo for this user", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = TODOS_TAG,
)]
pub(crate) async fn delete_handler(
    State(state): State<ApiState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DeletedResponse>> {
    let todos = todos(&state)?;
    let todo = owned(&todos, &user.id, &id)?;
    todos.store.remove(&todo.id).await?.ok_or_else(|| not_found(&id))?;
    info!(todo_id = %todo.id, "Todo deleted");
    Ok(Json(DeletedResponse { deleted: todo.id }))
}

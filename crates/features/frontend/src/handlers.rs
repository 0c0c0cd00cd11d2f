use crate::error::FrontendErrorExt;
use crate::tailwind::TailwindReport;
use crate::Frontend;
use axum::Json;
use axum::extract::{Query, State};
use axum::response::Html;
use minijinja::context;
use serde::{Deserialize, Serialize};
use tally_derive::api_handler;
use tally_domain::constants::FRONTEND_TAG;
use tally_kernel::server::{ApiError, ApiResult, ApiState, ErrorBody};
use utoipa::IntoParams;

const HOME_TEMPLATE: &str = "home.html";
const DEFAULT_NAME: &str = "Sample Person";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SampleItem {
    pub name: &'static str,
    pub code: &'static str,
}

/// Static list the home page renders.
pub const SAMPLE_ITEMS: [SampleItem; 2] = [
    SampleItem { name: "Lemon Sour", code: "TOM" },
    SampleItem { name: "Cherry Blossom", code: "CLH" },
];

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct JinjaQuery {
    /// Who to greet.
    name: Option<String>,
}

fn frontend(state: &ApiState) -> ApiResult<Frontend> {
    state.try_get_slice::<Frontend>().cloned().map_err(|e| ApiError::from(e.to_string()))
}

#[api_handler(
    get,
    path = "/jinja/",
    params(JinjaQuery),
    responses(
        (status = OK, description = "Rendered home page", content_type = "text/html", body = String),
        (status = INTERNAL_SERVER_ERROR, description = "Template missing or broken", body = ErrorBody),
    ),
    tag = FRONTEND_TAG,
)]
pub(crate) async fn jinja_handler(
    State(state): State<ApiState>,
    Query(query): Query<JinjaQuery>,
) -> ApiResult<Html<String>> {
    let frontend = frontend(&state)?;
    let name = query.name.unwrap_or_else(|| DEFAULT_NAME.to_owned());

    let page = frontend
        .templates
        .get_template(HOME_TEMPLATE)
        .and_then(|template| template.render(context! { name, items => SAMPLE_ITEMS }))
        .context(HOME_TEMPLATE)
        .map_err(|e| ApiError::from(e.to_string()))?;
    Ok(Html(page))
}

#[api_handler(
    get,
    path = "/api/v1/frontend/tailwind",
    responses((status = OK, description = "Configured Tailwind documents", body = [TailwindReport])),
    tag = FRONTEND_TAG,
)]
pub(crate) async fn tailwind_handler(
    State(state): State<ApiState>,
) -> ApiResult<Json<Vec<TailwindReport>>> {
    Ok(Json(frontend(&state)?.tailwind.clone()))
}

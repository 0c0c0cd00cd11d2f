use axum::Router;
use axum::middleware;
use tally::kernel::prelude::ApiState;
use tally::kernel::server::logging::log_requests;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(title = "Tally API"), modifiers(&BearerAuth))]
struct ApiDoc;

/// Declares the `bearer` scheme the protected routes refer to.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build(),
            ),
        );
    }
}

#[allow(unreachable_pub)]
pub fn init(state: ApiState) -> Router {
    let static_dir = state.config.storage.static_dir.clone();
    let api = ApiDoc::openapi();

    // Separate the OpenAPI routes and the API documentation object
    let (openapi_routes, api_doc) =
        OpenApiRouter::with_openapi(api).merge(tally::router()).with_state(state).split_for_parts();

    // Create the Scalar UI routes
    let scalar_routes = Scalar::with_url("/api", api_doc);

    Router::new()
        .merge(openapi_routes)
        .merge(scalar_routes)
        .nest_service("/assets", ServeDir::new(static_dir))
        .layer(middleware::from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
}

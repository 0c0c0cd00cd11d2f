use crate::handlers;
use tally_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// `/api/v1/auth/*` and `/api/v1/user/*`.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::token_handler))
        .routes(routes!(handlers::refresh_handler))
        .routes(routes!(handlers::logout_handler))
        .routes(routes!(handlers::github_login_handler))
        .routes(routes!(handlers::github_code_handler))
        .routes(routes!(handlers::create_user_handler))
        .routes(routes!(handlers::me_handler))
}

use super::health;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Routes that belong to no feature: `GET /` and `GET /health`.
pub fn system_router<S>() -> OpenApiRouter<S>
where
    S: Send + Sync + Clone + 'static,
{
    OpenApiRouter::<S>::new()
        .routes(routes!(health::root_handler))
        .routes(routes!(health::health_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let (router, _) = system_router::<()>().split_for_parts();
        router
    }

    #[tokio::test]
    async fn root_says_hello() {
        let response =
            app().oneshot(Request::get("/").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "hello": "world" }));
    }

    #[tokio::test]
    async fn health_is_never_cached() {
        let response =
            app().oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["cache-control"], "no-store, no-cache, must-revalidate");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "up");
    }

    #[test]
    fn routes_are_documented() {
        let (_, api) = system_router::<()>().split_for_parts();
        assert!(api.paths.paths.contains_key("/"));
        assert!(api.paths.paths.contains_key("/health"));
    }
}

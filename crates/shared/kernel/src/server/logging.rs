//! Per-request access log.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;
use tracing::info;

/// Logs every request with its path, method, query and duration in milliseconds.
///
/// Mount with `axum::middleware::from_fn(log_requests)`.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let url = request.uri().path().to_owned();
    let query_params = request.uri().query().map(str::to_owned);
    let started = Instant::now();

    let response = next.run(request).await;

    let time_to_complete = started.elapsed().as_secs_f64() * 1000.0;
    match query_params {
        Some(query_params) => info!(
            %url,
            %method,
            %query_params,
            status = response.status().as_u16(),
            time_to_complete,
            "Request handled"
        ),
        None => info!(
            %url,
            %method,
            status = response.status().as_u16(),
            time_to_complete,
            "Request handled"
        ),
    }

    response
}

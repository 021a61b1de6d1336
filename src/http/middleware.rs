use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::http::AppError;
use crate::AppState;

/// Cancels the handler once `state.request_timeout` elapses and answers with a 408 envelope.
pub async fn request_timeout_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tokio::time::timeout(state.request_timeout, next.run(request))
        .await
        .map_err(|_| {
            tracing::warn!(
                %method,
                %path,
                timeout_ms = state.request_timeout.as_millis() as u64,
                "request timed out"
            );
            AppError::request_timeout("La solicitud excedió el tiempo máximo de espera")
        })
}

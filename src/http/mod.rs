use axum::middleware::from_fn_with_state;
use axum::Router;

use crate::AppState;

mod error;
mod handlers;
mod middleware;
pub mod openapi;
mod routes;

pub use error::AppError;

/// Blog routes nested under `state.api_base_path`; health and API docs stay at the root.
///
/// Unknown paths, unsupported methods and timed-out requests all answer with the
/// error envelope.
pub fn router(state: AppState) -> Router {
    let api = Router::new().merge(routes::posts()).merge(routes::comments());
    let api = match state.api_base_path.as_str() {
        "" | "/" => api,
        base_path => Router::new().nest(base_path, api),
    };

    Router::new()
        .merge(routes::health())
        .merge(api)
        .fallback(handlers::route_not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::request_timeout_middleware,
        ))
        .with_state(state)
}

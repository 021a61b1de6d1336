use axum::{routing::delete, routing::get, routing::post, routing::put, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api-docs/openapi.json", get(handlers::openapi_json))
}

pub fn posts() -> Router<AppState> {
    Router::new()
        .route("/agregarPublicacion", post(handlers::create_post))
        .route("/listarPublicaciones", get(handlers::list_posts))
        .route("/listarPublicaciones/:id", get(handlers::get_post))
        .route("/filtrarPorCurso", get(handlers::filter_by_course))
        .route("/filtrarPorTitulo", get(handlers::filter_by_title))
        .route("/filtrarPorFechas", get(handlers::filter_by_dates))
        .route("/editarPublicacion/:id", put(handlers::update_post))
        .route("/eliminarPublicacion/:id", delete(handlers::delete_post))
}

pub fn comments() -> Router<AppState> {
    Router::new()
        .route("/agregarcomentarios/:post_id", post(handlers::add_comment))
        .route("/editarcomentarios/:comment_id", put(handlers::edit_comment))
        .route("/eliminarcomentarios/:comment_id", delete(handlers::delete_comment))
        .route(
            "/comentariosPublicacion/:post_id",
            get(handlers::list_post_comments),
        )
}

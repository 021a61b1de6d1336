use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::comments::CommentService;
use crate::app::posts::{CreatePostInput, PostService};
use crate::domain::comment::{Comment, CommentSummary, CommentWithPost};
use crate::domain::post::{Post, PostView};
use crate::http::AppError;
use crate::AppState;

type Reply<T> = Result<(StatusCode, Json<Envelope<T>>), AppError>;

/// Success body: `{success, message, ...payload}`.
#[derive(Serialize)]
pub struct Envelope<T> {
    success: bool,
    message: &'static str,
    #[serde(flatten)]
    payload: T,
}

fn reply<T>(status: StatusCode, message: &'static str, payload: T) -> Reply<T> {
    Ok((
        status,
        Json(Envelope {
            success: true,
            message,
            payload,
        }),
    ))
}

#[derive(Serialize)]
pub struct PostPayload<T> {
    publicacion: T,
}

#[derive(Serialize)]
pub struct PostListPayload<T> {
    total: usize,
    publicaciones: Vec<T>,
}

#[derive(Serialize)]
pub struct CommentPayload<T> {
    comentario: T,
}

#[derive(Serialize)]
pub struct CommentListPayload {
    total: usize,
    comentarios: Vec<CommentSummary>,
}

#[derive(Serialize)]
pub(crate) struct HealthPayload {
    status: &'static str,
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::bad_request(format!("El ID {} no es válido", what)))
}

pub(crate) async fn health(
    State(state): State<AppState>,
) -> (StatusCode, Json<Envelope<HealthPayload>>) {
    let (status, success, message, health) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, true, "Servicio disponible", "ok"),
        Err(err) => {
            tracing::warn!(error = ?err, "store ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                false,
                "El almacenamiento no responde",
                "degraded",
            )
        }
    };

    (
        status,
        Json(Envelope {
            success,
            message,
            payload: HealthPayload { status: health },
        }),
    )
}

pub(crate) async fn route_not_found() -> AppError {
    AppError::not_found("La ruta solicitada no existe")
}

pub(crate) async fn method_not_allowed() -> AppError {
    AppError::method_not_allowed("Método no permitido para esta ruta")
}

pub async fn openapi_json(State(state): State<AppState>) -> Json<utoipa::openapi::OpenApi> {
    Json(crate::http::openapi::doc(&state.api_base_path))
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    #[serde(alias = "tituloPublicacion")]
    pub title: Option<String>,
    #[serde(alias = "descripcionPublicacion")]
    pub description: Option<String>,
    #[serde(alias = "cursoPublicacion")]
    pub course: Option<String>,
    #[serde(
        default,
        rename = "publishedAt",
        alias = "fechaPublicacion",
        with = "time::serde::rfc3339::option"
    )]
    pub published_at: Option<OffsetDateTime>,
}

pub async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Reply<PostPayload<Post>> {
    let Json(payload) = payload?;

    let service = PostService::new(state.store.clone());
    let post = service
        .create_post(CreatePostInput {
            title: payload.title,
            description: payload.description,
            course: payload.course,
            published_at: payload.published_at,
        })
        .await
        .map_err(|err| AppError::from_service(err, "Error al agregar la publicación"))?;

    reply(
        StatusCode::CREATED,
        "La publicación se ha agregado correctamente",
        PostPayload { publicacion: post },
    )
}

#[derive(Deserialize)]
pub struct ListPostsQuery {
    #[serde(rename = "incluirComentarios")]
    pub include_comments: Option<bool>,
}

pub async fn list_posts(
    State(state): State<AppState>,
    query: Result<Query<ListPostsQuery>, QueryRejection>,
) -> Reply<PostListPayload<PostView>> {
    let Query(query) = query?;

    let service = PostService::new(state.store.clone());
    let posts = service
        .list_posts(query.include_comments.unwrap_or(true))
        .await
        .map_err(|err| AppError::from_service(err, "Error al listar las publicaciones"))?;

    reply(
        StatusCode::OK,
        "Lista de publicaciones",
        PostListPayload {
            total: posts.len(),
            publicaciones: posts,
        },
    )
}

pub async fn get_post(
    id: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> Reply<PostPayload<PostView>> {
    let Path(id) = id?;
    let id = parse_id(&id, "de la publicación")?;

    let service = PostService::new(state.store.clone());
    let post = service
        .get_post(id)
        .await
        .map_err(|err| AppError::from_service(err, "Error al obtener la publicación"))?;

    reply(
        StatusCode::OK,
        "Publicación encontrada",
        PostPayload { publicacion: post },
    )
}

#[derive(Deserialize)]
pub struct CourseQuery {
    pub curso: Option<String>,
}

pub async fn filter_by_course(
    State(state): State<AppState>,
    query: Result<Query<CourseQuery>, QueryRejection>,
) -> Reply<PostListPayload<Post>> {
    let Query(query) = query?;

    let service = PostService::new(state.store.clone());
    let posts = service
        .filter_by_course(query.curso.as_deref())
        .await
        .map_err(|err| {
            AppError::from_service(err, "Error al filtrar las publicaciones por curso")
        })?;

    reply(
        StatusCode::OK,
        "Publicaciones filtradas por curso",
        PostListPayload {
            total: posts.len(),
            publicaciones: posts,
        },
    )
}

#[derive(Deserialize)]
pub struct TitleQuery {
    pub titulo: Option<String>,
}

pub async fn filter_by_title(
    State(state): State<AppState>,
    query: Result<Query<TitleQuery>, QueryRejection>,
) -> Reply<PostListPayload<Post>> {
    let Query(query) = query?;

    let service = PostService::new(state.store.clone());
    let posts = service
        .filter_by_title(query.titulo.as_deref())
        .await
        .map_err(|err| {
            AppError::from_service(err, "Error al filtrar las publicaciones por título")
        })?;

    reply(
        StatusCode::OK,
        "Publicaciones filtradas por título",
        PostListPayload {
            total: posts.len(),
            publicaciones: posts,
        },
    )
}

#[derive(Deserialize)]
pub struct DateRangeQuery {
    #[serde(rename = "fechaInicio")]
    pub start: Option<String>,
    #[serde(rename = "fechaFin")]
    pub end: Option<String>,
}

pub async fn filter_by_dates(
    State(state): State<AppState>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Reply<PostListPayload<Post>> {
    let Query(query) = query?;

    let service = PostService::new(state.store.clone());
    let posts = service
        .filter_by_date_range(query.start.as_deref(), query.end.as_deref())
        .await
        .map_err(|err| {
            AppError::from_service(err, "Error al filtrar las publicaciones por fechas")
        })?;

    reply(
        StatusCode::OK,
        "Publicaciones filtradas por fechas",
        PostListPayload {
            total: posts.len(),
            publicaciones: posts,
        },
    )
}

#[derive(Deserialize)]
pub struct UpdatePostRequest {
    #[serde(alias = "tituloPublicacion")]
    pub title: Option<String>,
    #[serde(alias = "descripcionPublicacion")]
    pub description: Option<String>,
}

pub async fn update_post(
    id: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Reply<PostPayload<Post>> {
    let Path(id) = id?;
    let id = parse_id(&id, "de la publicación")?;
    let Json(payload) = payload?;

    let service = PostService::new(state.store.clone());
    let post = service
        .update_post(id, payload.title, payload.description)
        .await
        .map_err(|err| AppError::from_service(err, "Error al editar la publicación"))?;

    reply(
        StatusCode::OK,
        "Publicación editada correctamente",
        PostPayload { publicacion: post },
    )
}

pub async fn delete_post(
    id: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> Reply<PostPayload<Post>> {
    let Path(id) = id?;
    let id = parse_id(&id, "de la publicación")?;

    let service = PostService::new(state.store.clone());
    let post = service
        .delete_post(id)
        .await
        .map_err(|err| AppError::from_service(err, "Error al eliminar la publicación"))?;

    reply(
        StatusCode::OK,
        "Publicación eliminada correctamente",
        PostPayload { publicacion: post },
    )
}

#[derive(Deserialize)]
pub struct AddCommentRequest {
    pub usuario: Option<String>,
    #[serde(rename = "contenidoComentario")]
    pub contenido_comentario: Option<String>,
}

pub async fn add_comment(
    post_id: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<AddCommentRequest>, JsonRejection>,
) -> Reply<CommentPayload<CommentWithPost>> {
    let Path(post_id) = post_id?;
    let post_id = parse_id(&post_id, "de la publicación")?;
    let Json(payload) = payload?;

    let service = CommentService::new(state.store.clone(), state.ref_sync_retries);
    let comment = service
        .add_comment(post_id, payload.usuario, payload.contenido_comentario)
        .await
        .map_err(|err| AppError::from_service(err, "Error al agregar el comentario"))?;

    reply(
        StatusCode::CREATED,
        "Comentario agregado correctamente",
        CommentPayload {
            comentario: comment,
        },
    )
}

#[derive(Deserialize)]
pub struct EditCommentRequest {
    #[serde(rename = "contenidoComentario")]
    pub contenido_comentario: Option<String>,
}

pub async fn edit_comment(
    comment_id: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<EditCommentRequest>, JsonRejection>,
) -> Reply<CommentPayload<Comment>> {
    let Path(comment_id) = comment_id?;
    let comment_id = parse_id(&comment_id, "del comentario")?;
    let Json(payload) = payload?;

    let service = CommentService::new(state.store.clone(), state.ref_sync_retries);
    let comment = service
        .edit_comment(comment_id, payload.contenido_comentario)
        .await
        .map_err(|err| AppError::from_service(err, "Error al editar el comentario"))?;

    reply(
        StatusCode::OK,
        "Comentario editado correctamente",
        CommentPayload {
            comentario: comment,
        },
    )
}

pub async fn delete_comment(
    comment_id: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> Reply<CommentPayload<Comment>> {
    let Path(comment_id) = comment_id?;
    let comment_id = parse_id(&comment_id, "del comentario")?;

    let service = CommentService::new(state.store.clone(), state.ref_sync_retries);
    let comment = service
        .delete_comment(comment_id)
        .await
        .map_err(|err| AppError::from_service(err, "Error al eliminar el comentario"))?;

    reply(
        StatusCode::OK,
        "Comentario eliminado correctamente",
        CommentPayload {
            comentario: comment,
        },
    )
}

pub async fn list_post_comments(
    post_id: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> Reply<CommentListPayload> {
    let Path(post_id) = post_id?;
    let post_id = parse_id(&post_id, "de la publicación")?;

    let service = CommentService::new(state.store.clone(), state.ref_sync_retries);
    let comments = service.list_for_post(post_id).await.map_err(|err| {
        AppError::from_service(err, "Error al obtener los comentarios de la publicación")
    })?;

    reply(
        StatusCode::OK,
        "Comentarios de la publicación",
        CommentListPayload {
            total: comments.len(),
            comentarios: comments,
        },
    )
}

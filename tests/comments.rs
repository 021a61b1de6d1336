//! Comment Tests
//!
//! Adding, editing, deleting and listing comments, and keeping the
//! post's `commentRefs` in step.

mod common;

use axum::http::StatusCode;
use common::{app, app_with_memory};
use serde_json::json;
use uuid::Uuid;

// ===========================================================================
// Adding
// ===========================================================================

#[tokio::test]
async fn add_comment_links_post() {
    let app = app();
    let post_id = app.create_post("Con comentarios", "Taller III").await;

    let resp = app
        .post_json(
            &format!("/agregarcomentarios/{}", post_id),
            json!({ "usuario": "ana", "contenidoComentario": "Muy claro" }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let body = resp.json();
    assert_eq!(body["message"], json!("Comentario agregado correctamente"));
    let comment = &body["comentario"];
    assert_eq!(comment["author"], json!("ana"));
    assert_eq!(comment["content"], json!("Muy claro"));
    assert_eq!(comment["parentPostId"].as_str().unwrap(), post_id);
    assert_eq!(comment["publicacion"]["id"].as_str().unwrap(), post_id);
    assert_eq!(comment["publicacion"]["title"], json!("Con comentarios"));

    let comment_id = comment["id"].as_str().unwrap().to_string();
    assert_eq!(app.comment_refs(&post_id).await, vec![comment_id]);
}

#[tokio::test]
async fn add_comment_to_nonexistent_post() {
    let (app, memory) = app_with_memory();

    let resp = app
        .post_json(
            &format!("/agregarcomentarios/{}", Uuid::new_v4()),
            json!({ "usuario": "ana", "contenidoComentario": "Hola" }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.message(), "La publicación especificada no existe");
    assert_eq!(memory.comment_count().await, 0);
}

#[tokio::test]
async fn add_comment_requires_author_and_content() {
    let (app, memory) = app_with_memory();
    let post_id = app.create_post("Validaciones", "Taller III").await;

    let resp = app
        .post_json(
            &format!("/agregarcomentarios/{}", post_id),
            json!({ "contenidoComentario": "Sin autor" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.message(), "El campo 'usuario' es obligatorio");

    let resp = app
        .post_json(
            &format!("/agregarcomentarios/{}", post_id),
            json!({ "usuario": "   ", "contenidoComentario": "Autor en blanco" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .post_json(
            &format!("/agregarcomentarios/{}", post_id),
            json!({ "usuario": "ana" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.message(), "El campo 'contenidoComentario' es obligatorio");

    assert_eq!(memory.comment_count().await, 0);
    assert!(app.comment_refs(&post_id).await.is_empty());
}

#[tokio::test]
async fn add_comment_content_too_long() {
    let app = app();
    let post_id = app.create_post("Límites", "Taller III").await;

    let resp = app
        .post_json(
            &format!("/agregarcomentarios/{}", post_id),
            json!({ "usuario": "ana", "contenidoComentario": "x".repeat(501) }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.message(),
        "El campo 'contenidoComentario' no debe superar los 500 caracteres"
    );
}

#[tokio::test]
async fn add_comment_malformed_post_id() {
    let app = app();

    let resp = app
        .post_json(
            "/agregarcomentarios/123",
            json!({ "usuario": "ana", "contenidoComentario": "Hola" }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.message(), "El ID de la publicación no es válido");
}

// ===========================================================================
// Editing
// ===========================================================================

#[tokio::test]
async fn edit_comment_replaces_content_only() {
    let app = app();
    let post_id = app.create_post("Editar", "Taller III").await;
    let comment_id = app.add_comment(&post_id, "ana", "Borrador").await;

    let resp = app
        .put_json(
            &format!("/editarcomentarios/{}", comment_id),
            json!({ "contenidoComentario": "Versión final", "usuario": "otro" }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let comment = &resp.json()["comentario"];
    assert_eq!(comment["content"], json!("Versión final"));
    assert_eq!(comment["author"], json!("ana"));
    assert_eq!(comment["parentPostId"].as_str().unwrap(), post_id);
}

#[tokio::test]
async fn edit_comment_rejects_empty_content() {
    let app = app();
    let post_id = app.create_post("Editar", "Taller III").await;
    let comment_id = app.add_comment(&post_id, "ana", "Borrador").await;

    let resp = app
        .put_json(
            &format!("/editarcomentarios/{}", comment_id),
            json!({ "contenidoComentario": "" }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn edit_nonexistent_comment() {
    let app = app();

    let resp = app
        .put_json(
            &format!("/editarcomentarios/{}", Uuid::new_v4()),
            json!({ "contenidoComentario": "Nada" }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.message(), "El comentario especificado no existe");
}

// ===========================================================================
// Deleting
// ===========================================================================

#[tokio::test]
async fn delete_comment_unlinks_post() {
    let app = app();
    let post_id = app.create_post("Borrar", "Taller III").await;
    let keep = app.add_comment(&post_id, "ana", "Me quedo").await;
    let gone = app.add_comment(&post_id, "luis", "Me voy").await;

    let resp = app.delete(&format!("/eliminarcomentarios/{}", gone)).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["comentario"]["id"].as_str().unwrap(), gone);
    assert_eq!(app.comment_refs(&post_id).await, vec![keep]);

    let resp = app.delete(&format!("/eliminarcomentarios/{}", gone)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_comment_malformed_id() {
    let app = app();

    let resp = app.delete("/eliminarcomentarios/abc").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.message(), "El ID del comentario no es válido");
}

// ===========================================================================
// Listing
// ===========================================================================

#[tokio::test]
async fn list_comments_in_insertion_order() {
    let app = app();
    let post_id = app.create_post("Hilo", "Taller III").await;
    let first = app.add_comment(&post_id, "ana", "Uno").await;
    let second = app.add_comment(&post_id, "luis", "Dos").await;
    let third = app.add_comment(&post_id, "eva", "Tres").await;
    let other = app.create_post("Otro hilo", "Taller III").await;
    app.add_comment(&other, "ana", "Ajeno").await;

    let resp = app.get(&format!("/comentariosPublicacion/{}", post_id)).await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["total"], json!(3));
    let listed: Vec<&str> = body["comentarios"]
        .as_array()
        .unwrap()
        .iter()
        .map(|comment| comment["id"].as_str().unwrap())
        .collect();
    assert_eq!(listed, vec![first.as_str(), second.as_str(), third.as_str()]);
    assert!(body["comentarios"][0].get("parentPostId").is_none());
}

#[tokio::test]
async fn list_comments_of_post_without_comments() {
    let app = app();
    let post_id = app.create_post("Silencio", "Taller III").await;

    let resp = app.get(&format!("/comentariosPublicacion/{}", post_id)).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["comentarios"], json!([]));
}

#[tokio::test]
async fn list_comments_of_nonexistent_post() {
    let app = app();

    let resp = app
        .get(&format!("/comentariosPublicacion/{}", Uuid::new_v4()))
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

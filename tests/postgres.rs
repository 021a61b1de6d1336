//! Postgres Store Tests
//!
//! Runs the HTTP flows against a real database. Skipped unless
//! `TEST_DATABASE_URL` is set.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use uuid::Uuid;

use bitacora::infra::db::Db;
use common::TestApp;

async fn pg_app() -> Option<TestApp> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to TEST_DATABASE_URL");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(TestApp::with_store(Arc::new(Db::from_pool(pool))))
}

#[tokio::test]
async fn comment_lifecycle_keeps_refs_in_step() {
    let Some(app) = pg_app().await else {
        return;
    };
    let post_id = app
        .create_post(&format!("pg {}", Uuid::new_v4()), "Taller III")
        .await;

    let first = app.add_comment(&post_id, "ana", "Uno").await;
    let second = app.add_comment(&post_id, "luis", "Dos").await;
    assert_eq!(
        app.comment_refs(&post_id).await,
        vec![first.clone(), second.clone()]
    );

    let resp = app.delete(&format!("/eliminarcomentarios/{}", first)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(app.comment_refs(&post_id).await, vec![second]);

    let resp = app.delete(&format!("/eliminarPublicacion/{}", post_id)).await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn title_filter_escapes_like_wildcards() {
    let Some(app) = pg_app().await else {
        return;
    };
    let marker = Uuid::new_v4().simple().to_string();
    let literal = app
        .create_post(&format!("{} 100%", marker), "Tecnologia III")
        .await;
    let other = app
        .create_post(&format!("{} 1000", marker), "Tecnologia III")
        .await;

    let resp = app
        .get(&format!("/filtrarPorTitulo?titulo={}%20100%25", marker))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["publicaciones"][0]["id"].as_str().unwrap(), literal);

    for id in [literal, other] {
        app.delete(&format!("/eliminarPublicacion/{}", id)).await;
    }
}

#[tokio::test]
async fn date_filter_uses_inclusive_day_bounds() {
    let Some(app) = pg_app().await else {
        return;
    };
    let marker = Uuid::new_v4().simple().to_string();
    let inside = app
        .create_post_published_at(&marker, "1999-12-31T23:59:59.500Z")
        .await;
    let outside = app
        .create_post_published_at(&marker, "2000-01-01T00:00:00Z")
        .await;

    let resp = app
        .get("/filtrarPorFechas?fechaInicio=1999-12-31&fechaFin=1999-12-31")
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let ids: Vec<String> = resp.json()["publicaciones"]
        .as_array()
        .unwrap()
        .iter()
        .map(|post| post["id"].as_str().unwrap().to_string())
        .collect();
    assert!(ids.contains(&inside));
    assert!(!ids.contains(&outside));

    for id in [inside, outside] {
        app.delete(&format!("/eliminarPublicacion/{}", id)).await;
    }
}

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use bitacora::infra::memory::MemoryStore;
use bitacora::infra::store::DocumentStore;
use bitacora::AppState;

pub const BASE: &str = "/blogDeAprendizajeBackend/v1";

// ---------------------------------------------------------------------------
// TestApp — one per test, backed by its own in-memory store
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub store: Arc<dyn DocumentStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: bytes::Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn message(&self) -> String {
        self.json()["message"].as_str().unwrap_or("").to_string()
    }

    pub fn success(&self) -> bool {
        self.json()["success"].as_bool().unwrap_or(false)
    }
}

pub fn app() -> TestApp {
    TestApp::with_store(Arc::new(MemoryStore::new()))
}

/// App plus a direct handle on its store, for asserting on stored state.
pub fn app_with_memory() -> (TestApp, Arc<MemoryStore>) {
    let memory = Arc::new(MemoryStore::new());
    (TestApp::with_store(memory.clone()), memory)
}

impl TestApp {
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_store_and_timeout(store, Duration::from_secs(10))
    }

    pub fn with_store_and_timeout(store: Arc<dyn DocumentStore>, request_timeout: Duration) -> Self {
        let state = AppState {
            store: store.clone(),
            ref_sync_retries: 2,
            api_base_path: BASE.to_string(),
            request_timeout,
        };
        let router = bitacora::http::router(state);

        TestApp { router, store }
    }

    // ------------------------------------------------------------------
    // Low-level request helper
    // ------------------------------------------------------------------
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        let request = if let Some(body) = body {
            builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap()
        } else {
            builder.body(Body::empty()).unwrap()
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot failed");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to collect body")
            .to_bytes();

        TestResponse { status, body_bytes }
    }

    // ------------------------------------------------------------------
    // Convenience HTTP helpers (paths are relative to BASE)
    // ------------------------------------------------------------------
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, &format!("{}{}", BASE, path), None)
            .await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::POST, &format!("{}{}", BASE, path), Some(body))
            .await
    }

    pub async fn put_json(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, &format!("{}{}", BASE, path), Some(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(Method::DELETE, &format!("{}{}", BASE, path), None)
            .await
    }

    // ------------------------------------------------------------------
    // Test data helpers
    // ------------------------------------------------------------------

    /// Create a post through the API. Returns its id.
    pub async fn create_post(&self, title: &str, course: &str) -> String {
        let resp = self
            .post_json(
                "/agregarPublicacion",
                json!({
                    "title": title,
                    "description": "Descripción de prueba",
                    "course": course,
                }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "{:?}", resp.json());
        resp.json()["publicacion"]["id"]
            .as_str()
            .expect("post id")
            .to_string()
    }

    /// Create a post with an explicit `publishedAt`. Returns its id.
    pub async fn create_post_published_at(&self, title: &str, published_at: &str) -> String {
        let resp = self
            .post_json(
                "/agregarPublicacion",
                json!({
                    "title": title,
                    "description": "Descripción de prueba",
                    "course": "Taller III",
                    "publishedAt": published_at,
                }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "{:?}", resp.json());
        resp.json()["publicacion"]["id"]
            .as_str()
            .expect("post id")
            .to_string()
    }

    /// Add a comment through the API. Returns its id.
    pub async fn add_comment(&self, post_id: &str, usuario: &str, contenido: &str) -> String {
        let resp = self
            .post_json(
                &format!("/agregarcomentarios/{}", post_id),
                json!({ "usuario": usuario, "contenidoComentario": contenido }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "{:?}", resp.json());
        resp.json()["comentario"]["id"]
            .as_str()
            .expect("comment id")
            .to_string()
    }

    /// The post's `commentRefs`, read straight from the listing endpoint.
    pub async fn comment_refs(&self, post_id: &str) -> Vec<String> {
        let resp = self.get(&format!("/listarPublicaciones/{}", post_id)).await;
        assert_eq!(resp.status, StatusCode::OK);
        resp.json()["publicacion"]["commentRefs"]
            .as_array()
            .expect("commentRefs")
            .iter()
            .map(|id| id.as_str().unwrap().to_string())
            .collect()
    }
}

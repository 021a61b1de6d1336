pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use std::sync::Arc;
use std::time::Duration;

use crate::infra::store::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub ref_sync_retries: u32,
    /// Prefix the blog routes are nested under, without a trailing slash.
    pub api_base_path: String,
    pub request_timeout: Duration,
}

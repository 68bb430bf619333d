//! Application state.

use std::sync::Arc;

use vod_registry::LinkStore;
use vod_storage::S3Client;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub storage: Arc<S3Client>,
    pub links: Arc<dyn LinkStore>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig, storage: Arc<S3Client>, links: Arc<dyn LinkStore>) -> Self {
        Self {
            config,
            storage,
            links,
        }
    }
}

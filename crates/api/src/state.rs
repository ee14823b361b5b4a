use std::sync::Arc;

use innovate_storage::ObjectStore;

use crate::config::ServerConfig;
use crate::enrichment::MediaProbe;
use crate::lifecycle::{ScriptLifecycle, VideoLifecycle};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: innovate_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub videos: Arc<VideoLifecycle>,
    pub scripts: Arc<ScriptLifecycle>,
}

impl AppState {
    /// Wire the lifecycle services. `probe` is `None` when enrichment is off.
    pub fn new(
        pool: innovate_db::DbPool,
        config: ServerConfig,
        storage: Arc<dyn ObjectStore>,
        probe: Option<Arc<dyn MediaProbe>>,
    ) -> Self {
        let videos = VideoLifecycle::new(
            pool.clone(),
            storage,
            probe,
            config.max_upload_bytes,
        );
        let scripts = ScriptLifecycle::new(pool.clone());

        Self {
            pool,
            config: Arc::new(config),
            videos: Arc::new(videos),
            scripts: Arc::new(scripts),
        }
    }
}

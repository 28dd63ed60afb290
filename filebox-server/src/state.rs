use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use filebox_common::FileStore;

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn FileStore>,
    /// Base directory backing `store`, reported by the health check
    pub base_dir: PathBuf,
    /// Server startup time for uptime calculation
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn FileStore>, base_dir: PathBuf) -> Self {
        Self {
            store,
            base_dir,
            started_at: Instant::now(),
        }
    }
}

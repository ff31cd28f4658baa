//! Application state.

use std::sync::Arc;

use reel_assets::MarkStore;
use reel_queue::JobStore;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<JobStore>,
    pub marks: Arc<MarkStore>,
}

impl AppState {
    pub fn new(config: ApiConfig, store: Arc<JobStore>, marks: Arc<MarkStore>) -> Self {
        Self {
            config,
            store,
            marks,
        }
    }
}

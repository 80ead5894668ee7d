use crate::core::RoomRegistry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state
#[derive(Clone, Default)]
pub struct AppState {
    pub registry: Arc<RwLock<RoomRegistry>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(RoomRegistry::new())),
        }
    }
}

//! Shared state handed to the HTTP handlers.

use std::time::Instant;

use treewarden_core::NetworkManager;

/// State shared by every request handler.
pub struct AppState {
    /// The registry every edge request is arbitrated against.
    pub networks: NetworkManager,
    /// When the node started.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(networks: NetworkManager) -> Self {
        Self {
            networks,
            start_time: Instant::now(),
        }
    }
}

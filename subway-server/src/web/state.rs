//! Application state for the web layer.

use crate::registry::StationRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Station registry shared by all handlers
    pub registry: StationRegistry,
}

impl AppState {
    /// Create a new app state.
    pub fn new(registry: StationRegistry) -> Self {
        Self { registry }
    }
}

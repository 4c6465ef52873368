//! Application state for the web layer.

use std::sync::Arc;

use crate::service::RouteService;

/// Shared application state.
pub struct AppState<S> {
    pub service: Arc<RouteService<S>>,
}

impl<S> AppState<S> {
    pub fn new(service: RouteService<S>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

// Derived Clone would require `S: Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

//! Route service configuration.

/// Largest route the service accepts: positions are `u32`.
pub const MAX_ROUTE_STOPS: usize = u32::MAX as usize;

/// Configuration for [`RouteService`](super::RouteService).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Maximum number of position writes dispatched concurrently (at least 1).
    pub batch_size: usize,

    /// Maximum number of stops in one route (at most [`MAX_ROUTE_STOPS`]).
    pub max_route_stops: usize,
}

impl ServiceConfig {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            ..Self::default()
        }
    }

    pub fn with_max_route_stops(mut self, n: usize) -> Self {
        self.max_route_stops = n.min(MAX_ROUTE_STOPS);
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            batch_size: 8,
            max_route_stops: MAX_ROUTE_STOPS,
        }
    }
}

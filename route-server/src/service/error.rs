//! Route service error types.

use crate::domain::{InvalidId, InvalidRouteNumber, RouteId, RouteStopId, StopId};
use crate::store::StoreError;

/// Errors returned by [`RouteService`](super::RouteService) operations.
///
/// Everything except [`ServiceError::Store`] is a client fault, detected
/// before the store is touched. Topology problems are never errors; they
/// are reported in [`MutationOutcome`](super::MutationOutcome).
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A value supplied by the caller is malformed or out of range
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No route with this id
    #[error("unknown route {0}")]
    UnknownRoute(RouteId),

    /// No route stop with this id
    #[error("unknown route stop {0}")]
    UnknownRouteStop(RouteStopId),

    /// No stop with this id in the stop graph
    #[error("unknown stop {0}")]
    UnknownStop(StopId),

    /// A route with this id already exists
    #[error("route {0} already exists")]
    DuplicateRoute(RouteId),

    /// A route stop with this id already exists
    #[error("route stop {0} already exists")]
    DuplicateRouteStop(RouteStopId),

    /// The store failed a read or write
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Whether the caller is at fault (as opposed to the store).
    pub fn is_client_fault(&self) -> bool {
        !matches!(self, ServiceError::Store(_))
    }
}

impl From<InvalidRouteNumber> for ServiceError {
    fn from(e: InvalidRouteNumber) -> Self {
        ServiceError::InvalidInput(e.to_string())
    }
}

impl From<InvalidId> for ServiceError {
    fn from(e: InvalidId) -> Self {
        ServiceError::InvalidInput(e.to_string())
    }
}

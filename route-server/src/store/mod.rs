//! Persistence for stops, routes and route stops.
//!
//! The [`RouteStore`] trait is the seam between the route service and
//! whatever actually stores the data. It provides the stop graph and the
//! routes on load, and accepts one write per record afterwards.
//!
//! Two implementations are provided:
//! - [`MemoryStore`] keeps everything in memory (tests, demos)
//! - [`JsonFileStore`] wraps a `MemoryStore` and rewrites a JSON snapshot
//!   after every write

mod error;
mod file;
mod memory;
mod snapshot;

use std::collections::HashMap;
use std::future::Future;

use futures::future::try_join_all;

use crate::domain::{Route, RouteId, RouteNumber, RouteStop, RouteStopId, Stop, StopId};
use crate::reconcile::PositionUpdate;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use snapshot::{RouteRecord, RouteStopRecord, Snapshot, StopRecord};

/// Storage backend for the route service.
///
/// Every method is a single independent write or read; the store does not
/// offer transactions.
pub trait RouteStore: Send + Sync {
    /// All stops, keyed by id.
    fn fetch_stops(&self) -> impl Future<Output = Result<HashMap<StopId, Stop>, StoreError>> + Send;

    /// All routes ordered by position, each with its stops ordered by position.
    fn fetch_routes(&self) -> impl Future<Output = Result<Vec<Route>, StoreError>> + Send;

    /// Create an empty route.
    fn insert_route(
        &self,
        id: &RouteId,
        number: RouteNumber,
        position: u32,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a route together with all of its route stops.
    fn delete_route(&self, id: &RouteId) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Change a route's number.
    fn update_route_number(
        &self,
        id: &RouteId,
        number: RouteNumber,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Create a route stop in `route_id`.
    fn insert_route_stop(
        &self,
        route_id: &RouteId,
        route_stop: &RouteStop,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a single route stop.
    fn delete_route_stop(
        &self,
        id: &RouteStopId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Point a route stop at a different stop.
    fn update_route_stop_target(
        &self,
        id: &RouteStopId,
        stop_id: &StopId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Transfer a route stop to another route. Its position is unchanged.
    fn move_route_stop(
        &self,
        id: &RouteStopId,
        route_id: &RouteId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Set a route stop's position.
    fn update_route_stop_position(
        &self,
        id: &RouteStopId,
        position: u32,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Write a batch of position updates.
///
/// Updates are dispatched concurrently, `batch_size` at a time. The batch
/// fails if any update fails; updates that already succeeded are not
/// rolled back.
pub async fn update_positions<S: RouteStore>(
    store: &S,
    updates: &[PositionUpdate],
    batch_size: usize,
) -> Result<(), StoreError> {
    for chunk in updates.chunks(batch_size.max(1)) {
        try_join_all(
            chunk
                .iter()
                .map(|u| store.update_route_stop_position(&u.route_stop_id, u.position)),
        )
        .await?;
    }
    Ok(())
}

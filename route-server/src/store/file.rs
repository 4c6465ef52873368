//! JSON file backed route store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{Route, RouteId, RouteNumber, RouteStop, RouteStopId, Stop, StopId};

use super::RouteStore;
use super::error::StoreError;
use super::memory::MemoryStore;
use super::snapshot::Snapshot;

/// A [`RouteStore`] that persists to a JSON snapshot file.
///
/// Reads are served from memory. Every successful write rewrites the whole
/// snapshot. If the rewrite fails the in-memory change stays applied and
/// the error is returned, so memory and disk may diverge until the next
/// successful write.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
    /// Serializes snapshot rewrites so concurrent writes can't interleave.
    flush_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open an existing snapshot file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let (stops, routes) = Snapshot::load(&path).await?.into_parts()?;
        let inner = MemoryStore::with_routes(stops, routes)?;

        Ok(Self {
            path,
            inner,
            flush_lock: Mutex::new(()),
        })
    }

    /// Create a new snapshot file (overwriting any existing one).
    pub async fn create(path: impl AsRef<Path>, snapshot: Snapshot) -> Result<Self, StoreError> {
        snapshot.save(path.as_ref()).await?;
        Self::open(path).await
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self) -> Result<(), StoreError> {
        let _guard = self.flush_lock.lock().await;
        let (stops, routes) = self.inner.contents().await;
        Snapshot::from_parts(&stops, &routes)
            .save(&self.path)
            .await?;
        debug!(path = %self.path.display(), routes = routes.len(), "Snapshot written");
        Ok(())
    }
}

impl RouteStore for JsonFileStore {
    async fn fetch_stops(&self) -> Result<HashMap<StopId, Stop>, StoreError> {
        self.inner.fetch_stops().await
    }

    async fn fetch_routes(&self) -> Result<Vec<Route>, StoreError> {
        self.inner.fetch_routes().await
    }

    async fn insert_route(
        &self,
        id: &RouteId,
        number: RouteNumber,
        position: u32,
    ) -> Result<(), StoreError> {
        self.inner.insert_route(id, number, position).await?;
        self.flush().await
    }

    async fn delete_route(&self, id: &RouteId) -> Result<(), StoreError> {
        self.inner.delete_route(id).await?;
        self.flush().await
    }

    async fn update_route_number(
        &self,
        id: &RouteId,
        number: RouteNumber,
    ) -> Result<(), StoreError> {
        self.inner.update_route_number(id, number).await?;
        self.flush().await
    }

    async fn insert_route_stop(
        &self,
        route_id: &RouteId,
        route_stop: &RouteStop,
    ) -> Result<(), StoreError> {
        self.inner.insert_route_stop(route_id, route_stop).await?;
        self.flush().await
    }

    async fn delete_route_stop(&self, id: &RouteStopId) -> Result<(), StoreError> {
        self.inner.delete_route_stop(id).await?;
        self.flush().await
    }

    async fn update_route_stop_target(
        &self,
        id: &RouteStopId,
        stop_id: &StopId,
    ) -> Result<(), StoreError> {
        self.inner.update_route_stop_target(id, stop_id).await?;
        self.flush().await
    }

    async fn move_route_stop(&self, id: &RouteStopId, route_id: &RouteId) -> Result<(), StoreError> {
        self.inner.move_route_stop(id, route_id).await?;
        self.flush().await
    }

    async fn update_route_stop_position(
        &self,
        id: &RouteStopId,
        position: u32,
    ) -> Result<(), StoreError> {
        self.inner.update_route_stop_position(id, position).await?;
        self.flush().await
    }
}

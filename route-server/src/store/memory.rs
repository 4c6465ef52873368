//! In-memory route store.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{Route, RouteId, RouteNumber, RouteStop, RouteStopId, Stop, StopId};

use super::RouteStore;
use super::error::StoreError;

#[derive(Debug, Clone)]
struct RouteRow {
    number: RouteNumber,
    position: u32,
}

#[derive(Debug, Clone)]
struct RouteStopRow {
    route_id: RouteId,
    stop_id: StopId,
    position: u32,
}

#[derive(Debug, Default)]
struct Tables {
    stops: HashMap<StopId, Stop>,
    routes: HashMap<RouteId, RouteRow>,
    route_stops: HashMap<RouteStopId, RouteStopRow>,
}

impl Tables {
    fn route_row_mut(&mut self, id: &RouteId) -> Result<&mut RouteRow, StoreError> {
        self.routes
            .get_mut(id)
            .ok_or_else(|| StoreError::missing("route", id))
    }

    fn route_stop_row_mut(&mut self, id: &RouteStopId) -> Result<&mut RouteStopRow, StoreError> {
        self.route_stops
            .get_mut(id)
            .ok_or_else(|| StoreError::missing("route stop", id))
    }

    /// Materialize routes ordered by position (ties by id), stops likewise.
    fn routes(&self) -> Vec<Route> {
        let mut routes: Vec<Route> = self
            .routes
            .iter()
            .map(|(id, row)| Route::new(id.clone(), row.number, row.position))
            .collect();
        routes.sort_by(|a, b| (a.position, &a.id).cmp(&(b.position, &b.id)));

        let mut by_route: HashMap<&RouteId, Vec<RouteStop>> = HashMap::new();
        for (id, row) in &self.route_stops {
            by_route
                .entry(&row.route_id)
                .or_default()
                .push(RouteStop::new(id.clone(), row.stop_id.clone(), row.position));
        }

        for route in &mut routes {
            if let Some(mut stops) = by_route.remove(&route.id) {
                stops.sort_by(|a, b| (a.position, &a.id).cmp(&(b.position, &b.id)));
                route.stops = stops;
            }
        }

        routes
    }
}

/// A [`RouteStore`] that keeps all records in memory.
///
/// Cloning shares the underlying tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create a store with the given stops and no routes.
    pub fn new(stops: impl IntoIterator<Item = Stop>) -> Self {
        let tables = Tables {
            stops: stops.into_iter().map(|s| (s.id.clone(), s)).collect(),
            ..Default::default()
        };
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    /// Create a store with stops and pre-existing routes.
    ///
    /// Fails with [`StoreError::Conflict`] if a route or route stop id is
    /// used twice.
    pub fn with_routes(
        stops: impl IntoIterator<Item = Stop>,
        routes: Vec<Route>,
    ) -> Result<Self, StoreError> {
        let mut tables = Tables {
            stops: stops.into_iter().map(|s| (s.id.clone(), s)).collect(),
            ..Default::default()
        };

        for route in routes {
            if tables.routes.contains_key(&route.id) {
                return Err(StoreError::conflict("route", &route.id));
            }
            for stop in route.stops {
                if tables.route_stops.contains_key(&stop.id) {
                    return Err(StoreError::conflict("route stop", &stop.id));
                }
                tables.route_stops.insert(
                    stop.id,
                    RouteStopRow {
                        route_id: route.id.clone(),
                        stop_id: stop.stop_id,
                        position: stop.position,
                    },
                );
            }
            tables.routes.insert(
                route.id,
                RouteRow {
                    number: route.number,
                    position: route.position,
                },
            );
        }

        Ok(Self {
            tables: Arc::new(RwLock::new(tables)),
        })
    }

    /// Copy out all stops and routes.
    pub async fn contents(&self) -> (Vec<Stop>, Vec<Route>) {
        let tables = self.tables.read().await;
        let mut stops: Vec<Stop> = tables.stops.values().cloned().collect();
        stops.sort_by(|a, b| a.id.cmp(&b.id));
        (stops, tables.routes())
    }
}

impl RouteStore for MemoryStore {
    async fn fetch_stops(&self) -> Result<HashMap<StopId, Stop>, StoreError> {
        Ok(self.tables.read().await.stops.clone())
    }

    async fn fetch_routes(&self) -> Result<Vec<Route>, StoreError> {
        Ok(self.tables.read().await.routes())
    }

    async fn insert_route(
        &self,
        id: &RouteId,
        number: RouteNumber,
        position: u32,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.routes.contains_key(id) {
            return Err(StoreError::conflict("route", id));
        }
        tables
            .routes
            .insert(id.clone(), RouteRow { number, position });
        Ok(())
    }

    async fn delete_route(&self, id: &RouteId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.routes.remove(id).is_none() {
            return Err(StoreError::missing("route", id));
        }
        tables.route_stops.retain(|_, row| &row.route_id != id);
        Ok(())
    }

    async fn update_route_number(
        &self,
        id: &RouteId,
        number: RouteNumber,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.route_row_mut(id)?.number = number;
        Ok(())
    }

    async fn insert_route_stop(
        &self,
        route_id: &RouteId,
        route_stop: &RouteStop,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.routes.contains_key(route_id) {
            return Err(StoreError::missing("route", route_id));
        }
        if tables.route_stops.contains_key(&route_stop.id) {
            return Err(StoreError::conflict("route stop", &route_stop.id));
        }
        tables.route_stops.insert(
            route_stop.id.clone(),
            RouteStopRow {
                route_id: route_id.clone(),
                stop_id: route_stop.stop_id.clone(),
                position: route_stop.position,
            },
        );
        Ok(())
    }

    async fn delete_route_stop(&self, id: &RouteStopId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        match tables.route_stops.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::missing("route stop", id)),
        }
    }

    async fn update_route_stop_target(
        &self,
        id: &RouteStopId,
        stop_id: &StopId,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.route_stop_row_mut(id)?.stop_id = stop_id.clone();
        Ok(())
    }

    async fn move_route_stop(&self, id: &RouteStopId, route_id: &RouteId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.routes.contains_key(route_id) {
            return Err(StoreError::missing("route", route_id));
        }
        tables.route_stop_row_mut(id)?.route_id = route_id.clone();
        Ok(())
    }

    async fn update_route_stop_position(
        &self,
        id: &RouteStopId,
        position: u32,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.route_stop_row_mut(id)?.position = position;
        Ok(())
    }
}

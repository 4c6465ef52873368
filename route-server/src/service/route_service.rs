//! Route editing operations.
//!
//! [`RouteService`] owns the in-memory stop graph and route arena and is
//! the only thing that mutates them. Each operation runs to completion
//! under a write lock: input is checked first, then the store is written,
//! then memory is updated to match. Operations that can change a route's
//! shape finish by re-checking the topology of every route and reporting
//! the illegal ones alongside the result.

use std::collections::HashSet;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::{Route, RouteId, RouteNumber, RouteStop, RouteStopId, Stop, StopId};
use crate::reconcile::{PositionUpdate, reconcile};
use crate::store::{RouteStore, StoreError, update_positions};
use crate::topology::{StopGraph, is_legal_route};

use super::book::RouteBook;
use super::config::ServiceConfig;
use super::error::ServiceError;
use super::outcome::{InvalidRoute, MutationOutcome};

#[derive(Debug, Default)]
struct State {
    graph: StopGraph,
    book: RouteBook,
}

impl State {
    fn invalid_routes(&self) -> Vec<InvalidRoute> {
        self.book
            .routes()
            .into_iter()
            .filter(|route| !is_legal_route(route, &self.graph))
            .map(|route| InvalidRoute {
                id: route.id,
                number: route.number,
            })
            .collect()
    }

    fn outcome<T>(&self, value: T) -> MutationOutcome<T> {
        let invalid_routes = self.invalid_routes();
        if invalid_routes.is_empty() {
            debug!("All routes are legal paths");
        } else {
            let numbers: Vec<String> = invalid_routes
                .iter()
                .map(|r| r.number.to_string())
                .collect();
            warn!(routes = %numbers.join(", "), "Routes are not legal paths");
        }
        MutationOutcome::new(value, invalid_routes)
    }

    fn require_route(&self, id: &RouteId) -> Result<(), ServiceError> {
        if self.book.contains_route(id) {
            Ok(())
        } else {
            Err(ServiceError::UnknownRoute(id.clone()))
        }
    }

    fn require_stop(&self, id: &StopId) -> Result<(), ServiceError> {
        if self.graph.contains(id) {
            Ok(())
        } else {
            Err(ServiceError::UnknownStop(id.clone()))
        }
    }
}

/// Load state from the store, checking that every route stop references a
/// stop in the graph.
async fn fetch_state<S: RouteStore>(store: &S) -> Result<State, StoreError> {
    let stops = store.fetch_stops().await?;
    let routes = store.fetch_routes().await?;
    let graph = StopGraph::from(stops);

    for route in &routes {
        if let Some(stop) = route.stops.iter().find(|s| !graph.contains(&s.stop_id)) {
            return Err(StoreError::Integrity(format!(
                "route stop {} in route {} references unknown stop {}",
                stop.id, route.id, stop.stop_id
            )));
        }
    }

    Ok(State {
        graph,
        book: RouteBook::from_routes(routes),
    })
}

/// The route editing service.
pub struct RouteService<S> {
    store: S,
    config: ServiceConfig,
    state: RwLock<State>,
}

impl<S: RouteStore> RouteService<S> {
    /// Create a service, loading stops and routes from `store`.
    pub async fn load(store: S, config: ServiceConfig) -> Result<Self, ServiceError> {
        let state = fetch_state(&store).await?;
        info!(
            stops = state.graph.len(),
            routes = state.book.routes().len(),
            "Loaded route network"
        );
        Ok(Self {
            store,
            config,
            state: RwLock::new(state),
        })
    }

    /// Re-fetch everything from the store, discarding in-memory state.
    ///
    /// Use this after a failed batch, when memory and store may disagree.
    pub async fn reload(&self) -> Result<(), ServiceError> {
        let fresh = fetch_state(&self.store).await?;
        *self.state.write().await = fresh;
        info!("Reloaded route network");
        Ok(())
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// All stops, sorted by id.
    pub async fn stops(&self) -> Vec<Stop> {
        let state = self.state.read().await;
        state.graph.stops().into_iter().cloned().collect()
    }

    /// All routes ordered by position, each with stops ordered by position.
    pub async fn routes(&self) -> Vec<Route> {
        self.state.read().await.book.routes()
    }

    /// A single route.
    pub async fn route(&self, id: &RouteId) -> Result<Route, ServiceError> {
        self.state
            .read()
            .await
            .book
            .route(id)
            .ok_or_else(|| ServiceError::UnknownRoute(id.clone()))
    }

    /// Routes whose stop sequence is currently not a legal path.
    pub async fn invalid_routes(&self) -> Vec<InvalidRoute> {
        self.state.read().await.invalid_routes()
    }

    /// Create an empty route.
    ///
    /// `position` defaults to one past the last route's position.
    pub async fn add_route(
        &self,
        id: RouteId,
        number: i64,
        position: Option<i64>,
    ) -> Result<Route, ServiceError> {
        let number = RouteNumber::new(number)?;
        let mut state = self.state.write().await;

        let position = match position {
            Some(p) => u32::try_from(p).map_err(|_| {
                ServiceError::InvalidInput(format!(
                    "invalid route position {p}: must be a non-negative integer"
                ))
            })?,
            None => state.book.next_route_position(),
        };
        if state.book.contains_route(&id) {
            return Err(ServiceError::DuplicateRoute(id));
        }

        self.store.insert_route(&id, number, position).await?;
        state.book.insert_route(id.clone(), number, position);

        info!(route = %id, %number, position, "Added route");
        Ok(Route::new(id, number, position))
    }

    /// Delete a route and all of its route stops.
    pub async fn delete_route(&self, id: &RouteId) -> Result<Route, ServiceError> {
        let mut state = self.state.write().await;
        state.require_route(id)?;

        self.store.delete_route(id).await?;
        let removed = state
            .book
            .remove_route(id)
            .ok_or_else(|| ServiceError::UnknownRoute(id.clone()))?;

        info!(route = %id, stops = removed.stops.len(), "Deleted route");
        Ok(removed)
    }

    /// Change a route's number.
    pub async fn update_route_number(&self, id: &RouteId, number: i64) -> Result<(), ServiceError> {
        let number = RouteNumber::new(number)?;
        let mut state = self.state.write().await;
        state.require_route(id)?;

        self.store.update_route_number(id, number).await?;
        state.book.set_number(id, number);

        info!(route = %id, %number, "Updated route number");
        Ok(())
    }

    /// Append a stop to a route at position = current stop count.
    pub async fn add_route_stop(
        &self,
        route_id: &RouteId,
        route_stop_id: RouteStopId,
        stop_id: StopId,
    ) -> Result<MutationOutcome<RouteStop>, ServiceError> {
        let mut state = self.state.write().await;
        state.require_route(route_id)?;
        state.require_stop(&stop_id)?;
        if state.book.contains_route_stop(&route_stop_id) {
            return Err(ServiceError::DuplicateRouteStop(route_stop_id));
        }

        let count = state.book.stop_count(route_id);
        self.check_room(route_id, count)?;
        let position = u32::try_from(count).map_err(|_| route_full(route_id))?;
        let route_stop = RouteStop::new(route_stop_id, stop_id, position);

        self.store.insert_route_stop(route_id, &route_stop).await?;
        state.book.push_stop(route_id, route_stop.clone());

        info!(
            route = %route_id,
            route_stop = %route_stop.id,
            stop = %route_stop.stop_id,
            position,
            "Added route stop"
        );
        Ok(state.outcome(route_stop))
    }

    /// Remove a stop from its route. Remaining positions are left as-is.
    pub async fn delete_route_stop(
        &self,
        id: &RouteStopId,
    ) -> Result<MutationOutcome<RouteId>, ServiceError> {
        let mut state = self.state.write().await;
        if !state.book.contains_route_stop(id) {
            return Err(ServiceError::UnknownRouteStop(id.clone()));
        }

        self.store.delete_route_stop(id).await?;
        let route_id = state
            .book
            .remove_stop(id)
            .ok_or_else(|| ServiceError::UnknownRouteStop(id.clone()))?;

        info!(route = %route_id, route_stop = %id, "Deleted route stop");
        Ok(state.outcome(route_id))
    }

    /// Point a route stop at a different stop, keeping its position.
    pub async fn update_route_stop_target(
        &self,
        id: &RouteStopId,
        stop_id: StopId,
    ) -> Result<MutationOutcome<()>, ServiceError> {
        let mut state = self.state.write().await;
        let current = state
            .book
            .target_of(id)
            .cloned()
            .ok_or_else(|| ServiceError::UnknownRouteStop(id.clone()))?;
        state.require_stop(&stop_id)?;

        if current != stop_id {
            self.store.update_route_stop_target(id, &stop_id).await?;
            info!(route_stop = %id, from = %current, to = %stop_id, "Retargeted route stop");
            state.book.set_target(id, stop_id);
        }

        Ok(state.outcome(()))
    }

    /// Move a route stop into `destination`.
    ///
    /// The stop is inserted at `index` in the destination's order (clamped,
    /// default: the end). The source and destination routes are then each
    /// reconciled against their own stored positions. Moving within one
    /// route is a reorder of that route. Returns every position write made.
    pub async fn move_route_stop(
        &self,
        id: &RouteStopId,
        destination: &RouteId,
        index: Option<usize>,
    ) -> Result<MutationOutcome<Vec<PositionUpdate>>, ServiceError> {
        let mut state = self.state.write().await;
        let source = state
            .book
            .owner_of(id)
            .cloned()
            .ok_or_else(|| ServiceError::UnknownRouteStop(id.clone()))?;
        state.require_route(destination)?;

        let mut written = Vec::new();
        if source != *destination {
            self.check_room(destination, state.book.stop_count(destination))?;
            self.store.move_route_stop(id, destination).await?;
            state.book.transfer(id, destination);
            info!(route_stop = %id, from = %source, to = %destination, "Moved route stop");

            let order = state.book.ordered_ids(&source);
            let updates = reconcile(&order, &state.book.positions(&source));
            self.write_positions(&mut state.book, &updates).await?;
            written.extend(updates);
        }

        let mut order = state.book.ordered_ids(destination);
        order.retain(|m| m != id);
        let at = index.unwrap_or(order.len()).min(order.len());
        order.insert(at, id.clone());
        let updates = reconcile(&order, &state.book.positions(destination));
        self.write_positions(&mut state.book, &updates).await?;
        written.extend(updates);

        Ok(state.outcome(written))
    }

    /// Put a route's stops into `new_order`.
    ///
    /// `new_order` must list each of the route's stops exactly once. Only
    /// stops whose position changes are written.
    pub async fn reorder_route_stops(
        &self,
        route_id: &RouteId,
        new_order: Vec<RouteStopId>,
    ) -> Result<MutationOutcome<Vec<PositionUpdate>>, ServiceError> {
        let mut state = self.state.write().await;
        state.require_route(route_id)?;

        let current = state.book.ordered_ids(route_id);
        check_permutation(route_id, &current, &new_order)?;

        let updates = reconcile(&new_order, &state.book.positions(route_id));
        self.write_positions(&mut state.book, &updates).await?;

        info!(route = %route_id, writes = updates.len(), "Reordered route stops");
        Ok(state.outcome(updates))
    }

    /// Fail if a route already holding `count` stops cannot take another.
    fn check_room(&self, route_id: &RouteId, count: usize) -> Result<(), ServiceError> {
        if count >= self.config.max_route_stops {
            return Err(route_full(route_id));
        }
        Ok(())
    }

    /// Write a reconciliation batch, then mirror it in memory.
    ///
    /// On failure memory is left untouched; writes that already reached the
    /// store are not undone.
    async fn write_positions(
        &self,
        book: &mut RouteBook,
        updates: &[PositionUpdate],
    ) -> Result<(), ServiceError> {
        if updates.is_empty() {
            return Ok(());
        }
        debug!(writes = updates.len(), "Writing position batch");
        update_positions(&self.store, updates, self.config.batch_size).await?;
        book.apply(updates);
        Ok(())
    }
}

fn route_full(route_id: &RouteId) -> ServiceError {
    ServiceError::InvalidInput(format!("route {route_id} has too many stops"))
}

fn check_permutation(
    route_id: &RouteId,
    current: &[RouteStopId],
    new_order: &[RouteStopId],
) -> Result<(), ServiceError> {
    let members: HashSet<&RouteStopId> = current.iter().collect();
    let mut seen = HashSet::new();
    for id in new_order {
        if !members.contains(id) {
            return Err(ServiceError::InvalidInput(format!(
                "route stop {id} is not in route {route_id}"
            )));
        }
        if !seen.insert(id) {
            return Err(ServiceError::InvalidInput(format!(
                "route stop {id} is listed more than once"
            )));
        }
    }
    if seen.len() != members.len() {
        return Err(ServiceError::InvalidInput(format!(
            "new order lists {} of the {} stops in route {route_id}",
            seen.len(),
            members.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "route_service_tests.rs"]
mod tests;

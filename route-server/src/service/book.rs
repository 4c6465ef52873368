//! In-memory arena of routes and route stops.
//!
//! Routes and route stops live in two maps keyed by id. A route refers to
//! its stops by id only, so transferring a stop between routes is a matter
//! of moving one id from one membership list to another.

use std::collections::HashMap;

use crate::domain::{Route, RouteId, RouteNumber, RouteStop, RouteStopId, StopId};
use crate::reconcile::PositionUpdate;

#[derive(Debug, Clone)]
struct RouteEntry {
    number: RouteNumber,
    position: u32,
    /// Member route stops in the order they joined the route.
    members: Vec<RouteStopId>,
}

#[derive(Debug, Clone)]
struct RouteStopEntry {
    route_id: RouteId,
    stop_id: StopId,
    position: u32,
}

/// The route service's in-memory model.
#[derive(Debug, Clone, Default)]
pub struct RouteBook {
    routes: HashMap<RouteId, RouteEntry>,
    route_stops: HashMap<RouteStopId, RouteStopEntry>,
}

impl RouteBook {
    /// Build the arena from routes as returned by the store.
    ///
    /// Each route's stops join in the order given.
    pub fn from_routes(routes: Vec<Route>) -> Self {
        let mut book = Self::default();
        for route in routes {
            let members = route.stops.iter().map(|s| s.id.clone()).collect();
            for stop in route.stops {
                book.route_stops.insert(
                    stop.id,
                    RouteStopEntry {
                        route_id: route.id.clone(),
                        stop_id: stop.stop_id,
                        position: stop.position,
                    },
                );
            }
            book.routes.insert(
                route.id,
                RouteEntry {
                    number: route.number,
                    position: route.position,
                    members,
                },
            );
        }
        book
    }

    pub fn contains_route(&self, id: &RouteId) -> bool {
        self.routes.contains_key(id)
    }

    pub fn contains_route_stop(&self, id: &RouteStopId) -> bool {
        self.route_stops.contains_key(id)
    }

    /// The route a route stop currently belongs to.
    pub fn owner_of(&self, id: &RouteStopId) -> Option<&RouteId> {
        self.route_stops.get(id).map(|e| &e.route_id)
    }

    /// The stop a route stop currently references.
    pub fn target_of(&self, id: &RouteStopId) -> Option<&StopId> {
        self.route_stops.get(id).map(|e| &e.stop_id)
    }

    /// Number of stops in a route (0 for an unknown route).
    pub fn stop_count(&self, id: &RouteId) -> usize {
        self.routes.get(id).map_or(0, |r| r.members.len())
    }

    /// Position for a route appended after all others.
    pub fn next_route_position(&self) -> u32 {
        self.routes
            .values()
            .map(|r| r.position)
            .max()
            .map_or(0, |p| p.saturating_add(1))
    }

    /// A route's stops sorted by position, ties broken by id.
    ///
    /// This is the order the store reports, so it survives a reload.
    pub fn ordered_stops(&self, id: &RouteId) -> Vec<RouteStop> {
        let Some(route) = self.routes.get(id) else {
            return Vec::new();
        };

        let mut stops: Vec<RouteStop> = route
            .members
            .iter()
            .filter_map(|rs| {
                self.route_stops
                    .get(rs)
                    .map(|e| RouteStop::new(rs.clone(), e.stop_id.clone(), e.position))
            })
            .collect();
        stops.sort_by(|a, b| (a.position, &a.id).cmp(&(b.position, &b.id)));
        stops
    }

    /// A route's stop ids in position order.
    pub fn ordered_ids(&self, id: &RouteId) -> Vec<RouteStopId> {
        self.ordered_stops(id).into_iter().map(|s| s.id).collect()
    }

    /// Stored positions of a route's stops.
    pub fn positions(&self, id: &RouteId) -> HashMap<RouteStopId, u32> {
        self.ordered_stops(id)
            .into_iter()
            .map(|s| (s.id, s.position))
            .collect()
    }

    /// Materialize one route.
    pub fn route(&self, id: &RouteId) -> Option<Route> {
        let entry = self.routes.get(id)?;
        Some(Route {
            id: id.clone(),
            number: entry.number,
            position: entry.position,
            stops: self.ordered_stops(id),
        })
    }

    /// Materialize all routes ordered by position (ties by id).
    pub fn routes(&self) -> Vec<Route> {
        let mut ids: Vec<(&RouteId, u32)> = self
            .routes
            .iter()
            .map(|(id, entry)| (id, entry.position))
            .collect();
        ids.sort_by(|a, b| (a.1, a.0).cmp(&(b.1, b.0)));
        ids.into_iter().filter_map(|(id, _)| self.route(id)).collect()
    }

    pub fn insert_route(&mut self, id: RouteId, number: RouteNumber, position: u32) {
        self.routes.insert(
            id,
            RouteEntry {
                number,
                position,
                members: Vec::new(),
            },
        );
    }

    /// Remove a route and every route stop it owns.
    pub fn remove_route(&mut self, id: &RouteId) -> Option<Route> {
        let route = self.route(id)?;
        if let Some(entry) = self.routes.remove(id) {
            for member in &entry.members {
                self.route_stops.remove(member);
            }
        }
        Some(route)
    }

    pub fn set_number(&mut self, id: &RouteId, number: RouteNumber) {
        if let Some(entry) = self.routes.get_mut(id) {
            entry.number = number;
        }
    }

    /// Add a route stop to the end of a route's membership.
    pub fn push_stop(&mut self, route_id: &RouteId, stop: RouteStop) {
        let Some(route) = self.routes.get_mut(route_id) else {
            return;
        };
        route.members.push(stop.id.clone());
        self.route_stops.insert(
            stop.id,
            RouteStopEntry {
                route_id: route_id.clone(),
                stop_id: stop.stop_id,
                position: stop.position,
            },
        );
    }

    /// Remove a route stop; returns the route that owned it.
    pub fn remove_stop(&mut self, id: &RouteStopId) -> Option<RouteId> {
        let entry = self.route_stops.remove(id)?;
        if let Some(route) = self.routes.get_mut(&entry.route_id) {
            route.members.retain(|m| m != id);
        }
        Some(entry.route_id)
    }

    pub fn set_target(&mut self, id: &RouteStopId, stop_id: StopId) {
        if let Some(entry) = self.route_stops.get_mut(id) {
            entry.stop_id = stop_id;
        }
    }

    /// Transfer a route stop to `destination`, keeping its position.
    pub fn transfer(&mut self, id: &RouteStopId, destination: &RouteId) {
        if !self.routes.contains_key(destination) {
            return;
        }
        let Some(entry) = self.route_stops.get_mut(id) else {
            return;
        };
        let source = std::mem::replace(&mut entry.route_id, destination.clone());
        if let Some(route) = self.routes.get_mut(&source) {
            route.members.retain(|m| m != id);
        }
        if let Some(route) = self.routes.get_mut(destination) {
            route.members.push(id.clone());
        }
    }

    /// Apply position updates produced by reconciliation.
    pub fn apply(&mut self, updates: &[PositionUpdate]) {
        for update in updates {
            if let Some(entry) = self.route_stops.get_mut(&update.route_stop_id) {
                entry.position = update.position;
            }
        }
    }
}

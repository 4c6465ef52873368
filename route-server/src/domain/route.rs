//! Routes and the stops they visit.

use super::{RouteId, RouteNumber, RouteStopId, StopId};

/// One occurrence of a stop within a route.
///
/// `position` orders the stops of one route. Positions are not required to
/// be contiguous: deleting a stop leaves a gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteStop {
    pub id: RouteStopId,
    pub stop_id: StopId,
    pub position: u32,
}

impl RouteStop {
    pub fn new(id: RouteStopId, stop_id: StopId, position: u32) -> Self {
        Self {
            id,
            stop_id,
            position,
        }
    }
}

/// A numbered route: an ordered sequence of route stops.
///
/// `position` orders routes relative to each other for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: RouteId,
    pub number: RouteNumber,
    pub position: u32,
    /// Stops sorted ascending by position.
    pub stops: Vec<RouteStop>,
}

impl Route {
    /// Create a route with no stops.
    pub fn new(id: RouteId, number: RouteNumber, position: u32) -> Self {
        Self {
            id,
            number,
            position,
            stops: Vec::new(),
        }
    }

    /// The sequence of stop ids visited, in position order.
    pub fn stop_ids(&self) -> impl Iterator<Item = &StopId> {
        self.stops.iter().map(|s| &s.stop_id)
    }
}

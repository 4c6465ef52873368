//! Route path legality.
//!
//! A route is legal when it is either an open simple path (no stop visited
//! twice) or a closed loop that returns to its first stop as the very last
//! element. Every consecutive pair must also follow a directed edge of the
//! stop graph.

use crate::domain::{Route, RouteStop};

use super::graph::StopGraph;

/// Decide whether a sequence of route stops is a legal path over `graph`.
///
/// The stops are ordered by `position` first (a stable sort, so ties keep
/// their input order). Sequences shorter than two stops are always legal.
///
/// # Panics
///
/// Panics if a stop that must be looked up is missing from `graph`. Callers
/// guarantee that every route stop references a known stop; a miss is a
/// data-integrity fault.
///
/// # Examples
///
/// ```
/// use route_server::domain::{RouteStop, RouteStopId, Stop, StopId};
/// use route_server::topology::{StopGraph, is_legal_path};
///
/// let id = |s: &str| StopId::parse(s).unwrap();
/// let graph = StopGraph::new(vec![
///     Stop::new(id("a"), "A", vec![id("b")]),
///     Stop::new(id("b"), "B", vec![id("a")]),
/// ]);
/// let at = |rs: &str, s: &str, p| RouteStop::new(RouteStopId::parse(rs).unwrap(), id(s), p);
///
/// // A -> B -> A closes the loop back to the origin.
/// let stops = vec![at("1", "a", 0), at("2", "b", 1), at("3", "a", 2)];
/// assert!(is_legal_path(&stops, &graph));
/// ```
pub fn is_legal_path(stops: &[RouteStop], graph: &StopGraph) -> bool {
    if stops.len() < 2 {
        return true;
    }

    let mut ordered: Vec<&RouteStop> = stops.iter().collect();
    ordered.sort_by_key(|s| s.position);

    let last = ordered.len() - 1;
    for i in 0..last {
        let current = &ordered[i].stop_id;
        let next = &ordered[i + 1].stop_id;

        let connected = graph.has_edge(current, next).unwrap_or_else(|| {
            panic!("stop {current} is referenced by a route but missing from the stop graph")
        });
        if !connected {
            return false;
        }

        let return_index = ordered[i + 1..]
            .iter()
            .position(|s| &s.stop_id == current)
            .map(|offset| i + 1 + offset);

        match return_index {
            // Only the origin may come back, and only as the closing stop.
            Some(j) if i == 0 && j == last => {}
            Some(_) => return false,
            None => {}
        }
    }

    true
}

/// Convenience wrapper: is this route's stop sequence legal?
pub fn is_legal_route(route: &Route, graph: &StopGraph) -> bool {
    is_legal_path(&route.stops, graph)
}

//! Position reconciliation.
//!
//! Given the desired order of a route's stops and the positions currently
//! stored for them, compute the smallest set of position writes that makes
//! the stored positions match the order. Stops already at the right
//! position are left alone so that no redundant writes reach the store.

use std::collections::HashMap;

use crate::domain::RouteStopId;

/// A single position write for one route stop.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionUpdate {
    pub route_stop_id: RouteStopId,
    pub position: u32,
}

impl PositionUpdate {
    pub fn new(route_stop_id: RouteStopId, position: u32) -> Self {
        Self {
            route_stop_id,
            position,
        }
    }
}

/// Align positions with `current_order`.
///
/// The target position of each entry is its index in `current_order`. An
/// update is emitted only when that differs from the entry's stored
/// position; an entry with no stored position always gets one. Updates come
/// out in `current_order` order.
///
/// This never touches stops outside `current_order` and does not decide
/// when it should run.
///
/// # Panics
///
/// Panics if `current_order` has more entries than a `u32` position can
/// index. The route service caps route length well below that.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use route_server::domain::RouteStopId;
/// use route_server::reconcile::{PositionUpdate, reconcile};
///
/// let id = |s: &str| RouteStopId::parse(s).unwrap();
/// let order = vec![id("s1"), id("s2"), id("s3")];
/// let stored = HashMap::from([(id("s1"), 0), (id("s2"), 2), (id("s3"), 1)]);
///
/// assert_eq!(
///     reconcile(&order, &stored),
///     vec![PositionUpdate::new(id("s2"), 1), PositionUpdate::new(id("s3"), 2)],
/// );
/// ```
pub fn reconcile(
    current_order: &[RouteStopId],
    stored_positions: &HashMap<RouteStopId, u32>,
) -> Vec<PositionUpdate> {
    current_order
        .iter()
        .enumerate()
        .filter_map(|(index, id)| {
            let position = u32::try_from(index).expect("route order longer than u32::MAX");
            match stored_positions.get(id) {
                Some(&stored) if stored == position => None,
                _ => Some(PositionUpdate::new(id.clone(), position)),
            }
        })
        .collect()
}

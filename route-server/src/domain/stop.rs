//! Stops: the nodes of the stop graph.

use super::StopId;

/// A named location that routes can visit.
///
/// `connected_with` is the directed adjacency list: a route may go from
/// this stop directly to stop `B` only if `B` is listed here. The graph is
/// not assumed to be symmetric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub connected_with: Vec<StopId>,
}

impl Stop {
    /// Create a stop.
    pub fn new(id: StopId, name: impl Into<String>, connected_with: Vec<StopId>) -> Self {
        Self {
            id,
            name: name.into(),
            connected_with,
        }
    }

    /// Whether a route may go from this stop directly to `next`.
    pub fn can_precede(&self, next: &StopId) -> bool {
        self.connected_with.contains(next)
    }
}

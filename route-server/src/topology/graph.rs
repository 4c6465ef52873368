//! Read-only view of stops and their directed adjacency.

use std::collections::HashMap;

use crate::domain::{Stop, StopId};

/// The stop graph.
///
/// An arena of stops keyed by id. Adjacency is supplied data: the graph
/// never infers or symmetrizes edges, and it does not check that every id
/// in a `connected_with` list refers to a known stop.
#[derive(Debug, Clone, Default)]
pub struct StopGraph {
    stops: HashMap<StopId, Stop>,
}

impl StopGraph {
    /// Create a graph from a collection of stops.
    ///
    /// If two stops share an id, the later one wins.
    pub fn new(stops: impl IntoIterator<Item = Stop>) -> Self {
        Self {
            stops: stops.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    /// Look up a stop by id.
    pub fn get(&self, id: &StopId) -> Option<&Stop> {
        self.stops.get(id)
    }

    /// Whether the graph knows this stop.
    pub fn contains(&self, id: &StopId) -> bool {
        self.stops.contains_key(id)
    }

    /// Whether there is an edge `from -> to`.
    ///
    /// Returns `None` if `from` is not in the graph.
    pub fn has_edge(&self, from: &StopId, to: &StopId) -> Option<bool> {
        self.get(from).map(|s| s.can_precede(to))
    }

    /// All stops, sorted by id.
    pub fn stops(&self) -> Vec<&Stop> {
        let mut stops: Vec<_> = self.stops.values().collect();
        stops.sort_by(|a, b| a.id.cmp(&b.id));
        stops
    }

    /// Number of stops in the graph.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns true if the graph has no stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

impl From<HashMap<StopId, Stop>> for StopGraph {
    fn from(stops: HashMap<StopId, Stop>) -> Self {
        Self { stops }
    }
}

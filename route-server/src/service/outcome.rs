//! Results of shape-changing mutations.

use crate::domain::{RouteId, RouteNumber};

/// A route whose stop sequence is not a legal path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRoute {
    pub id: RouteId,
    pub number: RouteNumber,
}

/// A successful mutation plus the routes that are currently illegal.
///
/// Topology is advisory: a mutation that leaves a route illegal still
/// succeeds, and the caller decides how to surface the warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome<T> {
    pub value: T,
    /// Illegal routes in route order; empty when everything is legal.
    pub invalid_routes: Vec<InvalidRoute>,
}

impl<T> MutationOutcome<T> {
    pub fn new(value: T, invalid_routes: Vec<InvalidRoute>) -> Self {
        Self {
            value,
            invalid_routes,
        }
    }

    /// True when no route is illegal.
    pub fn all_routes_legal(&self) -> bool {
        self.invalid_routes.is_empty()
    }

    /// Route numbers of the illegal routes.
    pub fn invalid_numbers(&self) -> Vec<RouteNumber> {
        self.invalid_routes.iter().map(|r| r.number).collect()
    }
}

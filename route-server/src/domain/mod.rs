//! Domain types for the route editor.
//!
//! This module contains the core data model: stops, routes and the stops
//! a route visits. Identifier and number types enforce their invariants at
//! construction time, so code that receives them can trust their validity.

mod ids;
mod route;
mod route_number;
mod stop;

pub use ids::{InvalidId, MAX_ID_LEN, RouteId, RouteStopId, StopId};
pub use route::{Route, RouteStop};
pub use route_number::{InvalidRouteNumber, RouteNumber};
pub use stop::Stop;

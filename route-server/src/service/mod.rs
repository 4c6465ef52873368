//! Route editing service.
//!
//! This module orchestrates the topology check and position reconciliation
//! around every mutation the UI and API can make:
//!
//! | Operation | Re-checks topology | Reconciles positions |
//! |---|---|---|
//! | add / delete / renumber route | no | no |
//! | add / delete / retarget route stop | yes | no |
//! | move route stop | yes | source and destination |
//! | reorder route stops | yes | the route |

mod book;
mod config;
mod error;
mod outcome;
mod route_service;

pub use book::RouteBook;
pub use config::{MAX_ROUTE_STOPS, ServiceConfig};
pub use error::ServiceError;
pub use outcome::{InvalidRoute, MutationOutcome};
pub use route_service::RouteService;

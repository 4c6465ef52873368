//! Web layer for the route editor.
//!
//! JSON endpoints over [`RouteService`](crate::service::RouteService).

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;

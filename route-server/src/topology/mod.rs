//! Route topology: the stop graph and the path legality check.
//!
//! Both are pure and hold no shared mutable state, so they are safe to use
//! concurrently on independent inputs.

mod graph;
mod validate;

pub use graph::StopGraph;
pub use validate::{is_legal_path, is_legal_route};

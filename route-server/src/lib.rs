//! Route editor server.
//!
//! Maintains bus-style routes over a fixed graph of stops. Each route is an
//! ordered list of route stops; editing a route writes only the positions
//! that actually change and reports routes whose stop sequence no longer
//! follows the graph's connections.

pub mod config;
pub mod domain;
pub mod reconcile;
pub mod service;
pub mod store;
pub mod topology;
pub mod web;

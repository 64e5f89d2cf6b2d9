//! HTTP API: routes, shared state, server entry point.

pub mod routes;
pub mod types;

pub use routes::{app, serve, AppState};

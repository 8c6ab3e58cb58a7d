//! HTTP surface: liveness check and the LINE webhook endpoint.

pub mod routes;

pub use routes::{AppState, app_routes};

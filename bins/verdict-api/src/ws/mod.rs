//! WebSocket transport for real-time result delivery.
//!
//! Provides the connection registry and the HTTP upgrade handler used by
//! the Axum routes.

mod handler;
pub mod registry;

pub use handler::ws_handler;
pub use registry::ConnectionRegistry;

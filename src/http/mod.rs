//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → handler.rs (method check, route, load, evaluate)
//!     → compose.rs (inject config, page headers)
//!     → Send to client
//! ```

pub mod compose;
pub mod handler;
pub mod server;

pub use server::{AppState, HttpServer, StartupError, X_REQUEST_ID};

//! Quantura SSR edge service library.

pub mod config;
pub mod http;
pub mod identity;
pub mod lifecycle;
pub mod observability;
pub mod remote_config;
pub mod routing;
pub mod templates;

pub use config::SsrConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

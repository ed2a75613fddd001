//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → matcher.rs (normalize, match blog post pattern, reject traversal)
//!     → router.rs (exact table lookup, blog post resolution)
//!     → Return: TemplateId or None
//!
//! Route Compilation (at startup):
//!     built-in table + configured aliases
//!     → validate alias routes and template ids
//!     → Freeze as immutable TemplateRouter
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same path always resolves to the same template

pub mod matcher;
pub mod router;

pub use router::{RouteError, TemplateRouter};

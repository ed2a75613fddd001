//! Remote configuration subsystem.
//!
//! # Data Flow
//! ```text
//! backend.rs (HTTP JSON / local file)
//!     → provider.rs (TTL cache, atomic swap)
//!     → evaluate.rs (conditions + parameters → EvaluatedConfig)
//!     → service.rs (degrade to None on failure, throttled error log)
//! ```

pub mod backend;
pub mod evaluate;
pub mod provider;
pub mod service;
pub mod types;

pub use backend::{build_backend, FileTemplateBackend, HttpTemplateBackend, RemoteConfigBackend};
pub use evaluate::evaluate;
pub use provider::SnapshotProvider;
pub use service::RemoteConfigService;
pub use types::{EvaluatedConfig, EvaluationContext, RemoteConfigError, ServerTemplate};

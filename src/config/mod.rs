//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), optional
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SsrConfig (validated, immutable)
//!     → consumed once at startup to build AppState
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_overrides, load_config, load_or_default, ConfigError, ConfigOverrides};
pub use schema::{
    BackendKind, IdentityConfig, ListenerConfig, ObservabilityConfig, RemoteConfigSettings, SsrConfig,
    TemplateConfig, TimeoutConfig,
};

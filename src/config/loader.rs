//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::SsrConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<SsrConfig, ConfigError> {
    let config: SsrConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<SsrConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load from `path` when given, otherwise validated defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<SsrConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = SsrConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

/// Command-line overrides applied on top of the loaded file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub templates_root: Option<String>,
}

/// Apply overrides and validate the result again.
pub fn apply_overrides(mut config: SsrConfig, overrides: ConfigOverrides) -> Result<SsrConfig, ConfigError> {
    if let Some(bind) = overrides.bind_address {
        config.listener.bind_address = bind;
    }
    if let Some(root) = overrides.templates_root {
        config.templates.root = root;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ssr.toml");
        fs::write(
            &path,
            r#"
                [listener]
                bind_address = "127.0.0.1:3000"

                [remote_config]
                backend = "file"
                path = "rc.json"
            "#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert_eq!(config.remote_config.path.as_deref(), Some("rc.json"));
    }

    #[test]
    fn test_errors_are_typed() {
        assert!(matches!(load_config(Path::new("/nonexistent/ssr.toml")), Err(ConfigError::Io(_))));
        assert!(matches!(parse_config("listener = 3"), Err(ConfigError::Parse(_))));

        let err = parse_config("[timeouts]\nrequest_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert_eq!(err.to_string(), "Validation failed: timeouts.request_secs: must be greater than 0");
    }

    #[test]
    fn test_overrides_are_validated() {
        let config = apply_overrides(
            SsrConfig::default(),
            ConfigOverrides {
                bind_address: Some("127.0.0.1:9090".into()),
                templates_root: Some("/srv/pages".into()),
            },
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9090");
        assert_eq!(config.templates.root, "/srv/pages");

        let err = apply_overrides(
            SsrConfig::default(),
            ConfigOverrides {
                bind_address: Some("not-an-address".into()),
                templates_root: Some("  ".into()),
            },
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 2), "{err}");
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_or_default(None).unwrap();
        assert_eq!(config.templates.root, "templates");
    }
}

//! Server template types and remote config error definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while fetching or evaluating remote config.
#[derive(Debug, Error)]
pub enum RemoteConfigError {
    /// HTTP request to the template endpoint failed.
    #[error("template request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Template endpoint answered with a non-success status.
    #[error("template endpoint returned status {0}")]
    Status(u16),

    /// Template body is not a valid server template.
    #[error("template decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// Template file could not be read.
    #[error("template read failed: {0}")]
    Io(#[from] std::io::Error),

    /// Template contains a condition that cannot be evaluated.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// Backend settings are incomplete.
    #[error("remote config misconfigured: {0}")]
    Misconfigured(String),
}

/// Server-side remote config template.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerTemplate {
    /// Template version as reported by the backend.
    pub version: String,

    /// Named conditions, in evaluation priority order.
    pub conditions: Vec<NamedCondition>,

    /// Parameters keyed by name.
    pub parameters: BTreeMap<String, Parameter>,
}

/// A condition with the name parameters refer to it by.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NamedCondition {
    pub name: String,
    pub condition: Condition,
}

/// Condition tree.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    True,
    False,
    And { conditions: Vec<Condition> },
    Or { conditions: Vec<Condition> },
    Percent(PercentCondition),
    Path(PathCondition),
}

/// Deterministic bucketing on the randomization id.
///
/// Buckets are micro-percents in `0..100_000_000`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PercentCondition {
    /// Seed mixed into the hash so experiments bucket independently.
    pub seed: String,

    /// Holds when `bucket < micro_percent`.
    pub micro_percent: Option<u32>,

    /// Holds when `lower_bound <= bucket < upper_bound`.
    pub micro_percent_range: Option<MicroPercentRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct MicroPercentRange {
    pub lower_bound: u32,
    pub upper_bound: u32,
}

/// Match on the normalized request route.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PathCondition {
    pub operator: PathOperator,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathOperator {
    Equals,
    Prefix,
    Contains,
}

/// A remote config parameter.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Parameter {
    pub default_value: Option<ParameterValue>,

    /// Values keyed by condition name.
    pub conditional_values: BTreeMap<String, ParameterValue>,
}

/// Either an explicit value or a request to let the page use its own default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Explicit { value: String },
    InAppDefault { use_in_app_default: bool },
}

/// Per-request inputs to evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationContext<'a> {
    pub randomization_id: &'a str,
    pub path: &'a str,
}

/// Concrete configuration for one visitor and route.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluatedConfig {
    pub values: BTreeMap<String, String>,
}

impl EvaluatedConfig {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

//! Per-request evaluation of a server template.
//!
//! # Design Decisions
//! - Pure function of (template, randomization id, path): no clock, no RNG
//! - Conditions are evaluated once per request, in template order
//! - First true condition with a value for a parameter wins

use sha2::{Digest, Sha256};

use crate::remote_config::types::{
    Condition, EvaluatedConfig, EvaluationContext, ParameterValue, PathCondition, PathOperator,
    PercentCondition, RemoteConfigError, ServerTemplate,
};

/// Upper bound (exclusive) of the micro-percent bucket space.
pub const MICRO_PERCENT_SCALE: u32 = 100_000_000;

/// Maximum nesting depth of `and`/`or` conditions.
pub const MAX_CONDITION_DEPTH: usize = 10;

/// Evaluate `template` for one visitor and route.
pub fn evaluate(
    template: &ServerTemplate,
    ctx: &EvaluationContext<'_>,
) -> Result<EvaluatedConfig, RemoteConfigError> {
    let mut outcomes = Vec::with_capacity(template.conditions.len());
    for named in &template.conditions {
        let holds = eval_condition(&named.condition, ctx, 0).map_err(|e| match e {
            RemoteConfigError::Evaluation(msg) => {
                RemoteConfigError::Evaluation(format!("condition {:?}: {msg}", named.name))
            }
            other => other,
        })?;
        outcomes.push((named.name.as_str(), holds));
    }

    let mut config = EvaluatedConfig::default();
    for (key, parameter) in &template.parameters {
        let chosen = outcomes
            .iter()
            .filter(|(_, holds)| *holds)
            .find_map(|(name, _)| parameter.conditional_values.get(*name))
            .or(parameter.default_value.as_ref());

        if let Some(ParameterValue::Explicit { value }) = chosen {
            config.values.insert(key.clone(), value.clone());
        }
    }
    Ok(config)
}

fn eval_condition(
    condition: &Condition,
    ctx: &EvaluationContext<'_>,
    depth: usize,
) -> Result<bool, RemoteConfigError> {
    if depth > MAX_CONDITION_DEPTH {
        return Err(RemoteConfigError::Evaluation(format!(
            "conditions nested deeper than {MAX_CONDITION_DEPTH}"
        )));
    }
    match condition {
        Condition::True => Ok(true),
        Condition::False => Ok(false),
        Condition::And { conditions } => {
            for c in conditions {
                if !eval_condition(c, ctx, depth + 1)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Condition::Or { conditions } => {
            for c in conditions {
                if eval_condition(c, ctx, depth + 1)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Condition::Percent(percent) => eval_percent(percent, ctx.randomization_id),
        Condition::Path(path) => Ok(eval_path(path, ctx.path)),
    }
}

fn eval_percent(condition: &PercentCondition, randomization_id: &str) -> Result<bool, RemoteConfigError> {
    let (lower, upper) = match (condition.micro_percent_range, condition.micro_percent) {
        (Some(range), _) => (range.lower_bound, range.upper_bound),
        (None, Some(upper)) => (0, upper),
        (None, None) => {
            return Err(RemoteConfigError::Evaluation(
                "percent condition without micro_percent or micro_percent_range".into(),
            ))
        }
    };
    if lower > upper || upper > MICRO_PERCENT_SCALE {
        return Err(RemoteConfigError::Evaluation(format!(
            "invalid micro percent range {lower}..{upper}"
        )));
    }

    let bucket = micro_percent_bucket(&condition.seed, randomization_id);
    Ok(lower <= bucket && bucket < upper)
}

/// Bucket of `randomization_id` under `seed`, in `0..MICRO_PERCENT_SCALE`.
///
/// SHA-256 of `"<seed>.<id>"` read as a big-endian integer, reduced modulo
/// the scale.
pub fn micro_percent_bucket(seed: &str, randomization_id: &str) -> u32 {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(b".");
    hasher.update(randomization_id.as_bytes());
    let digest = hasher.finalize();

    let scale = u64::from(MICRO_PERCENT_SCALE);
    let bucket = digest
        .iter()
        .fold(0u64, |acc, byte| (acc * 256 + u64::from(*byte)) % scale);
    // bucket < scale, which fits in u32
    bucket as u32
}

fn eval_path(condition: &PathCondition, path: &str) -> bool {
    condition.values.iter().any(|value| match condition.operator {
        PathOperator::Equals => path == value,
        PathOperator::Prefix => path.starts_with(value.as_str()),
        PathOperator::Contains => path.contains(value.as_str()),
    })
}

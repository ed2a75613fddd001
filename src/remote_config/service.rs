//! Degrading front for the request path.
//!
//! Fetch or evaluation failures never fail a request: the page is served
//! without configuration and the failure is logged through a `LogThrottle`.

use std::time::Duration;

use crate::observability::{metrics, LogThrottle};
use crate::remote_config::evaluate::evaluate;
use crate::remote_config::provider::SnapshotProvider;
use crate::remote_config::types::{EvaluatedConfig, EvaluationContext, RemoteConfigError};

/// Default minimum spacing of failure log lines.
pub const DEFAULT_ERROR_LOG_INTERVAL: Duration = Duration::from_secs(60);

pub struct RemoteConfigService {
    provider: Option<SnapshotProvider>,
    failures: LogThrottle,
}

impl RemoteConfigService {
    pub fn new(provider: Option<SnapshotProvider>, error_log_interval: Duration) -> Self {
        Self {
            provider,
            failures: LogThrottle::new(error_log_interval),
        }
    }

    /// Service that never injects configuration.
    pub fn disabled() -> Self {
        Self::new(None, DEFAULT_ERROR_LOG_INTERVAL)
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Evaluated config for this request, or `None` if disabled or failing.
    pub async fn payload_for(&self, ctx: &EvaluationContext<'_>) -> Option<EvaluatedConfig> {
        let provider = self.provider.as_ref()?;
        match Self::try_payload(provider, ctx).await {
            Ok(config) => Some(config),
            Err(e) => {
                metrics::record_config_degraded();
                if let Some(suppressed) = self.failures.check() {
                    tracing::error!(
                        error = %e,
                        path = %ctx.path,
                        suppressed,
                        "Remote config unavailable, serving page without config"
                    );
                }
                None
            }
        }
    }

    async fn try_payload(
        provider: &SnapshotProvider,
        ctx: &EvaluationContext<'_>,
    ) -> Result<EvaluatedConfig, RemoteConfigError> {
        let snapshot = provider.get_snapshot().await?;
        evaluate(&snapshot, ctx)
    }

    /// Number of failure log lines emitted so far.
    pub fn failure_logs_emitted(&self) -> u64 {
        self.failures.emitted()
    }
}

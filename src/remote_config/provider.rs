//! TTL-bound snapshot cache over a remote config backend.
//!
//! # Design Decisions
//! - One process-wide cached snapshot, replaced by atomic pointer swap
//! - Snapshots are immutable; concurrent refreshes may both fetch, last
//!   write wins
//! - Fetch errors propagate; there is no stale fallback

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tokio::time::Instant;

use crate::observability::metrics;
use crate::remote_config::backend::RemoteConfigBackend;
use crate::remote_config::types::{RemoteConfigError, ServerTemplate};

/// Default snapshot time-to-live.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CachedSnapshot {
    template: Arc<ServerTemplate>,
    fetched_at: Instant,
}

pub struct SnapshotProvider {
    backend: Arc<dyn RemoteConfigBackend>,
    ttl: Duration,
    cached: ArcSwapOption<CachedSnapshot>,
}

impl SnapshotProvider {
    pub fn new(backend: Arc<dyn RemoteConfigBackend>, ttl: Duration) -> Self {
        Self {
            backend,
            ttl,
            cached: ArcSwapOption::empty(),
        }
    }

    /// Current snapshot, refreshed from the backend when missing or expired.
    pub async fn get_snapshot(&self) -> Result<Arc<ServerTemplate>, RemoteConfigError> {
        if let Some(cached) = self.cached.load_full() {
            if cached.fetched_at.elapsed() < self.ttl {
                metrics::record_config_cache(true);
                return Ok(cached.template.clone());
            }
        }
        metrics::record_config_cache(false);

        let template = match self.backend.fetch_template().await {
            Ok(template) => Arc::new(template),
            Err(e) => {
                metrics::record_config_fetch(false);
                return Err(e);
            }
        };
        metrics::record_config_fetch(true);
        tracing::debug!(version = %template.version, "Fetched remote config snapshot");

        self.cached.store(Some(Arc::new(CachedSnapshot {
            template: template.clone(),
            fetched_at: Instant::now(),
        })));
        Ok(template)
    }
}

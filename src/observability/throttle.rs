//! Rate-limited logging gate.
//!
//! Lets one event through per interval and counts the rest, so a sustained
//! backend outage yields one log line per interval instead of one per request.
//! Concurrent callers race on atomics; the bound is best effort.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

const NEVER: u64 = u64::MAX;

#[derive(Debug)]
pub struct LogThrottle {
    anchor: Instant,
    interval_ms: u64,
    /// Milliseconds since `anchor` of the last emitted event, or `NEVER`.
    last_emit_ms: AtomicU64,
    suppressed: AtomicU64,
    emitted: AtomicU64,
}

impl LogThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            anchor: Instant::now(),
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            last_emit_ms: AtomicU64::new(NEVER),
            suppressed: AtomicU64::new(0),
            emitted: AtomicU64::new(0),
        }
    }

    /// Returns `Some(suppressed_since_last)` when the caller may log now.
    pub fn check(&self) -> Option<u64> {
        let now_ms = u64::try_from(self.anchor.elapsed().as_millis()).unwrap_or(u64::MAX - 1);
        let last = self.last_emit_ms.load(Ordering::Acquire);

        let due = last == NEVER || now_ms.saturating_sub(last) >= self.interval_ms;
        if due
            && self
                .last_emit_ms
                .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            self.emitted.fetch_add(1, Ordering::Relaxed);
            return Some(self.suppressed.swap(0, Ordering::Relaxed));
        }

        self.suppressed.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Number of events let through so far.
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_one_event_per_interval() {
        let throttle = LogThrottle::new(Duration::from_secs(60));

        assert_eq!(throttle.check(), Some(0));
        for _ in 0..1000 {
            assert_eq!(throttle.check(), None);
        }
        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(throttle.check(), None);
        assert_eq!(throttle.emitted(), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(throttle.check(), Some(1001));
        assert_eq!(throttle.check(), None);
        assert_eq!(throttle.emitted(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_emit_once() {
        let throttle = std::sync::Arc::new(LogThrottle::new(Duration::from_secs(60)));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let throttle = throttle.clone();
            handles.push(tokio::spawn(async move {
                (0..100).filter(|_| throttle.check().is_some()).count()
            }));
        }
        let mut total = 0;
        for h in handles {
            total += h.await.unwrap();
        }
        assert_eq!(total, 1);
    }
}

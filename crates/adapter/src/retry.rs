//! Record save retry policy

use std::sync::Arc;
use std::time::Duration;

use crate::error::PersistError;
use crate::history::HistoryRepository;
use crate::types::GameRecord;

/// How hard to try before giving up on a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavePolicy {
    pub max_attempts: u32,
    /// Wait before the second attempt; doubles after each further failure
    pub initial_backoff: Duration,
}

impl Default for SavePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

impl SavePolicy {
    /// Delay after failed attempt number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1 << doublings)
    }
}

/// Save `record`, retrying with exponential backoff.
///
/// Each attempt runs on the blocking pool. Returns the number of attempts
/// used, or the last error once `max_attempts` is exhausted.
pub async fn save_with_retry(
    repo: Arc<dyn HistoryRepository>,
    record: GameRecord,
    policy: SavePolicy,
) -> Result<u32, PersistError> {
    let max_attempts = policy.max_attempts.max(1);
    let record = Arc::new(record);
    let mut attempt = 1;

    loop {
        let repo_for_attempt = Arc::clone(&repo);
        let record_for_attempt = Arc::clone(&record);
        let result = tokio::task::spawn_blocking(move || repo_for_attempt.save(&record_for_attempt))
            .await
            .unwrap_or_else(|e| Err(PersistError::Unavailable(e.to_string())));

        match result {
            Ok(()) => return Ok(attempt),
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(e) => {
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    record_id = record.id,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "record save failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::sync::watch;

    use crate::history::{MemoryHistory, RecordFilter};
    use crate::types::Difficulty;

    /// Fails the first `failures` saves, then delegates to memory
    struct Flaky {
        failures: AtomicU32,
        inner: MemoryHistory,
    }

    impl HistoryRepository for Flaky {
        fn save(&self, record: &GameRecord) -> Result<(), PersistError> {
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(PersistError::Unavailable("disk on fire".into()));
            }
            self.inner.save(record)
        }

        fn list(&self, filter: &RecordFilter) -> Result<Vec<GameRecord>, PersistError> {
            self.inner.list(filter)
        }

        fn revisions(&self) -> watch::Receiver<u64> {
            self.inner.revisions()
        }
    }

    fn flaky(failures: u32) -> Arc<Flaky> {
        Arc::new(Flaky {
            failures: AtomicU32::new(failures),
            inner: MemoryHistory::new(),
        })
    }

    fn record() -> GameRecord {
        GameRecord {
            id: 42,
            score: 1200,
            lines_cleared: 8,
            level: 0,
            difficulty: Difficulty::Normal,
            timestamp_ms: 1,
            duration_ms: 60_000,
        }
    }

    #[test]
    fn backoff_doubles() {
        let policy = SavePolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let repo = flaky(2);
        let attempts = save_with_retry(repo.clone(), record(), SavePolicy::default())
            .await
            .unwrap();
        assert_eq!(attempts, 3);
        assert_eq!(repo.inner.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let repo = flaky(10);
        let err = save_with_retry(repo.clone(), record(), SavePolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PersistError::Unavailable(_)));
        assert!(repo.inner.is_empty());
        assert_eq!(repo.failures.load(Ordering::SeqCst), 7);
    }
}

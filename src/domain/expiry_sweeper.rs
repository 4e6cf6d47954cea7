//! Periodic purge of links past their retention deadline.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Deletes every link whose `expires_at <= now`.
///
/// Idempotent: a second call with the same `now` deletes nothing.
pub async fn sweep_expired(links: &dyn LinkRepository, now: DateTime<Utc>) -> Result<u64, AppError> {
    let deleted = links.delete_expired_before(now).await?;
    metrics::counter!("tinylink_links_swept_total").increment(deleted);
    Ok(deleted)
}

/// Runs [`sweep_expired`] every `period`, starting immediately.
///
/// A failed sweep is logged and left for the next tick. Cache entries are not
/// touched; they expire on their own TTL.
pub async fn run_expiry_sweeper(links: Arc<dyn LinkRepository>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match sweep_expired(links.as_ref(), Utc::now()).await {
            Ok(0) => info!("Expiry sweep finished, nothing to delete"),
            Ok(deleted) => info!(deleted, "Expiry sweep removed expired links"),
            Err(e) => error!(error = %e, "Expiry sweep failed, retrying on next tick"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_sweep_expired_passes_now_through() {
        let now = Utc::now();

        let mut repo = MockLinkRepository::new();
        repo.expect_delete_expired_before()
            .withf(move |cutoff| *cutoff == now)
            .times(1)
            .returning(|_| Ok(3));

        assert_eq!(sweep_expired(&repo, now).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_sweep_expired_propagates_store_failure() {
        let mut repo = MockLinkRepository::new();
        repo.expect_delete_expired_before()
            .returning(|_| Err(AppError::store_unavailable("down", json!({}))));

        assert!(sweep_expired(&repo, Utc::now()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_keeps_ticking_after_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_mock = calls.clone();

        let mut repo = MockLinkRepository::new();
        repo.expect_delete_expired_before().returning(move |_| {
            if calls_in_mock.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::store_unavailable("down", json!({})))
            } else {
                Ok(0)
            }
        });

        let handle = tokio::spawn(run_expiry_sweeper(
            Arc::new(repo),
            Duration::from_secs(3600),
        ));

        tokio::time::sleep(Duration::from_secs(2 * 3600 + 1)).await;
        handle.abort();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}

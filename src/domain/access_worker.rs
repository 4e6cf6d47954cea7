//! Background worker applying deferred access-count increments.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::domain::access_event::AccessReceiver;
use crate::domain::repositories::LinkRepository;

/// Retries after the first failed increment.
const MAX_RETRIES: usize = 3;

/// Drains the access queue until every sender is dropped.
///
/// At most `concurrency` increments are in flight at once. The tasks are
/// detached from the requests that produced the events, so a client
/// disconnect never cancels an update. On shutdown the worker waits for the
/// in-flight increments before returning.
pub async fn run_access_worker(
    mut rx: AccessReceiver,
    links: Arc<dyn LinkRepository>,
    concurrency: usize,
) {
    let concurrency = concurrency.max(1);
    let permits = Arc::new(Semaphore::new(concurrency));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let links = links.clone();
        tokio::spawn(async move {
            record_access(links.as_ref(), &event.code).await;
            drop(permit);
        });
    }

    let _ = permits.acquire_many(concurrency as u32).await;
    info!("Access worker stopped");
}

/// Increments the counter for `code`, retrying transient store failures.
///
/// Failures that outlast the retry budget are logged and dropped: the
/// counter is a statistic, not a ledger.
pub async fn record_access(links: &dyn LinkRepository, code: &str) {
    let strategy = ExponentialBackoff::from_millis(10)
        .map(jitter)
        .take(MAX_RETRIES);

    match Retry::start(strategy, || links.increment_access_count(code)).await {
        Ok(true) => debug!(code, "Access count incremented"),
        Ok(false) => debug!(code, "Link vanished before its access was recorded"),
        Err(e) => {
            metrics::counter!("tinylink_access_updates_failed_total").increment(1);
            warn!(code, error = %e, "Dropping access count update");
        }
    }
}

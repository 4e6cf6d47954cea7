//! Access event model for asynchronous counter updates.

use tokio::sync::mpsc;

/// A successful resolution whose counter increment was deferred.
///
/// Sent from the cache-hit path to
/// [`crate::domain::access_worker::run_access_worker`] so the redirect does
/// not wait on the durable store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEvent {
    pub code: String,
}

impl AccessEvent {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Sending half of the bounded access-event queue.
pub type AccessSender = mpsc::Sender<AccessEvent>;

/// Receiving half of the bounded access-event queue.
pub type AccessReceiver = mpsc::Receiver<AccessEvent>;

/// Creates the bounded queue between request handlers and the worker.
pub fn access_channel(capacity: usize) -> (AccessSender, AccessReceiver) {
    mpsc::channel(capacity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_event_creation() {
        let event = AccessEvent::new("abc123");
        assert_eq!(event.code, "abc123");
    }

    #[tokio::test]
    async fn test_access_channel_is_bounded() {
        let (tx, mut rx) = access_channel(1);

        tx.try_send(AccessEvent::new("first")).unwrap();
        assert!(tx.try_send(AccessEvent::new("second")).is_err());

        assert_eq!(rx.recv().await.unwrap().code, "first");
    }
}

//! Cancellation of work tied to the current navigation.
//!
//! The reconciliation controller fires this on every genuine path change.
//! Anything started for the previous location (a deferred load waiting out
//! its retry delay) subscribes first and gives up when it fires.

use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: broadcast::Sender<()>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(4);
        Self { tx }
    }

    /// Subscribe before starting cancellable work.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Cancel everything subscribed so far. Returns how many listeners were told.
    pub fn cancel(&self) -> usize {
        self.tx.send(()).unwrap_or(0)
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_reaches_existing_subscribers_only() {
        let signal = CancelSignal::new();
        assert_eq!(signal.cancel(), 0);

        let mut rx = signal.subscribe();
        assert_eq!(signal.cancel(), 1);
        assert!(rx.recv().await.is_ok());

        let mut late = signal.subscribe();
        assert!(matches!(
            late.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}

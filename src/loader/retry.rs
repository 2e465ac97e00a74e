//! Single-retry loading of deferred modules.
//!
//! # Responsibilities
//! - Run an importer, retrying once after a fixed delay on failure
//! - Remember, per tab session, which modules were already retried
//! - Abort the retry delay on navigation
//!
//! # Design Decisions
//! - The marker is set before the delay, so a reload during the delay still
//!   counts as the one retry
//! - Any success clears the marker
//! - Marker store errors are logged; the call itself stays bounded

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;

use crate::config::schema::LoaderConfig;
use crate::observability::metrics;
use crate::storage::KeyValueStore;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

const MARKER_PREFIX: &str = "retry-marker.";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("module `{key}` failed to load after one retry: {source}")]
    RetryFailed { key: String, source: BoxError },

    #[error("module `{key}` failed to load and was already retried this session: {source}")]
    AlreadyRetried { key: String, source: BoxError },

    #[error("loading module `{key}` was cancelled by navigation")]
    Cancelled { key: String },
}

#[derive(Debug, Clone)]
pub struct DeferredLoader {
    markers: Arc<dyn KeyValueStore>,
    retry_delay: Duration,
}

impl DeferredLoader {
    /// `markers` must be tab-session scoped: cleared when a new session starts.
    pub fn new(markers: Arc<dyn KeyValueStore>, retry_delay: Duration) -> Self {
        Self {
            markers,
            retry_delay,
        }
    }

    pub fn from_config(markers: Arc<dyn KeyValueStore>, config: &LoaderConfig) -> Self {
        Self::new(markers, Duration::from_millis(config.retry_delay_ms))
    }

    /// True if `key` already used its retry this session.
    pub fn has_retried(&self, key: &str) -> bool {
        match self.markers.get(&marker_key(key)) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read retry marker");
                false
            }
        }
    }

    pub async fn load_with_retry<M, E, F, Fut>(&self, key: &str, importer: F) -> Result<M, LoadError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<M, E>>,
        E: Into<BoxError>,
    {
        self.load_cancellable(key, importer, None).await
    }

    /// Like [`load_with_retry`](Self::load_with_retry), but the retry delay
    /// ends early with [`LoadError::Cancelled`] when `cancel` fires.
    pub async fn load_cancellable<M, E, F, Fut>(
        &self,
        key: &str,
        mut importer: F,
        cancel: Option<broadcast::Receiver<()>>,
    ) -> Result<M, LoadError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<M, E>>,
        E: Into<BoxError>,
    {
        let already_retried = self.has_retried(key);

        let first_error: BoxError = match importer().await {
            Ok(module) => {
                self.clear_marker(key);
                metrics::record_module_load("loaded");
                return Ok(module);
            }
            Err(e) => e.into(),
        };

        if already_retried {
            tracing::error!(key = %key, error = %first_error, "Module load failed, retry already used");
            metrics::record_module_load("failed");
            return Err(LoadError::AlreadyRetried {
                key: key.to_string(),
                source: first_error,
            });
        }

        tracing::warn!(
            key = %key,
            error = %first_error,
            delay_ms = self.retry_delay.as_millis() as u64,
            "Module load failed, retrying once"
        );
        self.set_marker(key);

        match cancel {
            Some(mut cancel) => {
                tokio::select! {
                    _ = tokio::time::sleep(self.retry_delay) => {}
                    _ = cancel.recv() => {
                        tracing::info!(key = %key, "Retry cancelled by navigation");
                        metrics::record_module_load("cancelled");
                        return Err(LoadError::Cancelled { key: key.to_string() });
                    }
                }
            }
            None => tokio::time::sleep(self.retry_delay).await,
        }

        match importer().await {
            Ok(module) => {
                self.clear_marker(key);
                metrics::record_module_load("retried");
                tracing::info!(key = %key, "Module loaded on retry");
                Ok(module)
            }
            Err(e) => {
                let source: BoxError = e.into();
                tracing::error!(key = %key, error = %source, "Module load failed after retry");
                metrics::record_module_load("failed");
                Err(LoadError::RetryFailed {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }

    fn set_marker(&self, key: &str) {
        if let Err(e) = self.markers.set(&marker_key(key), "true") {
            tracing::warn!(key = %key, error = %e, "Failed to set retry marker");
        }
    }

    fn clear_marker(&self, key: &str) {
        if let Err(e) = self.markers.remove(&marker_key(key)) {
            tracing::warn!(key = %key, error = %e, "Failed to clear retry marker");
        }
    }
}

fn marker_key(key: &str) -> String {
    format!("{MARKER_PREFIX}{key}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::CancelSignal;
    use crate::storage::MemoryStore;
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn loader() -> (MemoryStore, DeferredLoader) {
        let markers = MemoryStore::new();
        let loader = DeferredLoader::new(Arc::new(markers.clone()), Duration::from_millis(500));
        (markers, loader)
    }

    /// Importer that fails the first `failures` calls.
    fn flaky(
        attempts: Arc<AtomicU32>,
        failures: u32,
    ) -> impl FnMut() -> std::future::Ready<Result<&'static str, io::Error>> {
        move || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            if n < failures {
                std::future::ready(Err(io::Error::new(io::ErrorKind::Other, "chunk fetch failed")))
            } else {
                std::future::ready(Ok("module"))
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success() {
        let (markers, loader) = loader();
        let attempts = Arc::new(AtomicU32::new(0));

        let module = loader.load_with_retry("map", flaky(attempts.clone(), 0)).await.unwrap();
        assert_eq!(module, "module");
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(markers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_stops_after_two_attempts() {
        let (_, loader) = loader();
        let attempts = Arc::new(AtomicU32::new(0));

        let err = loader
            .load_with_retry("X", flaky(attempts.clone(), u32::MAX))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::RetryFailed { .. }));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert!(loader.has_retried("X"));

        // Marker stays for the session: next failure is not retried
        let err = loader
            .load_with_retry("X", flaky(attempts.clone(), u32::MAX))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::AlreadyRetried { .. }));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_clears_marker() {
        let (markers, loader) = loader();
        let attempts = Arc::new(AtomicU32::new(0));

        let started = tokio::time::Instant::now();
        let module = loader.load_with_retry("trips", flaky(attempts.clone(), 1)).await.unwrap();
        assert_eq!(module, "module");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert!(!loader.has_retried("trips"));
        assert!(markers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_with_marker_clears_it() {
        let (markers, loader) = loader();
        markers.set("retry-marker.admin", "true").unwrap();
        let attempts = Arc::new(AtomicU32::new(0));

        loader.load_with_retry("admin", flaky(attempts, 0)).await.unwrap();
        assert!(!loader.has_retried("admin"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_delay_skips_retry() {
        let (_, loader) = loader();
        let signal = CancelSignal::new();
        let attempts = Arc::new(AtomicU32::new(0));

        let cancel = signal.subscribe();
        signal.cancel();
        let err = loader
            .load_cancellable("earnings", flaky(attempts.clone(), u32::MAX), Some(cancel))
            .await
            .unwrap_err();

        assert!(matches!(err, LoadError::Cancelled { .. }));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_marker_store_still_bounded() {
        let (markers, loader) = loader();
        markers.set_disabled(true);
        let attempts = Arc::new(AtomicU32::new(0));

        let err = loader
            .load_with_retry("X", flaky(attempts.clone(), u32::MAX))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::RetryFailed { .. }));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}

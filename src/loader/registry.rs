//! View registry and error boundary.
//!
//! Maps each [`ViewKey`] to either an eagerly bundled module or a deferred
//! importer. Mounting a deferred view goes through the [`DeferredLoader`];
//! a final failure is turned into an [`ErrorView`] that offers a reload.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::dispatch::ViewKey;
use crate::loader::retry::{BoxError, DeferredLoader, LoadError};

/// A loaded view module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModule {
    pub view: ViewKey,
    /// Identifier of the code chunk that provided the view.
    pub chunk: String,
}

impl ViewModule {
    pub fn new(view: ViewKey, chunk: impl Into<String>) -> Self {
        Self {
            view,
            chunk: chunk.into(),
        }
    }
}

pub type ImportFuture = BoxFuture<'static, Result<ViewModule, BoxError>>;

/// Fetches the module for a deferred view.
pub trait ModuleImporter: Send + Sync {
    fn import(&self, view: &ViewKey) -> ImportFuture;
}

impl<F> ModuleImporter for F
where
    F: Fn(&ViewKey) -> ImportFuture + Send + Sync,
{
    fn import(&self, view: &ViewKey) -> ImportFuture {
        self(view)
    }
}

enum ViewSource {
    Eager(ViewModule),
    Deferred(Arc<dyn ModuleImporter>),
}

impl fmt::Debug for ViewSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewSource::Eager(module) => f.debug_tuple("Eager").field(module).finish(),
            ViewSource::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

/// Shown in place of a view that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorView {
    pub view: ViewKey,
    pub message: String,
    /// A full reload starts a fresh attempt (and, in a new tab session, a fresh retry).
    pub offer_reload: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Mounted {
    Ready(ViewModule),
    Failed(ErrorView),
    /// The user navigated away before the view finished loading.
    Discarded,
}

#[derive(Debug)]
pub struct ViewRegistry {
    views: HashMap<ViewKey, ViewSource>,
    loader: DeferredLoader,
}

impl ViewRegistry {
    pub fn new(loader: DeferredLoader) -> Self {
        Self {
            views: HashMap::new(),
            loader,
        }
    }

    pub fn register_eager(&mut self, view: ViewKey, chunk: impl Into<String>) {
        let module = ViewModule::new(view.clone(), chunk);
        self.views.insert(view, ViewSource::Eager(module));
    }

    pub fn register_deferred<I>(&mut self, view: ViewKey, importer: I)
    where
        I: ModuleImporter + 'static,
    {
        self.views.insert(view, ViewSource::Deferred(Arc::new(importer)));
    }

    pub fn is_registered(&self, view: &ViewKey) -> bool {
        self.views.contains_key(view)
    }

    pub fn is_deferred(&self, view: &ViewKey) -> bool {
        matches!(self.views.get(view), Some(ViewSource::Deferred(_)))
    }

    pub fn loader(&self) -> &DeferredLoader {
        &self.loader
    }

    /// Mount `view`. Pass a receiver from the controller's cancel signal so a
    /// load for a location the user already left is discarded.
    pub async fn mount(&self, view: &ViewKey, cancel: Option<broadcast::Receiver<()>>) -> Mounted {
        let importer = match self.views.get(view) {
            Some(ViewSource::Eager(module)) => return Mounted::Ready(module.clone()),
            Some(ViewSource::Deferred(importer)) => Arc::clone(importer),
            None => {
                tracing::error!(view = %view, "No module registered for view");
                return Mounted::Failed(ErrorView {
                    view: view.clone(),
                    message: format!("no module registered for view `{view}`"),
                    offer_reload: false,
                });
            }
        };

        let result = self
            .loader
            .load_cancellable(view.as_str(), || importer.import(view), cancel)
            .await;

        match result {
            Ok(module) => Mounted::Ready(module),
            Err(LoadError::Cancelled { .. }) => Mounted::Discarded,
            Err(e) => Mounted::Failed(ErrorView {
                view: view.clone(),
                message: e.to_string(),
                offer_reload: true,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn registry() -> ViewRegistry {
        let loader = DeferredLoader::new(Arc::new(MemoryStore::new()), Duration::from_millis(1500));
        ViewRegistry::new(loader)
    }

    fn counting_importer(attempts: Arc<AtomicU32>, failures: u32) -> impl ModuleImporter {
        move |view: &ViewKey| -> ImportFuture {
            let view = view.clone();
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if n < failures {
                    Err(Box::new(io::Error::new(io::ErrorKind::Other, "chunk 404")) as BoxError)
                } else {
                    Ok(ViewModule::new(view, "chunk-admin"))
                }
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_eager_view_ready_immediately() {
        let mut registry = registry();
        let view = ViewKey::from_static("landing.welcome");
        registry.register_eager(view.clone(), "main");

        let mounted = registry.mount(&view, None).await;
        assert_eq!(mounted, Mounted::Ready(ViewModule::new(view.clone(), "main")));
        assert!(registry.is_registered(&view));
        assert!(!registry.is_deferred(&view));
        assert!(!registry.is_registered(&ViewKey::from_static("driver.trips")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_view_fails_without_reload() {
        let registry = registry();
        let mounted = registry.mount(&ViewKey::from_static("nowhere"), None).await;
        match mounted {
            Mounted::Failed(error) => assert!(!error.offer_reload),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_view_recovers_on_retry() {
        let mut registry = registry();
        let view = ViewKey::from_static("admin.dashboard");
        let attempts = Arc::new(AtomicU32::new(0));
        registry.register_deferred(view.clone(), counting_importer(attempts.clone(), 1));

        let mounted = registry.mount(&view, None).await;
        assert!(matches!(mounted, Mounted::Ready(_)));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert!(!registry.loader().has_retried(view.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_view_failure_offers_reload() {
        let mut registry = registry();
        let view = ViewKey::from_static("admin.dashboard");
        let attempts = Arc::new(AtomicU32::new(0));
        registry.register_deferred(view.clone(), counting_importer(attempts.clone(), u32::MAX));

        match registry.mount(&view, None).await {
            Mounted::Failed(error) => {
                assert!(error.offer_reload);
                assert_eq!(error.view, view);
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_load_is_discarded() {
        let mut registry = registry();
        let view = ViewKey::from_static("driver.trips");
        let attempts = Arc::new(AtomicU32::new(0));
        registry.register_deferred(view.clone(), counting_importer(attempts.clone(), u32::MAX));

        let (tx, rx) = broadcast::channel(1);
        tx.send(()).unwrap();
        assert_eq!(registry.mount(&view, Some(rx)).await, Mounted::Discarded);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}

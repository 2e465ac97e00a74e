//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use section_router::config::schema::default_routes;
use section_router::dispatch::ViewKey;
use section_router::loader::{BoxError, ImportFuture, ModuleImporter, ViewModule};
use section_router::reconcile::{KnownIdentities, ReconciliationController, SectionMarkers};
use section_router::routing::RouteTable;
use section_router::session::{Screen, Section, SectionPayloads, SessionState};
use section_router::storage::{DurableStateStore, KeyValueStore};

pub const NAMESPACE: &str = "nav";

pub fn store(backend: Arc<dyn KeyValueStore>) -> DurableStateStore {
    DurableStateStore::new(backend, NAMESPACE)
}

/// Controller over the default route table, backed by `backend`.
pub fn controller(
    backend: Arc<dyn KeyValueStore>,
    identities: KnownIdentities,
) -> ReconciliationController {
    let routes = Arc::new(RouteTable::from_config(&default_routes()).unwrap());
    ReconciliationController::new(
        routes,
        store(backend),
        SectionMarkers::default(),
        Arc::new(identities),
    )
}

/// Write a (section, screen) pair the way a previous run would have.
pub fn persist(backend: Arc<dyn KeyValueStore>, section: Section, screen: Screen) {
    store(backend).save(&SessionState::from_parts(
        section,
        Some(screen),
        SectionPayloads::default(),
    ));
}

/// Importer failing its first `failures` attempts. Returns the attempt counter.
pub fn flaky_importer(failures: u32) -> (Arc<AtomicU32>, impl ModuleImporter) {
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();
    let importer = move |view: &ViewKey| -> ImportFuture {
        let view = view.clone();
        let n = counter.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if n < failures {
                Err(Box::new(io::Error::new(io::ErrorKind::Other, "chunk fetch failed")) as BoxError)
            } else {
                Ok(ViewModule::new(view, "chunk"))
            }
        })
    };
    (attempts, importer)
}

//! Reconciliation controller.
//!
//! # States
//! - Booting: state just read back from storage, nothing checked yet
//! - Repairing: a section or screen is being overwritten
//! - Reconciled: (section, screen) is consistent and persisted
//!
//! # Pass
//! ```text
//! pathname ── unmatched? ── replace with `/`
//!     │
//!     ├─ infer section from markers (else keep current section)
//!     ├─ section differs?          → Repairing: section := path section
//!     ├─ screen outside section?   → Repairing: screen := entry screen
//!     ├─ identity present and
//!     │  screen == entry screen?   → Repairing: screen := landing screen
//!     └─ Reconciled: dispatcher resolves the view
//! ```
//!
//! A pass is idempotent: running it again on the same path changes nothing.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::dispatch::{dispatcher_for, ViewKey};
use crate::lifecycle::CancelSignal;
use crate::observability::metrics;
use crate::reconcile::history::History;
use crate::reconcile::identity::IdentitySignal;
use crate::reconcile::inference::SectionMarkers;
use crate::routing::{parse_target, RouteTable, ROOT_PATH};
use crate::session::{
    AdminPayload, DriverPayload, PassengerPayload, Screen, Section, SessionState,
};
use crate::storage::DurableStateStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Booting,
    Repairing,
    Reconciled,
}

/// A correction applied during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Repair {
    /// Persisted section disagreed with the path.
    SectionMismatch { from: Section, to: Section },
    /// Screen missing or outside the section's table.
    InvalidScreen { from: Option<Screen>, to: Screen },
    /// Signed-in identity was about to see its login screen.
    AuthenticatedLanding { from: Screen, to: Screen },
}

impl Repair {
    pub fn kind(&self) -> &'static str {
        match self {
            Repair::SectionMismatch { .. } => "section_mismatch",
            Repair::InvalidScreen { .. } => "invalid_screen",
            Repair::AuthenticatedLanding { .. } => "authenticated_landing",
        }
    }
}

/// Result of a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileOutcome {
    pub pathname: String,
    /// Set when the requested path matched no route and was replaced by `/`.
    pub redirected_from: Option<String>,
    /// View of the matched route.
    pub route_view: Option<ViewKey>,
    pub section: Section,
    pub screen: Screen,
    /// View the section dispatcher resolved for the screen.
    pub view: ViewKey,
    pub repairs: Vec<Repair>,
    pub trace: Vec<Phase>,
    pub epoch: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Overwrite the current history entry instead of adding one.
    pub replace: bool,
}

impl NavigateOptions {
    pub fn push() -> Self {
        Self { replace: false }
    }

    pub fn replace() -> Self {
        Self { replace: true }
    }
}

#[derive(Debug, Error)]
pub enum NavigateError {
    #[error("invalid navigation target `{target}`: {source}")]
    InvalidTarget {
        target: String,
        source: url::ParseError,
    },

    #[error("navigation before boot")]
    NotBooted,
}

/// Identifies the navigation an async operation was started under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    epoch: u64,
}

/// Owns the session state and keeps it consistent with the current path.
pub struct ReconciliationController {
    routes: Arc<RouteTable>,
    store: DurableStateStore,
    markers: SectionMarkers,
    identity: Arc<dyn IdentitySignal>,
    history: History,
    session: SessionState,
    phase: Phase,
    booted: bool,
    epoch: u64,
    cancel: CancelSignal,
}

impl ReconciliationController {
    pub fn new(
        routes: Arc<RouteTable>,
        store: DurableStateStore,
        markers: SectionMarkers,
        identity: Arc<dyn IdentitySignal>,
    ) -> Self {
        Self {
            routes,
            store,
            markers,
            identity,
            history: History::new(ROOT_PATH),
            session: SessionState::initial(),
            phase: Phase::Booting,
            booted: false,
            epoch: 0,
            cancel: CancelSignal::new(),
        }
    }

    /// Start (or restart) at `location`: read persisted state and reconcile.
    ///
    /// Calling this again models a full reload: history is reset and the
    /// session is read back from storage.
    pub fn boot(&mut self, location: &str) -> Result<ReconcileOutcome, NavigateError> {
        let pathname = parse(location)?;
        self.phase = Phase::Booting;
        self.history = History::new(pathname);
        self.session = match self.store.load() {
            Some(state) => state,
            None => {
                tracing::debug!("No persisted session state, starting fresh");
                SessionState::initial()
            }
        };
        tracing::info!(
            path = %self.pathname(),
            section = %self.session.section(),
            screen = ?self.session.screen().map(|s| s.id()),
            "Booting"
        );
        self.booted = true;
        Ok(self.on_path_change())
    }

    /// Move to `target`, pushing or replacing the history entry.
    ///
    /// Navigating to the current pathname does not start a new pass.
    pub fn navigate(
        &mut self,
        target: &str,
        options: NavigateOptions,
    ) -> Result<ReconcileOutcome, NavigateError> {
        if !self.booted {
            return Err(NavigateError::NotBooted);
        }
        let pathname = parse(target)?;
        if pathname == self.pathname() {
            tracing::debug!(path = %pathname, "Already at path");
            return Ok(self.snapshot());
        }

        tracing::debug!(path = %pathname, replace = options.replace, "Navigating");
        if options.replace {
            self.history.replace(pathname);
        } else {
            self.history.push(pathname);
        }
        Ok(self.on_path_change())
    }

    /// Browser back. `None` at the start of history.
    pub fn back(&mut self) -> Option<ReconcileOutcome> {
        if !self.booted {
            return None;
        }
        self.history.back()?;
        Some(self.on_path_change())
    }

    /// Browser forward. `None` at the end of history.
    pub fn forward(&mut self) -> Option<ReconcileOutcome> {
        if !self.booted {
            return None;
        }
        self.history.forward()?;
        Some(self.on_path_change())
    }

    /// Run a pass on the current path without treating it as a navigation.
    pub fn reconcile(&mut self) -> ReconcileOutcome {
        self.reconcile_pass()
    }

    /// Request a screen change within the active section.
    ///
    /// Rejected (and logged) when `next` is outside the section's table.
    pub fn set_screen(&mut self, next: Screen) -> bool {
        let dispatcher = dispatcher_for(self.session.section());
        if !dispatcher.set_screen(&mut self.session, next) {
            return false;
        }
        self.store.save_screen(self.session.screen());
        true
    }

    pub fn update_passenger<F: FnOnce(&mut PassengerPayload)>(&mut self, f: F) -> bool {
        let mut next = self.session.payloads.passenger.clone();
        f(&mut next);
        if !next.is_well_formed() {
            tracing::warn!(section = %Section::Passenger, "Rejected malformed payload update");
            return false;
        }
        self.session.payloads.passenger = next;
        self.store.save_payload(Section::Passenger, &self.session.payloads);
        true
    }

    pub fn update_driver<F: FnOnce(&mut DriverPayload)>(&mut self, f: F) -> bool {
        let mut next = self.session.payloads.driver.clone();
        f(&mut next);
        if !next.is_well_formed() {
            tracing::warn!(section = %Section::Driver, "Rejected malformed payload update");
            return false;
        }
        self.session.payloads.driver = next;
        self.store.save_payload(Section::Driver, &self.session.payloads);
        true
    }

    pub fn update_admin<F: FnOnce(&mut AdminPayload)>(&mut self, f: F) -> bool {
        let mut next = self.session.payloads.admin.clone();
        f(&mut next);
        if !next.is_well_formed() {
            tracing::warn!(section = %Section::Admin, "Rejected malformed payload update");
            return false;
        }
        self.session.payloads.admin = next;
        self.store.save_payload(Section::Admin, &self.session.payloads);
        true
    }

    /// Drop all persisted state (logout) and reconcile the current path afresh.
    pub fn reset(&mut self) -> ReconcileOutcome {
        tracing::info!(path = %self.pathname(), "Resetting session state");
        self.store.clear();
        self.session = SessionState::initial();
        self.on_path_change()
    }

    /// Ticket for async work started now.
    pub fn ticket(&self) -> LoadTicket {
        LoadTicket { epoch: self.epoch }
    }

    /// True if no navigation happened since `ticket` was issued.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.epoch == self.epoch
    }

    /// Apply a screen change requested by async work.
    ///
    /// Dropped if the user navigated since the work started; otherwise
    /// validated against the section active now, not the one at start.
    pub fn complete_transition(&mut self, ticket: LoadTicket, next: Screen) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                ticket_epoch = ticket.epoch,
                epoch = self.epoch,
                screen = %next,
                "Discarding stale transition"
            );
            return false;
        }
        self.set_screen(next)
    }

    /// Subscribe to cancellation of the current navigation.
    pub fn subscribe_cancel(&self) -> broadcast::Receiver<()> {
        self.cancel.subscribe()
    }

    /// Current state as an outcome, without running a pass.
    pub fn snapshot(&self) -> ReconcileOutcome {
        let dispatcher = dispatcher_for(self.session.section());
        let screen = self
            .session
            .screen()
            .unwrap_or_else(|| dispatcher.entry_screen());
        ReconcileOutcome {
            pathname: self.pathname().to_string(),
            redirected_from: None,
            route_view: self.routes.resolve(self.pathname()).map(|r| r.view().clone()),
            section: self.session.section(),
            screen,
            view: dispatcher.resolve(Some(&screen)),
            repairs: Vec::new(),
            trace: vec![self.phase],
            epoch: self.epoch,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn pathname(&self) -> &str {
        &self.history.current().pathname
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn store(&self) -> &DurableStateStore {
        &self.store
    }

    fn on_path_change(&mut self) -> ReconcileOutcome {
        self.epoch += 1;
        let cancelled = self.cancel.cancel();
        if cancelled > 0 {
            tracing::debug!(cancelled, "Cancelled work from previous navigation");
        }
        self.reconcile_pass()
    }

    fn reconcile_pass(&mut self) -> ReconcileOutcome {
        let mut trace = vec![self.phase];
        let mut repairs = Vec::new();

        let mut redirected_from = None;
        if self.routes.resolve(self.pathname()).is_none() && self.pathname() != ROOT_PATH {
            tracing::info!(path = %self.pathname(), "No route matched, replacing with root");
            redirected_from = Some(self.pathname().to_string());
            self.history.replace(ROOT_PATH);
        }
        let pathname = self.pathname().to_string();
        let route_view = self.routes.resolve(&pathname).map(|r| r.view().clone());

        let current = self.session.section();
        let section = self.markers.infer(&pathname).unwrap_or(current);
        if section != current {
            self.enter_repairing(&mut trace);
            tracing::info!(
                path = %pathname,
                from = %current,
                to = %section,
                "Persisted section disagrees with path, path wins"
            );
            repairs.push(Repair::SectionMismatch {
                from: current,
                to: section,
            });
            self.session.section = section;
            self.store.save_section(section);
        }

        let dispatcher = dispatcher_for(section);
        let entry = dispatcher.entry_screen();
        let screen_ok = self
            .session
            .screen()
            .map_or(false, |screen| dispatcher.accepts(&screen));
        if !screen_ok {
            self.enter_repairing(&mut trace);
            tracing::info!(
                section = %section,
                screen = ?self.session.screen().map(|s| s.id()),
                entry = %entry,
                "Screen invalid for section, resetting to entry screen"
            );
            repairs.push(Repair::InvalidScreen {
                from: self.session.screen(),
                to: entry,
            });
            self.session.screen = Some(entry);
            self.store.save_screen(Some(entry));
        }

        if let Some(landing) = dispatcher.landing_screen() {
            if self.session.screen() == Some(entry) && self.identity.has_identity(section) {
                self.enter_repairing(&mut trace);
                tracing::info!(
                    section = %section,
                    landing = %landing,
                    "Identity present, skipping entry screen"
                );
                repairs.push(Repair::AuthenticatedLanding {
                    from: entry,
                    to: landing,
                });
                self.session.screen = Some(landing);
                self.store.save_screen(Some(landing));
            }
        }

        self.phase = Phase::Reconciled;
        trace.push(Phase::Reconciled);

        let screen = self.session.screen().unwrap_or(entry);
        let view = dispatcher.resolve(Some(&screen));

        for repair in &repairs {
            metrics::record_repair(repair.kind());
        }
        metrics::record_reconciliation(section);
        tracing::info!(
            path = %pathname,
            section = %section,
            screen = %screen,
            view = %view,
            repairs = repairs.len(),
            "Reconciled"
        );

        ReconcileOutcome {
            pathname,
            redirected_from,
            route_view,
            section,
            screen,
            view,
            repairs,
            trace,
            epoch: self.epoch,
        }
    }

    fn enter_repairing(&mut self, trace: &mut Vec<Phase>) {
        self.phase = Phase::Repairing;
        trace.push(Phase::Repairing);
    }
}

fn parse(target: &str) -> Result<String, NavigateError> {
    parse_target(target).map_err(|source| NavigateError::InvalidTarget {
        target: target.to_string(),
        source,
    })
}

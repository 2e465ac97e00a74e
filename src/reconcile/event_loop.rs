//! Ordered processing of navigation events.
//!
//! # Responsibilities
//! - Receive navigation events from the host in delivery order
//! - Run each event's reconciliation to completion before the next
//! - Publish outcomes for the host to render
//!
//! # Design Decisions
//! - Single task owns the controller; no locking
//! - Shutdown is checked before each event so a pending pass is never cut short

use tokio::sync::{broadcast, mpsc};

use crate::reconcile::controller::{NavigateOptions, ReconcileOutcome, ReconciliationController};
use crate::session::Screen;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    Navigate { target: String, replace: bool },
    Back,
    Forward,
    SetScreen(Screen),
    Reset,
}

pub struct NavigationLoop {
    controller: ReconciliationController,
    events: mpsc::UnboundedReceiver<NavigationEvent>,
    outcomes: mpsc::UnboundedSender<ReconcileOutcome>,
}

impl NavigationLoop {
    /// Wrap a booted controller. Returns the loop, the event sender and the
    /// outcome receiver.
    pub fn new(
        controller: ReconciliationController,
    ) -> (
        Self,
        mpsc::UnboundedSender<NavigationEvent>,
        mpsc::UnboundedReceiver<ReconcileOutcome>,
    ) {
        let (event_tx, events) = mpsc::unbounded_channel();
        let (outcomes, outcome_rx) = mpsc::unbounded_channel();
        (
            Self {
                controller,
                events,
                outcomes,
            },
            event_tx,
            outcome_rx,
        )
    }

    /// Process events until shutdown or until every sender is dropped.
    /// Hands the controller back for inspection.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> ReconciliationController {
        tracing::info!(path = %self.controller.pathname(), "Navigation loop starting");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Navigation loop received shutdown signal, exiting loop");
                    break;
                }
                event = self.events.recv() => match event {
                    Some(event) => self.handle(event),
                    None => {
                        tracing::debug!("Navigation event channel closed");
                        break;
                    }
                },
            }
        }

        self.controller
    }

    fn handle(&mut self, event: NavigationEvent) {
        tracing::debug!(event = ?event, "Navigation event");
        let outcome = match event {
            NavigationEvent::Navigate { target, replace } => {
                match self.controller.navigate(&target, NavigateOptions { replace }) {
                    Ok(outcome) => Some(outcome),
                    Err(e) => {
                        tracing::warn!(destination = %target, error = %e, "Navigation rejected");
                        None
                    }
                }
            }
            NavigationEvent::Back => self.controller.back(),
            NavigationEvent::Forward => self.controller.forward(),
            NavigationEvent::SetScreen(screen) => {
                self.controller.set_screen(screen);
                Some(self.controller.snapshot())
            }
            NavigationEvent::Reset => Some(self.controller.reset()),
        };

        if let Some(outcome) = outcome {
            let _ = self.outcomes.send(outcome);
        }
    }
}

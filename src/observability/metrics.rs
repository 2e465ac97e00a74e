//! Metrics collection and exposition.
//!
//! # Metrics
//! - `nav_reconciliations_total` (counter): passes completed, by section
//! - `nav_repairs_total` (counter): repairs applied, by kind
//! - `nav_rejected_screens_total` (counter): `set_screen` calls refused, by section
//! - `nav_storage_failures_total` (counter): backend errors, by operation
//! - `nav_corrupt_slots_total` (counter): persisted slots dropped on read
//! - `nav_module_loads_total` (counter): deferred loads, by outcome

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::session::Section;

/// Install the Prometheus recorder and return a handle for rendering.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics recorder");
            None
        }
    }
}

pub fn record_reconciliation(section: Section) {
    metrics::counter!("nav_reconciliations_total", "section" => section.as_str()).increment(1);
}

pub fn record_repair(kind: &'static str) {
    metrics::counter!("nav_repairs_total", "kind" => kind).increment(1);
}

pub fn record_rejected_screen(section: Section) {
    metrics::counter!("nav_rejected_screens_total", "section" => section.as_str()).increment(1);
}

pub fn record_storage_failure(op: &'static str) {
    metrics::counter!("nav_storage_failures_total", "op" => op).increment(1);
}

pub fn record_corrupt_slot() {
    metrics::counter!("nav_corrupt_slots_total").increment(1);
}

pub fn record_module_load(outcome: &'static str) {
    metrics::counter!("nav_module_loads_total", "outcome" => outcome).increment(1);
}

//! Outcome of a route computation.

use std::collections::BTreeMap;

use crate::error::{LookupError, SkipReason};

/// A (ingress, egress) pair that got no route, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPair {
    pub ingress: String,
    pub egress: String,
    pub reason: SkipReason,
}

/// What one `compute_routes`/`add_port` call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputeReport {
    /// Routes written to the table by this call.
    pub routes_installed: usize,
    /// Calls issued to the device lookup. Devices skipped because the
    /// context was already cancelled are not counted.
    pub lookups: usize,
    /// Pairs left without a route.
    pub skipped: Vec<SkippedPair>,
    /// Devices that failed to resolve, with the preserved cause.
    pub lookup_failures: BTreeMap<String, LookupError>,
}

impl ComputeReport {
    /// True when nothing was skipped.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.lookup_failures.is_empty()
    }

    pub(crate) fn skip(&mut self, ingress: &str, egress: &str, reason: SkipReason) {
        self.skipped.push(SkippedPair {
            ingress: ingress.to_string(),
            egress: egress.to_string(),
            reason,
        });
    }
}

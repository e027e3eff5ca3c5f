//! In-memory alert log with lazy sliding-window retention.

use chrono::{DateTime, Duration, Utc};
use pool_core::types::RiskAlert;
use std::sync::Mutex;

/// How long alerts are kept. Pruned lazily on every insert, not by a
/// background sweep.
const RETENTION_DAYS: i64 = 7;
/// Read-time window for "active" alerts. Distinct from the retention
/// horizon.
const ACTIVE_WINDOW_HOURS: i64 = 24;

/// Ordered, shared alert log.
#[derive(Default)]
pub struct AlertLog {
    alerts: Mutex<Vec<RiskAlert>>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an alert, then drop everything older than the retention
    /// window (wall clock at call time).
    pub fn insert(&self, alert: RiskAlert) {
        self.insert_at(alert, Utc::now());
    }

    pub(crate) fn insert_at(&self, alert: RiskAlert, now: DateTime<Utc>) {
        let cutoff = now - Duration::days(RETENTION_DAYS);
        let mut alerts = self.alerts.lock().expect("alert log poisoned");
        alerts.push(alert);
        alerts.retain(|a| a.timestamp > cutoff);
    }

    /// Alerts from the last 24 hours. Read-only: does not prune the log.
    pub fn active(&self) -> Vec<RiskAlert> {
        self.active_at(Utc::now())
    }

    pub(crate) fn active_at(&self, now: DateTime<Utc>) -> Vec<RiskAlert> {
        let cutoff = now - Duration::hours(ACTIVE_WINDOW_HOURS);
        self.alerts
            .lock()
            .expect("alert log poisoned")
            .iter()
            .filter(|a| a.timestamp > cutoff)
            .cloned()
            .collect()
    }

    /// Snapshot of everything currently retained.
    pub fn all(&self) -> Vec<RiskAlert> {
        self.alerts.lock().expect("alert log poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().expect("alert log poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

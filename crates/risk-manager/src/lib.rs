//! Risk Manager
//!
//! Evaluates registered strategies against the live data feed and raises
//! time-stamped alerts when risk thresholds are breached.

pub mod alert_log;
pub mod manager;
pub mod thresholds;

pub use alert_log::AlertLog;
pub use manager::RiskManager;
pub use thresholds::{calculate_severity, RiskThresholds};

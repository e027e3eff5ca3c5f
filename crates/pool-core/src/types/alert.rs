//! Risk alert and anomaly types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Which risk check produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Market,
    Strategy,
    Liquidity,
    Volatility,
}

/// Alert severity. Ordered so that severities can be compared directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A time-stamped risk alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAlert {
    pub id: Uuid,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Free-form context for the alert sink.
    pub details: Value,
}

impl RiskAlert {
    pub fn new(
        alert_type: AlertType,
        severity: Severity,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
        details: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            alert_type,
            severity,
            message: message.into(),
            timestamp,
            details,
        }
    }
}

/// Kind of anomaly reported by the upstream detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    PriceChange,
    LiquidityChange,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::PriceChange => "price_change",
            AnomalyKind::LiquidityChange => "liquidity_change",
        }
    }
}

/// An anomaly event pushed by the data pipeline. The upstream severity is
/// passed through to the resulting alert unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyEvent {
    pub kind: AnomalyKind,
    pub pool_id: String,
    pub severity: Severity,
    pub details: Value,
}

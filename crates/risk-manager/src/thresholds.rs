//! Risk thresholds and severity grading.

use pool_core::types::{RiskLevel, Severity};
use serde::{Deserialize, Serialize};

/// Per-strategy risk limits, derived from the strategy's risk level at
/// registration time and never independently mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Upper bound on the latest sample's rolling volatility.
    pub max_volatility: f64,
    /// Upper bound on the trailing 24h drawdown.
    pub max_drawdown: f64,
    /// Lower bound on pool liquidity, in USD.
    pub min_liquidity: f64,
    /// Maximum portfolio exposure to a single pool.
    pub max_exposure: f64,
}

impl RiskThresholds {
    /// Fixed lookup by risk level. Pure: the same level always yields the
    /// same thresholds.
    pub fn for_risk_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => Self {
                max_volatility: 0.10,
                max_drawdown: 0.05,
                min_liquidity: 500_000.0,
                max_exposure: 0.10,
            },
            RiskLevel::Medium => Self {
                max_volatility: 0.20,
                max_drawdown: 0.10,
                min_liquidity: 250_000.0,
                max_exposure: 0.20,
            },
            RiskLevel::High => Self {
                max_volatility: 0.30,
                max_drawdown: 0.15,
                min_liquidity: 100_000.0,
                max_exposure: 0.30,
            },
        }
    }
}

/// Grade how far a value overshoots its threshold.
///
/// Ratios above 1.5 are high, above 1.2 medium, everything else low; ties
/// resolve to the lower category.
pub fn calculate_severity(value: f64, threshold: f64) -> Severity {
    let ratio = value / threshold;
    if ratio > 1.5 {
        Severity::High
    } else if ratio > 1.2 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

//! Strategy definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Risk appetite of a strategy. Fully determines its risk thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// A named trading rule.
///
/// `parameters` is free-form; the momentum rule reads `indicator`,
/// `buyThreshold` and `sellThreshold` from it. Strategies with unknown or
/// missing indicators never signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub name: String,
    pub risk_level: RiskLevel,
    /// Target annual return, as a fraction.
    pub target_return: f64,
    /// Stop-loss trigger: close a position once its decline from entry
    /// exceeds this fraction.
    pub max_drawdown: f64,
    /// Rule-specific parameters.
    pub parameters: Map<String, Value>,
}

impl Strategy {
    /// Create a strategy with no parameters (it will never signal).
    pub fn new(name: impl Into<String>, risk_level: RiskLevel) -> Self {
        Self {
            name: name.into(),
            risk_level,
            target_return: 0.0,
            max_drawdown: 1.0,
            parameters: Map::new(),
        }
    }

    /// Create a momentum strategy with explicit buy/sell thresholds.
    pub fn momentum(
        name: impl Into<String>,
        risk_level: RiskLevel,
        buy_threshold: f64,
        sell_threshold: f64,
        max_drawdown: f64,
    ) -> Self {
        let mut parameters = Map::new();
        parameters.insert("indicator".to_string(), Value::from("momentum"));
        parameters.insert("buyThreshold".to_string(), Value::from(buy_threshold));
        parameters.insert("sellThreshold".to_string(), Value::from(sell_threshold));

        Self {
            name: name.into(),
            risk_level,
            target_return: 0.0,
            max_drawdown,
            parameters,
        }
    }

    /// Look up a string parameter.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(Value::as_str)
    }

    /// Look up a numeric parameter.
    pub fn param_f64(&self, key: &str) -> Option<f64> {
        self.parameters.get(key).and_then(Value::as_f64)
    }
}

//! Market observation types produced by the data-collection layer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One observed data point for a tradable pool at a point in time.
///
/// Immutable once recorded; the upstream collector computes `volatility`
/// as a rolling statistic before handing the sample over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSample {
    /// Observation time.
    pub timestamp: DateTime<Utc>,
    /// Spot price (positive).
    pub price: f64,
    /// Trailing 24h volume.
    pub volume_24h: f64,
    /// Pool liquidity at observation time.
    pub liquidity: f64,
    /// Rolling volatility computed upstream.
    pub volatility: f64,
}

impl MarketSample {
    /// Create a sample with only the required fields set.
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            timestamp,
            price,
            volume_24h: 0.0,
            liquidity: 0.0,
            volatility: 0.0,
        }
    }

    /// Set the trailing 24h volume.
    pub fn with_volume(mut self, volume_24h: f64) -> Self {
        self.volume_24h = volume_24h;
        self
    }

    /// Set the observed liquidity.
    pub fn with_liquidity(mut self, liquidity: f64) -> Self {
        self.liquidity = liquidity;
        self
    }

    /// Set the rolling volatility.
    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }
}

/// A liquidity pool's state at a point in time.
///
/// Value type: never mutated, only superseded by a newer snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Pool address (opaque identifier).
    pub address: String,
    /// First token of the pair.
    pub token0: String,
    /// Second token of the pair.
    pub token1: String,
    /// Reserve of token0.
    pub reserve0: Decimal,
    /// Reserve of token1.
    pub reserve1: Decimal,
    /// Pool fee as a fraction.
    pub fee: f64,
    /// LP token total supply, decimal-string encoded as received on the
    /// wire. Parsed lazily so a malformed value fails only the check that
    /// needs it.
    pub total_supply: String,
}

impl PoolSnapshot {
    /// Parse the total supply into a number.
    pub fn total_supply_value(&self) -> Result<f64> {
        self.total_supply
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::InvalidNumeric {
                field: "total_supply",
                value: self.total_supply.clone(),
            })
    }
}

/// A buffered observation: market sample plus the pool snapshot taken
/// alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub sample: MarketSample,
    pub snapshot: PoolSnapshot,
}

impl DataPoint {
    pub fn new(sample: MarketSample, snapshot: PoolSnapshot) -> Self {
        Self {
            timestamp: sample.timestamp,
            sample,
            snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn snapshot(total_supply: &str) -> PoolSnapshot {
        PoolSnapshot {
            address: "0xpool".to_string(),
            token0: "WETH".to_string(),
            token1: "USDC".to_string(),
            reserve0: Decimal::new(1000, 0),
            reserve1: Decimal::new(2_000_000, 0),
            fee: 0.003,
            total_supply: total_supply.to_string(),
        }
    }

    #[test]
    fn test_total_supply_parses() {
        assert_eq!(snapshot("50000").total_supply_value().unwrap(), 50_000.0);
        assert_eq!(snapshot(" 1.5e6 ").total_supply_value().unwrap(), 1_500_000.0);
    }

    #[test]
    fn test_total_supply_malformed() {
        let err = snapshot("not-a-number").total_supply_value().unwrap_err();
        assert!(matches!(
            err,
            crate::Error::InvalidNumeric { field: "total_supply", .. }
        ));
    }
}

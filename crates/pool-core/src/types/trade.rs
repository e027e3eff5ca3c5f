//! Trade and backtest result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed round-trip trade produced by the backtest simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    /// Exit time.
    pub timestamp: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Fractional return: `(exit - entry) / entry`.
    pub profit: f64,
    /// Seconds between entry and exit.
    pub holding_period_secs: i64,
}

/// Aggregate output of a backtest run.
///
/// Degenerate inputs produce IEEE-754 degenerate values rather than errors:
/// zero trades makes `win_rate`, `volatility`, `sharpe_ratio` and
/// `profit_factor` NaN; a run with trades but no losses makes
/// `profit_factor` infinite. Callers must check before acting on these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Strategy that was simulated.
    pub strategy_name: String,
    /// Pool the historical series came from.
    pub pool_id: String,
    /// Per-trade fractional returns, in trade order.
    pub returns: Vec<f64>,
    /// Number of completed trades.
    pub trades: usize,
    /// Fraction of trades with positive profit.
    pub win_rate: f64,
    /// Mean excess return over the nominal risk-free rate, divided by
    /// volatility.
    pub sharpe_ratio: f64,
    /// Peak-to-trough decline of the compounded return curve.
    pub max_drawdown: f64,
    /// Population standard deviation of per-trade returns.
    pub volatility: f64,
    /// Sum of gains over sum of losses.
    pub profit_factor: f64,
    pub computed_at: DateTime<Utc>,
}

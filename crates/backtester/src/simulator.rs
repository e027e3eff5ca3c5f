//! Trade simulation and performance metrics.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, info};

use pool_core::config::AnalysisConfig;
use pool_core::stats;
use pool_core::types::{BacktestResult, MarketSample, Strategy, TradeResult};

use crate::data_source::HistoricalDataSource;
use crate::signal::{generate_signal, Signal};

/// Offline strategy backtester.
///
/// Each `backtest` call is a bounded computation over a fixed input; the
/// struct holds no simulation state between calls beyond the per-pool
/// series cache.
pub struct Backtester<S> {
    source: S,
    backtest_period: Duration,
    cache: DashMap<String, Vec<MarketSample>>,
}

impl<S: HistoricalDataSource> Backtester<S> {
    pub fn new(source: S, config: &AnalysisConfig) -> Self {
        Self {
            source,
            backtest_period: Duration::days(config.backtest_period_days),
            cache: DashMap::new(),
        }
    }

    /// Replay the pool's recent history through the strategy's signal rule
    /// and compute summary statistics.
    ///
    /// A strategy that never signals produces zero trades and a
    /// NaN-laden result rather than an error.
    pub async fn backtest(&self, strategy: &Strategy, pool_id: &str) -> Result<BacktestResult> {
        info!(
            strategy = %strategy.name,
            pool_id,
            period_days = self.backtest_period.num_days(),
            "Starting backtest"
        );

        let series = self.load_historical(pool_id).await?;
        let trades = simulate_strategy(strategy, &series);
        let result = calculate_metrics(&strategy.name, pool_id, &trades);

        info!(
            strategy = %strategy.name,
            pool_id,
            trades = result.trades,
            win_rate = result.win_rate,
            sharpe = result.sharpe_ratio,
            "Backtest completed"
        );

        Ok(result)
    }

    async fn load_historical(&self, pool_id: &str) -> Result<Vec<MarketSample>> {
        if let Some(series) = self.cache.get(pool_id) {
            debug!(pool_id, samples = series.len(), "Using cached series");
            return Ok(series.clone());
        }

        let end = Utc::now();
        let start = end - self.backtest_period;
        let series = self.source.fetch_historical(pool_id, start, end).await?;

        debug!(pool_id, samples = series.len(), "Fetched historical series");
        self.cache.insert(pool_id.to_string(), series.clone());
        Ok(series)
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenPosition {
    entry_price: f64,
    entry_time: DateTime<Utc>,
}

/// Replay a time-ordered series through the strategy, producing the trade
/// ledger.
///
/// The walk starts at the second sample (the first only provides context
/// for the momentum rule), so fewer than two samples yield zero trades.
/// A position still open when the series ends is dropped, not recorded.
pub fn simulate_strategy(strategy: &Strategy, series: &[MarketSample]) -> Vec<TradeResult> {
    let mut trades = Vec::new();
    let mut position: Option<OpenPosition> = None;

    for i in 1..series.len() {
        let signal = generate_signal(strategy, &series[..=i]);
        let current = &series[i];

        match position {
            None if signal == Signal::Buy => {
                position = Some(OpenPosition {
                    entry_price: current.price,
                    entry_time: current.timestamp,
                });
            }
            Some(open)
                if signal == Signal::Sell
                    || stop_loss_triggered(strategy, open.entry_price, current.price) =>
            {
                trades.push(TradeResult {
                    timestamp: current.timestamp,
                    entry_price: open.entry_price,
                    exit_price: current.price,
                    profit: (current.price - open.entry_price) / open.entry_price,
                    holding_period_secs: (current.timestamp - open.entry_time).num_seconds(),
                });
                position = None;
            }
            _ => {}
        }
    }

    trades
}

fn stop_loss_triggered(strategy: &Strategy, entry_price: f64, current_price: f64) -> bool {
    (entry_price - current_price) / entry_price > strategy.max_drawdown
}

/// Aggregate a trade ledger into summary statistics.
///
/// Zero trades make `win_rate`, `volatility`, `sharpe_ratio` and
/// `profit_factor` NaN; trades without any loss make `profit_factor`
/// infinite. Both are defined failure modes for the caller to check, not
/// errors.
pub fn calculate_metrics(
    strategy_name: &str,
    pool_id: &str,
    trades: &[TradeResult],
) -> BacktestResult {
    let returns: Vec<f64> = trades.iter().map(|t| t.profit).collect();
    let wins = returns.iter().filter(|r| **r > 0.0).count();

    let total_gain: f64 = returns.iter().filter(|r| **r > 0.0).sum();
    let total_loss: f64 = returns.iter().filter(|r| **r < 0.0).map(|r| r.abs()).sum();
    let profit_factor = if trades.is_empty() {
        f64::NAN
    } else if total_loss == 0.0 {
        f64::INFINITY
    } else {
        total_gain / total_loss
    };

    let volatility = stats::volatility(&returns);

    BacktestResult {
        strategy_name: strategy_name.to_string(),
        pool_id: pool_id.to_string(),
        win_rate: wins as f64 / trades.len() as f64,
        sharpe_ratio: stats::sharpe_ratio(&returns, volatility),
        max_drawdown: stats::max_drawdown(&returns),
        volatility,
        profit_factor,
        trades: trades.len(),
        returns,
        computed_at: Utc::now(),
    }
}

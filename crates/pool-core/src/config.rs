//! Configuration for the poolwatch system.

use serde::Deserialize;
use std::env;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub pipeline: PipelineConfig,
}

/// Tunables for backtesting and strategy screening.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// How far back a backtest reaches, in days.
    pub backtest_period_days: i64,
    /// Window of buffered history the risk manager's strategy drawdown
    /// check looks at, in hours.
    pub volatility_window_hours: i64,
    /// Minimum pool liquidity (USD) for a pool to be worth screening.
    /// Consumed by the host's pool-selection layer, not enforced here.
    pub min_liquidity_usd: f64,
    /// Minimum 24h volume (USD) for a pool to be worth screening.
    /// Consumed by the host's pool-selection layer, not enforced here.
    pub min_volume_usd: f64,
}

/// Tunables for the live data pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// How long buffered data points are retained, in days.
    pub retention_days: i64,
    /// Cadence at which the host's collector is expected to call
    /// `ingest`, in seconds. The pipeline itself schedules nothing.
    pub update_interval_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            backtest_period_days: 30,
            volatility_window_hours: 24,
            min_liquidity_usd: 100_000.0,
            min_volume_usd: 10_000.0,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retention_days: 90,
            update_interval_secs: 3600,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        Self {
            analysis: AnalysisConfig {
                backtest_period_days: env_parse(
                    "BACKTEST_PERIOD_DAYS",
                    defaults.analysis.backtest_period_days,
                ),
                volatility_window_hours: env_parse(
                    "VOLATILITY_WINDOW_HOURS",
                    defaults.analysis.volatility_window_hours,
                ),
                min_liquidity_usd: env_parse(
                    "MIN_LIQUIDITY_USD",
                    defaults.analysis.min_liquidity_usd,
                ),
                min_volume_usd: env_parse("MIN_VOLUME_USD", defaults.analysis.min_volume_usd),
            },
            pipeline: PipelineConfig {
                retention_days: env_parse("DATA_RETENTION_DAYS", defaults.pipeline.retention_days),
                update_interval_secs: env_parse(
                    "DATA_UPDATE_INTERVAL_SECS",
                    defaults.pipeline.update_interval_secs,
                ),
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

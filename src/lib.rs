//! Poolwatch: strategy backtesting and risk monitoring for liquidity pools.
//!
//! This is the root crate tying the workspace together for integration
//! tests. For actual functionality, use the individual crates directly:
//!
//! - `pool-core`: domain types, statistics helpers, event bus
//! - `data-pipeline`: per-pool data buffering and anomaly detection
//! - `backtester`: historical simulation and performance metrics
//! - `risk-manager`: threshold checks and risk alerting

pub use backtester as backtest;
pub use data_pipeline as pipeline;
pub use pool_core as core;
pub use risk_manager as risk;

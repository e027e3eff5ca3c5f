//! Backtester
//!
//! Replays historical price series through a strategy's signal rule,
//! producing a trade ledger and summary statistics.
//!
//! # Example
//!
//! ```ignore
//! use backtester::{Backtester, InMemoryHistory};
//! use pool_core::config::AnalysisConfig;
//! use pool_core::types::{RiskLevel, Strategy};
//!
//! let history = InMemoryHistory::new();
//! let backtester = Backtester::new(history, &AnalysisConfig::default());
//!
//! let strategy = Strategy::momentum("mom", RiskLevel::Medium, 0.05, -0.05, 0.5);
//! let result = backtester.backtest(&strategy, "0xpool").await?;
//! println!("win rate: {:.2}", result.win_rate);
//! ```

pub mod data_source;
pub mod signal;
pub mod simulator;

pub use data_source::{HistoricalDataSource, InMemoryHistory};
pub use signal::{generate_signal, Signal};
pub use simulator::{calculate_metrics, simulate_strategy, Backtester};

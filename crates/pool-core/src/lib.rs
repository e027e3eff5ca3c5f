//! Pool Core Library
//!
//! Shared domain types, configuration, return-series statistics, and the
//! event bus for the poolwatch system.

pub mod bus;
pub mod config;
pub mod error;
pub mod stats;
pub mod types;

pub use bus::{EventBus, MarketEvent};
pub use error::{Error, Result};

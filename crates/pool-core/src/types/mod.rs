//! Core domain types for the poolwatch system.

pub mod alert;
pub mod market;
pub mod strategy;
pub mod trade;

pub use alert::*;
pub use market::*;
pub use strategy::*;
pub use trade::*;

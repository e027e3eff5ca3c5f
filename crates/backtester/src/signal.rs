//! Signal generation from strategy parameters.

use pool_core::types::{MarketSample, Strategy};

/// Trading signal for a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// Evaluate a strategy's signal rule on a series prefix.
///
/// Only the momentum indicator is implemented: single-step price change
/// against the `buyThreshold`/`sellThreshold` parameters. Anything else —
/// unknown indicator, missing indicator, missing thresholds, or fewer than
/// two samples — holds. An all-hold stream is a silent no-op, not an
/// error.
pub fn generate_signal(strategy: &Strategy, window: &[MarketSample]) -> Signal {
    let [.., previous, current] = window else {
        return Signal::Hold;
    };

    if strategy.param_str("indicator") == Some("momentum") {
        let momentum = (current.price - previous.price) / previous.price;
        if let Some(buy_threshold) = strategy.param_f64("buyThreshold") {
            if momentum > buy_threshold {
                return Signal::Buy;
            }
        }
        if let Some(sell_threshold) = strategy.param_f64("sellThreshold") {
            if momentum < sell_threshold {
                return Signal::Sell;
            }
        }
    }

    Signal::Hold
}

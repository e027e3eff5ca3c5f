//! Return-series statistics shared by the backtester and risk manager.
//!
//! Degenerate inputs deliberately produce IEEE-754 degenerate values
//! instead of errors: the mean (and therefore volatility and Sharpe) of an
//! empty series is NaN. Callers treat these as defined failure modes.

/// Nominal annual risk-free rate used by the Sharpe ratio. Applied to the
/// raw mean return without annualizing; downstream consumers depend on
/// this exact formula.
pub const RISK_FREE_RATE: f64 = 0.02;

/// Arithmetic mean. NaN for an empty series.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Per-step simple returns of a price series: `(p[i] - p[i-1]) / p[i-1]`.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

/// Population standard deviation. NaN for an empty series.
pub fn volatility(returns: &[f64]) -> f64 {
    let m = mean(returns);
    let mean_sq_dev =
        returns.iter().map(|r| (r - m).powi(2)).sum::<f64>() / returns.len() as f64;
    mean_sq_dev.sqrt()
}

/// Sharpe ratio against the fixed nominal risk-free rate.
///
/// Zero volatility yields ±infinity, NaN inputs propagate.
pub fn sharpe_ratio(returns: &[f64], volatility: f64) -> f64 {
    (mean(returns) - RISK_FREE_RATE) / volatility
}

/// Maximum peak-to-trough decline of the compounded return curve.
///
/// The curve starts at 1 and is multiplied by `(1 + ret)` at each step;
/// drawdown at each step is `(peak - cum) / peak`. Always in `[0, 1]` for
/// returns above -100%, and exactly 0 when no return is negative.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd: f64 = 0.0;
    let mut cum: f64 = 1.0;

    for ret in returns {
        cum *= 1.0 + ret;
        if cum > peak {
            peak = cum;
        }
        let drawdown = (peak - cum) / peak;
        if drawdown > max_dd {
            max_dd = drawdown;
        }
    }

    max_dd
}

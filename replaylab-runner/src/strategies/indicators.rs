//! Indicator series over close prices.
//!
//! Every function returns one value per input, NaN until enough history
//! exists. The value at index `t` depends only on inputs at or before `t`.

/// Trading days per year used to annualize volatility.
pub const TRADING_DAYS: f64 = 252.0;

/// Simple moving average.
///
/// First valid value at index `window - 1`. A NaN anywhere in the window
/// yields NaN.
pub fn sma(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }
    for i in (window - 1)..n {
        let slice = &values[(i + 1 - window)..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = slice.iter().sum::<f64>() / window as f64;
    }
    result
}

/// Log returns `ln(c[t] / c[t-1])`. Index 0 is NaN.
pub fn log_returns(closes: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; closes.len()];
    for i in 1..closes.len() {
        result[i] = (closes[i] / closes[i - 1]).ln();
    }
    result
}

/// Rolling standard deviation with `ddof` degrees of freedom removed.
pub fn rolling_std(values: &[f64], window: usize, ddof: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || window <= ddof || n < window {
        return result;
    }
    for i in (window - 1)..n {
        let slice = &values[(i + 1 - window)..=i];
        if slice.iter().any(|v| !v.is_finite()) {
            continue;
        }
        let mean = slice.iter().sum::<f64>() / window as f64;
        let ss: f64 = slice.iter().map(|v| (v - mean).powi(2)).sum();
        result[i] = (ss / (window - ddof) as f64).sqrt();
    }
    result
}

/// Annualized rolling volatility of log returns.
///
/// First valid value at index `window` (the first return is undefined).
pub fn annualized_volatility(closes: &[f64], window: usize, ddof: usize) -> Vec<f64> {
    rolling_std(&log_returns(closes), window, ddof)
        .into_iter()
        .map(|v| v * TRADING_DAYS.sqrt())
        .collect()
}

/// Relative Strength Index with Wilder smoothing (`alpha = 1 / window`).
///
/// Averages are seeded with the first price change and become valid once
/// `window` changes have been observed, so the first value lands at index
/// `window`. `eps` keeps the ratio finite when there are no losses.
pub fn wilder_rsi(closes: &[f64], window: usize, eps: f64) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < 2 {
        return result;
    }
    let alpha = 1.0 / window as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..n {
        let change = closes[i] - closes[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        if i == 1 {
            avg_gain = gain;
            avg_loss = loss;
        } else {
            avg_gain = (1.0 - alpha) * avg_gain + alpha * gain;
            avg_loss = (1.0 - alpha) * avg_loss + alpha * loss;
        }
        if i >= window {
            let rs = avg_gain / (avg_loss + eps);
            result[i] = 100.0 - 100.0 / (1.0 + rs);
        }
    }
    result
}

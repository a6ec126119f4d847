//! Performance metrics — pure functions over a log-return series.
//!
//! Every metric is a pure function: return series in, scalar out. Non-finite
//! returns are dropped before any computation. Degenerate inputs produce NaN or
//! infinity rather than a silent zero.

use serde::{Deserialize, Serialize};

/// Explicit parameters for metric computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Annual risk-free rate as a simple fraction (0.02 = 2%).
    pub risk_free_annual: f64,
    /// Return periods per year (252 for daily bars).
    pub periods_per_year: f64,
    /// Per-period target return for Sortino.
    pub sortino_target: f64,
    /// Per-period threshold for Omega.
    pub omega_threshold: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            risk_free_annual: 0.0,
            periods_per_year: 252.0,
            sortino_target: 0.0,
            omega_threshold: 0.0,
        }
    }
}

/// Portfolio-level risk/return statistics for one return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(with = "crate::serde_float")]
    pub sharpe: f64,
    #[serde(with = "crate::serde_float")]
    pub sortino: f64,
    #[serde(with = "crate::serde_float")]
    pub omega: f64,
    #[serde(with = "crate::serde_float")]
    pub cagr: f64,
    #[serde(with = "crate::serde_float")]
    pub calmar: f64,
    #[serde(with = "crate::serde_float")]
    pub max_drawdown: f64,
}

impl PerformanceMetrics {
    /// Compute every metric from a log-return series.
    pub fn compute(log_returns: &[f64], config: &MetricsConfig) -> Self {
        let r = finite_returns(log_returns);
        Self {
            sharpe: sharpe(&r, config),
            sortino: sortino(&r, config),
            omega: omega(&r, config),
            cagr: cagr(&r, config),
            calmar: calmar(&r, config),
            max_drawdown: max_drawdown(&r),
        }
    }
}

/// Drop NaN and infinite values, keeping order.
pub fn finite_returns(returns: &[f64]) -> Vec<f64> {
    returns.iter().copied().filter(|r| r.is_finite()).collect()
}

/// Annualized Sharpe ratio.
///
/// `sqrt(P) * mean(r - rf) / std(r - rf)` with sample standard deviation and
/// `rf = ln(1 + rf_annual) / P`.
pub fn sharpe(log_returns: &[f64], config: &MetricsConfig) -> f64 {
    let rf = (1.0 + config.risk_free_annual).ln() / config.periods_per_year;
    let excess: Vec<f64> = log_returns.iter().map(|r| r - rf).collect();
    let per_period = mean(&excess) / sample_std(&excess);
    config.periods_per_year.sqrt() * per_period
}

/// Annualized Sortino ratio. NaN when there is no downside deviation.
pub fn sortino(log_returns: &[f64], config: &MetricsConfig) -> f64 {
    let target = config.sortino_target;
    let downside: Vec<f64> = log_returns
        .iter()
        .map(|r| (r - target).min(0.0).powi(2))
        .collect();
    let downside_dev = mean(&downside).sqrt();
    if downside_dev == 0.0 {
        return f64::NAN;
    }
    config.periods_per_year.sqrt() * (mean(log_returns) - target) / downside_dev
}

/// Omega ratio: gains above threshold over losses below it. +inf with no losses.
pub fn omega(log_returns: &[f64], config: &MetricsConfig) -> f64 {
    let threshold = config.omega_threshold;
    let gains: f64 = log_returns.iter().map(|r| (r - threshold).max(0.0)).sum();
    let losses: f64 = log_returns.iter().map(|r| (threshold - r).max(0.0)).sum();
    if losses == 0.0 {
        return f64::INFINITY;
    }
    gains / losses
}

/// Growth-of-one curve implied by a log-return series.
pub fn growth_curve(log_returns: &[f64]) -> Vec<f64> {
    let mut level = 1.0;
    log_returns
        .iter()
        .map(|r| {
            level *= r.exp();
            level
        })
        .collect()
}

/// Maximum drawdown as a non-positive fraction (-0.15 = 15% drawdown).
///
/// NaN for an empty series.
pub fn max_drawdown(log_returns: &[f64]) -> f64 {
    let curve = growth_curve(log_returns);
    if curve.is_empty() {
        return f64::NAN;
    }
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for eq in curve {
        peak = peak.max(eq);
        worst = worst.min(eq / peak - 1.0);
    }
    worst
}

/// Compound annual growth rate. NaN for one period or fewer.
pub fn cagr(log_returns: &[f64], config: &MetricsConfig) -> f64 {
    if log_returns.len() <= 1 {
        return f64::NAN;
    }
    let years = log_returns.len() as f64 / config.periods_per_year;
    let final_level: f64 = log_returns.iter().sum::<f64>().exp();
    final_level.powf(1.0 / years) - 1.0
}

/// CAGR over absolute max drawdown. NaN when there was no drawdown.
pub fn calmar(log_returns: &[f64], config: &MetricsConfig) -> f64 {
    let mdd = max_drawdown(log_returns).abs();
    if mdd == 0.0 {
        return f64::NAN;
    }
    cagr(log_returns, config) / mdd
}

/// Convert an equity curve to log returns (one fewer element), dropping non-finite values.
pub fn log_returns_from_equity(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .map(|w| (w[1] / w[0]).ln())
        .filter(|r| r.is_finite())
        .collect()
}

// ─── Helpers ────────────────────────────────────────────────────────

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> MetricsConfig {
        MetricsConfig::default()
    }

    #[test]
    fn finite_filter_drops_nan_and_inf() {
        let r = finite_returns(&[0.01, f64::NAN, f64::INFINITY, -0.02, f64::NEG_INFINITY]);
        assert_eq!(r, vec![0.01, -0.02]);
    }

    #[test]
    fn sharpe_matches_hand_computation() {
        let r = [0.01, -0.01, 0.02, 0.0];
        let m = 0.005;
        let var = ((0.005f64).powi(2) + (0.015f64).powi(2) + (0.015f64).powi(2) + (0.005f64).powi(2)) / 3.0;
        let expected = 252f64.sqrt() * m / var.sqrt();
        assert!((sharpe(&r, &cfg()) - expected).abs() < 1e-10);
    }

    #[test]
    fn sharpe_of_single_return_is_nan() {
        assert!(sharpe(&[0.01], &cfg()).is_nan());
    }

    #[test]
    fn sortino_without_downside_is_nan() {
        assert!(sortino(&[0.01, 0.02], &cfg()).is_nan());
    }

    #[test]
    fn sortino_uses_full_length_downside_mean() {
        let r = [0.02, -0.02];
        // downside mean of squares = (0 + 0.0004)/2 = 0.0002
        let expected = 252f64.sqrt() * 0.0 / 0.0002f64.sqrt();
        assert!((sortino(&r, &cfg()) - expected).abs() < 1e-12);
    }

    #[test]
    fn omega_without_losses_is_infinite() {
        assert_eq!(omega(&[0.01, 0.0], &cfg()), f64::INFINITY);
        assert!((omega(&[0.03, -0.01], &cfg()) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn max_drawdown_peak_to_trough() {
        // levels: 1.1, 0.88, 0.968
        let r = [1.1f64.ln(), 0.8f64.ln(), 1.1f64.ln()];
        assert!((max_drawdown(&r) - (-0.2)).abs() < 1e-12);
        assert_eq!(max_drawdown(&[0.01, 0.02]), 0.0);
        assert!(max_drawdown(&[]).is_nan());
    }

    #[test]
    fn cagr_over_one_year_equals_total_growth() {
        let per = (1.21f64).ln() / 252.0;
        let r = vec![per; 252];
        assert!((cagr(&r, &cfg()) - 0.21).abs() < 1e-9);
        assert!(cagr(&[0.1], &cfg()).is_nan());
    }

    #[test]
    fn calmar_nan_without_drawdown() {
        assert!(calmar(&[0.01, 0.01, 0.01], &cfg()).is_nan());
    }

    #[test]
    fn compute_filters_non_finite_values() {
        let with_nan = PerformanceMetrics::compute(&[0.01, f64::NAN, -0.005, 0.002], &cfg());
        let clean = PerformanceMetrics::compute(&[0.01, -0.005, 0.002], &cfg());
        assert_eq!(with_nan, clean);
    }

    #[test]
    fn equity_to_log_returns() {
        let r = log_returns_from_equity(&[100.0, 110.0, 0.0, 121.0]);
        // 110/100 finite; 0/110 -> ln 0 = -inf dropped; 121/0 -> inf dropped
        assert_eq!(r.len(), 1);
        assert!((r[0] - 1.1f64.ln()).abs() < 1e-12);
    }
}

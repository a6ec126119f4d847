//! Strategy vs buy-and-hold comparison.
//!
//! The benchmark starts from the strategy's first equity point. Without costs
//! it simply scales by `close / close₀`; with costs it buys whole units at a
//! slipped entry price after one commission and carries the leftover cash.

use chrono::NaiveDateTime;
use replaylab_core::metrics::log_returns_from_equity;
use replaylab_core::{BacktestResult, BarSource, InstrumentId, MetricsConfig, PerformanceMetrics};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BenchmarkError {
    #[error("no bars for symbol '{0}'")]
    UnknownSymbol(String),

    #[error("backtest result is empty")]
    EmptyResult,
}

/// Side-by-side curves and metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub symbol: String,
    pub timestamps: Vec<NaiveDateTime>,
    pub strategy_equity: Vec<f64>,
    pub benchmark_equity: Vec<f64>,
    pub strategy_metrics: PerformanceMetrics,
    pub benchmark_metrics: PerformanceMetrics,
}

/// Compare a finished run against holding `symbol` from its first bar.
///
/// The strategy curve is truncated to the symbol's bar count when the run
/// covered more instruments than just `symbol`.
pub fn compare_to_buy_and_hold(
    result: &BacktestResult,
    source: &dyn BarSource,
    symbol: &str,
    commission_per_order: f64,
    slippage_bps: f64,
    metrics: &MetricsConfig,
) -> Result<Comparison, BenchmarkError> {
    let id = InstrumentId::from(symbol);
    let bars = source.history_for(&id);
    if bars.is_empty() {
        return Err(BenchmarkError::UnknownSymbol(symbol.to_string()));
    }
    let Some(&initial) = result.equity_curve.first() else {
        return Err(BenchmarkError::EmptyResult);
    };

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let timestamps: Vec<NaiveDateTime> = bars.iter().map(|b| b.timestamp).collect();
    let benchmark_equity =
        buy_and_hold_equity(&closes, initial, commission_per_order, slippage_bps);

    let n = result.equity_curve.len().min(closes.len());
    let strategy_equity = result.equity_curve[..n].to_vec();

    let strategy_metrics =
        PerformanceMetrics::compute(&log_returns_from_equity(&strategy_equity), metrics);
    let benchmark_metrics =
        PerformanceMetrics::compute(&log_returns_from_equity(&benchmark_equity), metrics);

    Ok(Comparison {
        symbol: symbol.to_string(),
        timestamps,
        strategy_equity,
        benchmark_equity,
        strategy_metrics,
        benchmark_metrics,
    })
}

/// Buy-and-hold equity path over `closes`.
pub fn buy_and_hold_equity(
    closes: &[f64],
    initial: f64,
    commission_per_order: f64,
    slippage_bps: f64,
) -> Vec<f64> {
    let Some(&base) = closes.first() else {
        return Vec::new();
    };
    if commission_per_order == 0.0 && slippage_bps == 0.0 {
        return closes.iter().map(|c| initial * c / base).collect();
    }
    let entry_price = base * (1.0 + slippage_bps / 10_000.0);
    let cash = (initial - commission_per_order).max(0.0);
    let shares = (cash / entry_price).floor();
    let leftover = cash - shares * entry_price;
    closes.iter().map(|c| shares * c + leftover).collect()
}

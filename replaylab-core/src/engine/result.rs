//! Immutable snapshot returned by a completed run.

use crate::domain::Fill;
use crate::strategy::RunReport;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Curves, fills, and the strategy's report for one run.
///
/// `equity_curve`, `return_curve`, and `timestamps` always share a length:
/// one entry per processed bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    #[serde(with = "crate::serde_float::vec")]
    pub equity_curve: Vec<f64>,
    #[serde(with = "crate::serde_float::vec")]
    pub return_curve: Vec<f64>,
    pub timestamps: Vec<NaiveDateTime>,
    pub fills: Vec<Fill>,
    pub fill_count: usize,
    pub report: Option<RunReport>,
}

impl BacktestResult {
    pub fn is_empty(&self) -> bool {
        self.equity_curve.is_empty()
    }

    pub fn final_equity(&self) -> Option<f64> {
        self.equity_curve.last().copied()
    }

    /// Total fees paid across all fills.
    pub fn total_fees(&self) -> f64 {
        self.fills.iter().map(|f| f.fee).sum()
    }
}

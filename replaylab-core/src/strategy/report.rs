//! End-of-run report: trade summary plus portfolio metrics.

use super::journal::TradeJournal;
use crate::domain::TradeRecord;
use crate::ledger::Ledger;
use crate::metrics::{MetricsConfig, PerformanceMetrics};
use serde::{Deserialize, Serialize};

/// Aggregate statistics over closed trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSummary {
    pub trade_count: usize,
    /// Fraction of trades with positive PnL. 0.0 with no trades.
    pub win_rate: f64,
    /// Mean PnL of winners. 0.0 with no winners.
    pub average_win: f64,
    /// Mean PnL of losers (negative). 0.0 with no losers.
    pub average_loss: f64,
    /// Mean holding period in calendar days.
    pub average_holding_period: f64,
}

impl TradeSummary {
    pub fn from_trades(trades: &[TradeRecord]) -> Self {
        let wins: Vec<f64> = trades
            .iter()
            .filter(|t| t.is_winner())
            .map(|t| t.realized_pnl)
            .collect();
        let losses: Vec<f64> = trades
            .iter()
            .filter(|t| t.is_loser())
            .map(|t| t.realized_pnl)
            .collect();
        let holding: Vec<f64> = trades.iter().map(|t| t.holding_periods as f64).collect();

        let win_rate = if trades.is_empty() {
            0.0
        } else {
            wins.len() as f64 / trades.len() as f64
        };

        Self {
            trade_count: trades.len(),
            win_rate,
            average_win: mean_or_zero(&wins),
            average_loss: mean_or_zero(&losses),
            average_holding_period: mean_or_zero(&holding),
        }
    }
}

/// Combined report produced by a strategy's `finalize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub summary: TradeSummary,
    pub metrics: PerformanceMetrics,
}

impl RunReport {
    /// Build the default report from a journal and the ledger's return curve.
    pub fn from_journal(journal: &TradeJournal, ledger: &Ledger, config: &MetricsConfig) -> Self {
        Self {
            summary: TradeSummary::from_trades(journal.trades()),
            metrics: PerformanceMetrics::compute(ledger.return_curve(), config),
        }
    }

    /// Portfolio metrics only, for strategies that keep no journal.
    pub fn from_ledger(ledger: &Ledger, config: &MetricsConfig) -> Self {
        Self {
            summary: TradeSummary::from_trades(&[]),
            metrics: PerformanceMetrics::compute(ledger.return_curve(), config),
        }
    }
}

fn mean_or_zero(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

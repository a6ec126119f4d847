//! Strategy contract — the per-bar decision unit driven by the engine.
//!
//! A strategy sees the current bar, the bars delivered so far, and a read-only
//! ledger, and answers with zero or more order intents. Fill handling and the
//! end-of-run report have default implementations built on [`TradeJournal`].

pub mod buy_and_hold;
pub mod journal;
pub mod report;

pub use buy_and_hold::BuyAndHold;
pub use journal::{OpenLot, TradeJournal};
pub use report::{RunReport, TradeSummary};

use crate::data::BarSource;
use crate::domain::{Bar, Fill, OrderIntent};
use crate::ledger::Ledger;
use crate::metrics::MetricsConfig;
use thiserror::Error;

/// Failure raised from a strategy hook. Always fatal to the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("invalid strategy state: {0}")]
    Invalid(String),

    #[error("missing data: {0}")]
    MissingData(String),

    #[error("{0}")]
    Other(String),
}

/// Trait for backtestable strategies.
///
/// Only `on_bar` is required. `on_bar` must decide using data with timestamps
/// at or before the current bar; the engine only hands it the delivered prefix.
pub trait Strategy: Send {
    /// Human-readable name (e.g., "buy_and_hold").
    fn name(&self) -> &str;

    /// One-time hook before the first bar. Must not emit orders.
    fn prepare(&mut self, _source: &dyn BarSource) -> Result<(), StrategyError> {
        Ok(())
    }

    /// Decide on the current bar. An empty vector means no action.
    fn on_bar(
        &mut self,
        bar: &Bar,
        history: &[Bar],
        ledger: &Ledger,
    ) -> Result<Vec<OrderIntent>, StrategyError>;

    /// React to a fill already applied to the ledger. Defaults to FIFO journaling.
    fn on_fill(&mut self, fill: &Fill, _ledger: &Ledger) -> Result<(), StrategyError> {
        if let Some(journal) = self.journal_mut() {
            journal.record_fill(fill);
        }
        Ok(())
    }

    /// Called once after the last bar.
    ///
    /// The default builds a [`RunReport`] from the journal. Strategies that
    /// keep no journal still get portfolio metrics with an empty trade summary.
    fn finalize(
        &mut self,
        ledger: &Ledger,
        metrics: &MetricsConfig,
    ) -> Result<Option<RunReport>, StrategyError> {
        let report = match self.journal_mut() {
            Some(journal) => RunReport::from_journal(journal, ledger, metrics),
            None => RunReport::from_ledger(ledger, metrics),
        };
        Ok(Some(report))
    }

    /// The journal used by the default `on_fill` and `finalize`.
    fn journal_mut(&mut self) -> Option<&mut TradeJournal> {
        None
    }
}

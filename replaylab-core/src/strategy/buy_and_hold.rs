//! Buy-and-hold: one entry on the first bar of its instrument, then nothing.

use super::{Strategy, StrategyError, TradeJournal};
use crate::domain::{Bar, InstrumentId, OrderIntent};
use crate::ledger::Ledger;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct BuyAndHold {
    instrument: InstrumentId,
    /// Fixed size; `None` spends all available cash at the first close.
    shares: Option<f64>,
    entered: bool,
    journal: TradeJournal,
}

impl BuyAndHold {
    /// Spend all cash at the first close.
    pub fn new(instrument: impl Into<InstrumentId>) -> Self {
        Self {
            instrument: instrument.into(),
            shares: None,
            entered: false,
            journal: TradeJournal::new(),
        }
    }

    /// Buy a fixed number of units at the first close.
    pub fn with_shares(instrument: impl Into<InstrumentId>, shares: f64) -> Self {
        Self {
            shares: Some(shares),
            ..Self::new(instrument)
        }
    }

    pub fn journal(&self) -> &TradeJournal {
        &self.journal
    }
}

impl Strategy for BuyAndHold {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn on_bar(
        &mut self,
        bar: &Bar,
        _history: &[Bar],
        ledger: &Ledger,
    ) -> Result<Vec<OrderIntent>, StrategyError> {
        if self.entered || bar.instrument != self.instrument {
            return Ok(Vec::new());
        }
        self.entered = true;

        let quantity = match self.shares {
            Some(shares) => shares,
            None => ledger.cash() / bar.close,
        };
        if !quantity.is_finite() || quantity < 1.0 {
            debug!(instrument = %self.instrument, quantity, "buy_and_hold: cannot afford one unit, staying flat");
            return Ok(Vec::new());
        }
        Ok(vec![OrderIntent::buy(self.instrument.clone(), quantity)])
    }

    fn journal_mut(&mut self) -> Option<&mut TradeJournal> {
        Some(&mut self.journal)
    }
}

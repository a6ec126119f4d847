//! Portfolio ledger — cash, integer positions, and the mark-to-market curves.
//!
//! The ledger is the single owner of cash and positions. Positions change only
//! through [`Ledger::apply_fill`]. The accounting identity holds at every mark:
//! `equity == cash + Σ(position_qty × last_price)`, with instruments that have
//! no known price contributing zero.
//!
//! Cash is allowed to go negative. There is no solvency or margin check; a
//! strategy that overdraws simply carries negative cash into the next mark.

use crate::domain::{Fill, InstrumentId};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Default starting cash when none is given.
pub const DEFAULT_INITIAL_CASH: f64 = 100_000.0;

/// Cash, positions, equity curve, and log-return curve for one run.
#[derive(Debug, Clone)]
pub struct Ledger {
    initial_cash: f64,
    cash: f64,
    positions: BTreeMap<InstrumentId, i64>,
    equity_curve: Vec<f64>,
    return_curve: Vec<f64>,
    fees_paid: f64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_CASH)
    }
}

impl Ledger {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            initial_cash,
            cash: initial_cash,
            positions: BTreeMap::new(),
            equity_curve: Vec::new(),
            return_curve: Vec::new(),
            fees_paid: 0.0,
        }
    }

    /// Debit `signed_quantity_delta × price + fee` from cash and move the position.
    ///
    /// A positive delta is a purchase. No cash sufficiency check is made.
    /// A position that would leave the `i64` range saturates at the bound.
    pub fn apply_fill(
        &mut self,
        instrument: &InstrumentId,
        signed_quantity_delta: i64,
        price: f64,
        fee: f64,
    ) {
        self.cash -= signed_quantity_delta as f64 * price + fee;
        self.fees_paid += fee;
        let position = self.positions.entry(instrument.clone()).or_insert(0);
        *position = match position.checked_add(signed_quantity_delta) {
            Some(next) => next,
            None => {
                warn!(
                    %instrument,
                    position = *position,
                    delta = signed_quantity_delta,
                    "position overflow, saturating"
                );
                position.saturating_add(signed_quantity_delta)
            }
        };
    }

    /// Apply a [`Fill`] using its signed quantity.
    pub fn apply(&mut self, fill: &Fill) {
        self.apply_fill(&fill.instrument, fill.signed_quantity(), fill.price, fill.fee);
    }

    /// Equity at the given prices without recording anything.
    pub fn equity_at(&self, prices: &HashMap<InstrumentId, f64>) -> f64 {
        let position_value: f64 = self
            .positions
            .iter()
            .map(|(instrument, &qty)| {
                let price = prices.get(instrument).copied().unwrap_or(0.0);
                qty as f64 * price
            })
            .sum();
        self.cash + position_value
    }

    /// Revalue all positions, append equity and the log return since the last mark.
    ///
    /// The first mark, or any mark following a zero-equity mark, records a return
    /// of exactly 0.0. Negative or non-finite equity ratios yield non-finite
    /// returns, which are kept as-is for downstream filtering.
    pub fn mark_to_market(&mut self, prices: &HashMap<InstrumentId, f64>) -> f64 {
        let equity = self.equity_at(prices);
        let log_return = match self.equity_curve.last() {
            None => 0.0,
            Some(&prev) if prev == 0.0 => 0.0,
            Some(&prev) => (equity / prev).ln(),
        };
        if !equity.is_finite() {
            warn!(equity, cash = self.cash, "non-finite equity at mark-to-market");
        }
        self.equity_curve.push(equity);
        self.return_curve.push(log_return);
        equity
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn fees_paid(&self) -> f64 {
        self.fees_paid
    }

    /// Signed position for an instrument (0 when never traded).
    pub fn position(&self, instrument: &InstrumentId) -> i64 {
        self.positions.get(instrument).copied().unwrap_or(0)
    }

    /// All instruments ever traded, including those now flat.
    pub fn positions(&self) -> &BTreeMap<InstrumentId, i64> {
        &self.positions
    }

    /// Instruments with a non-zero position.
    pub fn open_positions(&self) -> impl Iterator<Item = (&InstrumentId, i64)> {
        self.positions
            .iter()
            .filter(|(_, &qty)| qty != 0)
            .map(|(id, &qty)| (id, qty))
    }

    pub fn equity_curve(&self) -> &[f64] {
        &self.equity_curve
    }

    pub fn return_curve(&self) -> &[f64] {
        &self.return_curve
    }

    /// Most recent marked equity, if any mark has happened.
    pub fn last_equity(&self) -> Option<f64> {
        self.equity_curve.last().copied()
    }

    /// True until the first mark-to-market.
    pub fn is_fresh(&self) -> bool {
        self.equity_curve.is_empty()
    }
}

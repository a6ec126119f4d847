//! SMA trend: long when the previous close is above its moving average.
//!
//! Position size targets an annualized volatility: weight =
//! `vol_target / max(vol, 1e-6)`, clamped to `[0, 2]`. Trades only when the
//! target weight differs from current exposure by at least the rebalance band,
//! and buys never exceed what cash can pay for.

use replaylab_core::{
    Bar, BarSource, InstrumentId, Ledger, OrderIntent, Strategy, StrategyError, TradeJournal,
};

use super::indicators::{annualized_volatility, sma};
use super::{exposure, order_for_delta, MAX_WEIGHT, REBALANCE_BAND, VOL_FLOOR};

#[derive(Debug, Clone, Copy)]
struct Row {
    close: f64,
    sma: f64,
    vol_ann: f64,
}

#[derive(Debug, Clone)]
pub struct SmaTrend {
    instrument: InstrumentId,
    sma_window: usize,
    vol_window: usize,
    vol_target_ann: f64,
    rows: Vec<Row>,
    cursor: usize,
    journal: TradeJournal,
}

impl SmaTrend {
    pub fn new(
        instrument: impl Into<InstrumentId>,
        sma_window: usize,
        vol_window: usize,
        vol_target_ann: f64,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            sma_window,
            vol_window,
            vol_target_ann,
            rows: Vec::new(),
            cursor: 0,
            journal: TradeJournal::new(),
        }
    }

    fn warmup(&self) -> usize {
        self.sma_window.max(self.vol_window).max(1)
    }

    /// Target weight from the previous row. `None` when volatility is unusable.
    fn target_weight(&self, prev: &Row) -> Option<f64> {
        if !prev.vol_ann.is_finite() {
            return None;
        }
        let signal = if prev.close > prev.sma { 1.0 } else { 0.0 };
        let raw = self.vol_target_ann / prev.vol_ann.max(VOL_FLOOR);
        Some((signal * raw).clamp(0.0, MAX_WEIGHT))
    }
}

impl Strategy for SmaTrend {
    fn name(&self) -> &str {
        "sma_trend"
    }

    fn prepare(&mut self, source: &dyn BarSource) -> Result<(), StrategyError> {
        let closes: Vec<f64> = source
            .history_for(&self.instrument)
            .iter()
            .map(|b| b.close)
            .collect();
        let sma_series = sma(&closes, self.sma_window);
        let vol_series = annualized_volatility(&closes, self.vol_window, 1);
        self.rows = closes
            .iter()
            .zip(sma_series)
            .zip(vol_series)
            .map(|((&close, sma), vol_ann)| Row {
                close,
                sma,
                vol_ann,
            })
            .collect();
        self.cursor = 0;
        Ok(())
    }

    fn on_bar(
        &mut self,
        bar: &Bar,
        _history: &[Bar],
        ledger: &Ledger,
    ) -> Result<Vec<OrderIntent>, StrategyError> {
        if bar.instrument != self.instrument {
            return Ok(Vec::new());
        }
        let t = self.cursor;
        self.cursor += 1;
        if t >= self.rows.len() {
            return Err(StrategyError::MissingData(format!(
                "no prepared features for {} at {}",
                self.instrument, bar.timestamp
            )));
        }
        if t < self.warmup() {
            return Ok(Vec::new());
        }

        let Some(w) = self.target_weight(&self.rows[t - 1]) else {
            return Ok(Vec::new());
        };
        let Some((qty, equity, current)) = exposure(ledger, &self.instrument, bar.close) else {
            return Ok(Vec::new());
        };
        if (w - current).abs() < REBALANCE_BAND {
            return Ok(Vec::new());
        }

        let target = (w * equity / bar.close).floor() as i64;
        let mut delta = target - qty;
        if delta > 0 {
            let affordable = (ledger.cash() / bar.close).floor().max(0.0) as i64;
            delta = delta.min(affordable);
        }
        Ok(order_for_delta(&self.instrument, delta).into_iter().collect())
    }

    fn journal_mut(&mut self) -> Option<&mut TradeJournal> {
        Some(&mut self.journal)
    }
}

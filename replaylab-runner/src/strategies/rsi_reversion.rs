//! RSI mean reversion: long below 30, short above 70, flat in between.
//!
//! Weight is volatility targeted and clamped to `[-2, 2]`. The rebalance band
//! only suppresses trades while a position is open. Purchases are capped by
//! affordable units and by the gross position limit; shorts by the limit alone.

use replaylab_core::{
    Bar, BarSource, InstrumentId, Ledger, OrderIntent, Strategy, StrategyError, TradeJournal,
};

use super::indicators::{annualized_volatility, wilder_rsi};
use super::{exposure, order_for_delta, MAX_WEIGHT, REBALANCE_BAND, VOL_FLOOR};

const OVERSOLD: f64 = 30.0;
const OVERBOUGHT: f64 = 70.0;
const RSI_EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct Row {
    rsi: f64,
    vol_ann: f64,
}

#[derive(Debug, Clone)]
pub struct RsiReversion {
    instrument: InstrumentId,
    rsi_window: usize,
    vol_window: usize,
    vol_target_ann: f64,
    rows: Vec<Row>,
    cursor: usize,
    journal: TradeJournal,
}

impl RsiReversion {
    pub fn new(
        instrument: impl Into<InstrumentId>,
        rsi_window: usize,
        vol_window: usize,
        vol_target_ann: f64,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            rsi_window,
            vol_window,
            vol_target_ann,
            rows: Vec::new(),
            cursor: 0,
            journal: TradeJournal::new(),
        }
    }

    fn warmup(&self) -> usize {
        self.rsi_window.max(self.vol_window).max(1)
    }

    fn target_weight(&self, prev: &Row) -> Option<f64> {
        if !prev.vol_ann.is_finite() {
            return None;
        }
        let signal = if prev.rsi < OVERSOLD {
            1.0
        } else if prev.rsi > OVERBOUGHT {
            -1.0
        } else {
            0.0
        };
        let raw = self.vol_target_ann / prev.vol_ann.max(VOL_FLOOR);
        Some((signal * raw).clamp(-MAX_WEIGHT, MAX_WEIGHT))
    }
}

impl Strategy for RsiReversion {
    fn name(&self) -> &str {
        "rsi_reversion"
    }

    fn prepare(&mut self, source: &dyn BarSource) -> Result<(), StrategyError> {
        let closes: Vec<f64> = source
            .history_for(&self.instrument)
            .iter()
            .map(|b| b.close)
            .collect();
        let rsi_series = wilder_rsi(&closes, self.rsi_window, RSI_EPS);
        let vol_series = annualized_volatility(&closes, self.vol_window, 0);
        self.rows = rsi_series
            .into_iter()
            .zip(vol_series)
            .map(|(rsi, vol_ann)| Row {
                rsi,
                // NaN stays NaN so warmup rows remain unusable
                vol_ann: if vol_ann.is_nan() { vol_ann } else { vol_ann.max(VOL_FLOOR) },
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
        if (w - current).abs() < REBALANCE_BAND && current != 0.0 {
            return Ok(Vec::new());
        }

        let target = (w * equity / bar.close).floor() as i64;
        let mut delta = target - qty;
        let affordable = (ledger.cash() / bar.close).floor().max(0.0) as i64;
        let max_position = (equity * MAX_WEIGHT / bar.close).floor() as i64;

        if delta > 0 {
            let room_long = (max_position - qty).max(0);
            delta = delta.min(affordable).min(room_long);
        }
        if delta < 0 {
            delta = delta.max(-max_position - qty);
        }
        Ok(order_for_delta(&self.instrument, delta).into_iter().collect())
    }

    fn journal_mut(&mut self) -> Option<&mut TradeJournal> {
        Some(&mut self.journal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use replaylab_core::{InMemoryBarSource, Side};

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                instrument: InstrumentId::from("SPY"),
                open: c,
                high: c,
                low: c,
                close: c,
            })
            .collect()
    }

    /// Falls with small bounces, so RSI is low but volatility is non-zero.
    fn selloff(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 200.0 - 3.0 * i as f64 + if i % 3 == 0 { 1.0 } else { 0.0 })
            .collect()
    }

    fn rally(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + 3.0 * i as f64 - if i % 3 == 0 { 1.0 } else { 0.0 })
            .collect()
    }

    fn last_orders(s: &mut RsiReversion, data: &[Bar], ledger: &Ledger) -> Vec<OrderIntent> {
        let mut out = Vec::new();
        for bar in data {
            out = s.on_bar(bar, &[], ledger).unwrap();
        }
        out
    }

    #[test]
    fn oversold_goes_long_within_cash() {
        let data = bars(&selloff(12));
        let mut s = RsiReversion::new("SPY", 3, 3, 1.0);
        s.prepare(&InMemoryBarSource::new(data.clone())).unwrap();
        let ledger = Ledger::new(1_000.0);
        let orders = last_orders(&mut s, &data, &ledger);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, Side::Buy);
        let close = data.last().unwrap().close;
        assert!(orders[0].quantity <= (1_000.0 / close).floor());
    }

    #[test]
    fn overbought_goes_short_within_limit() {
        let data = bars(&rally(12));
        let mut s = RsiReversion::new("SPY", 3, 3, 1.0);
        s.prepare(&InMemoryBarSource::new(data.clone())).unwrap();
        let ledger = Ledger::new(1_000.0);
        let orders = last_orders(&mut s, &data, &ledger);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, Side::Sell);
        let close = data.last().unwrap().close;
        assert!(orders[0].quantity <= (1_000.0 * MAX_WEIGHT / close).floor());
    }

    #[test]
    fn flat_through_warmup() {
        let data = bars(&selloff(4));
        let mut s = RsiReversion::new("SPY", 4, 4, 1.0);
        s.prepare(&InMemoryBarSource::new(data.clone())).unwrap();
        let ledger = Ledger::new(1_000.0);
        for bar in &data {
            assert!(s.on_bar(bar, &[], &ledger).unwrap().is_empty());
        }
    }

    #[test]
    fn zero_windows_never_trade() {
        let data = bars(&selloff(4));
        let mut s = RsiReversion::new("SPY", 0, 0, 1.0);
        s.prepare(&InMemoryBarSource::new(data.clone())).unwrap();
        let ledger = Ledger::new(1_000.0);
        for bar in &data {
            assert!(s.on_bar(bar, &[], &ledger).unwrap().is_empty());
        }
    }
}

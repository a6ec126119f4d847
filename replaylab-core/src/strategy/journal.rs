//! Trade journal — FIFO lot matching over fills.
//!
//! Each instrument keeps an ordered queue of open lots. The queue only ever
//! holds lots of one side: an opposing fill consumes the oldest lots first and
//! any remainder opens a new lot on the fill's side. The signed sum of open
//! lots therefore always equals the position implied by the fills.

use crate::domain::{Fill, InstrumentId, LotSide, Side, TradeRecord};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, VecDeque};

/// A still-open entry awaiting an opposing fill.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenLot {
    pub side: LotSide,
    pub qty: i64,
    pub price: f64,
    pub ts: NaiveDateTime,
}

impl OpenLot {
    fn signed_qty(&self) -> i64 {
        match self.side {
            LotSide::Long => self.qty,
            LotSide::Short => -self.qty,
        }
    }
}

/// Per-strategy record of open lots and closed round trips.
#[derive(Debug, Clone, Default)]
pub struct TradeJournal {
    lots: BTreeMap<InstrumentId, VecDeque<OpenLot>>,
    trades: Vec<TradeRecord>,
}

impl TradeJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match a fill against open lots. Returns how many trade records it closed.
    pub fn record_fill(&mut self, fill: &Fill) -> usize {
        let closes = match fill.side {
            Side::Buy => LotSide::Short,
            Side::Sell => LotSide::Long,
        };
        let queue = self.lots.entry(fill.instrument.clone()).or_default();
        let mut remaining = fill.quantity;
        let mut closed = 0;

        while remaining > 0 {
            let Some(lot) = queue.front_mut() else { break };
            if lot.side != closes {
                break;
            }
            let take = remaining.min(lot.qty);
            self.trades.push(close_lot(&fill.instrument, lot, take, fill));
            closed += 1;
            lot.qty -= take;
            remaining -= take;
            if lot.qty == 0 {
                queue.pop_front();
            }
        }

        if remaining > 0 {
            let side = match fill.side {
                Side::Buy => LotSide::Long,
                Side::Sell => LotSide::Short,
            };
            queue.push_back(OpenLot {
                side,
                qty: remaining,
                price: fill.price,
                ts: fill.timestamp,
            });
        }
        closed
    }

    /// Closed round trips in the order they were realized.
    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    /// Signed quantity still open for `instrument` (negative when short).
    pub fn open_quantity(&self, instrument: &InstrumentId) -> i64 {
        self.lots
            .get(instrument)
            .map(|queue| queue.iter().map(OpenLot::signed_qty).sum())
            .unwrap_or(0)
    }

    /// Open lots for `instrument`, oldest first.
    pub fn open_lots(&self, instrument: &InstrumentId) -> impl Iterator<Item = &OpenLot> {
        self.lots.get(instrument).into_iter().flatten()
    }

    pub fn is_flat(&self) -> bool {
        self.lots.values().all(VecDeque::is_empty)
    }
}

fn close_lot(instrument: &InstrumentId, lot: &OpenLot, qty: i64, exit: &Fill) -> TradeRecord {
    let (realized_pnl, return_pct) = match lot.side {
        LotSide::Long => (
            (exit.price - lot.price) * qty as f64,
            exit.price / lot.price - 1.0,
        ),
        LotSide::Short => (
            (lot.price - exit.price) * qty as f64,
            lot.price / exit.price - 1.0,
        ),
    };
    TradeRecord {
        instrument: instrument.clone(),
        side: lot.side,
        entry_ts: lot.ts,
        exit_ts: exit.timestamp,
        entry_price: lot.price,
        exit_price: exit.price,
        qty,
        realized_pnl,
        return_pct,
        holding_periods: (exit.timestamp - lot.ts).num_days(),
    }
}

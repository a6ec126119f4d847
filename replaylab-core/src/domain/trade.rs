//! TradeRecord — one closed (or partially closed) lot.

use super::ids::InstrumentId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Direction of the lot that was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LotSide {
    Long,
    Short,
}

/// A realized round trip produced when an opposing fill consumes an open lot.
///
/// Fees are not part of `realized_pnl`; they are already reflected in ledger cash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub instrument: InstrumentId,
    pub side: LotSide,
    pub entry_ts: NaiveDateTime,
    pub exit_ts: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub qty: i64,
    pub realized_pnl: f64,
    /// Simple return on the lot's entry price.
    pub return_pct: f64,
    /// Whole calendar days between entry and exit.
    pub holding_periods: i64,
}

impl TradeRecord {
    pub fn is_winner(&self) -> bool {
        self.realized_pnl > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.realized_pnl < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn flat_trade_is_neither_winner_nor_loser() {
        let trade = TradeRecord {
            instrument: InstrumentId::from("SPY"),
            side: LotSide::Long,
            entry_ts: ts(2),
            exit_ts: ts(5),
            entry_price: 100.0,
            exit_price: 100.0,
            qty: 10,
            realized_pnl: 0.0,
            return_pct: 0.0,
            holding_periods: 3,
        };
        assert!(!trade.is_winner());
        assert!(!trade.is_loser());
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = TradeRecord {
            instrument: InstrumentId::from("SPY"),
            side: LotSide::Short,
            entry_ts: ts(2),
            exit_ts: ts(9),
            entry_price: 110.0,
            exit_price: 100.0,
            qty: 4,
            realized_pnl: 40.0,
            return_pct: 0.1,
            holding_periods: 7,
        };
        let json = serde_json::to_string(&trade).unwrap();
        let deser: TradeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deser);
    }
}

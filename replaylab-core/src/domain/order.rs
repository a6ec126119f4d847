//! Order intents — a strategy's request to trade, not yet priced.

use super::ids::InstrumentId;
use serde::{Deserialize, Serialize};

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// +1 for buys, -1 for sells.
    pub fn sign(self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

/// How the intent is executed. Only market orders are simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderClass {
    #[default]
    Market,
}

/// A request to buy or sell a quantity of an instrument.
///
/// Created by a strategy on a bar and consumed exactly once by the execution
/// simulator. The quantity may be fractional; execution floors it to whole units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub instrument: InstrumentId,
    pub side: Side,
    pub quantity: f64,
    pub order_class: OrderClass,
}

impl OrderIntent {
    pub fn market(instrument: impl Into<InstrumentId>, side: Side, quantity: f64) -> Self {
        Self {
            instrument: instrument.into(),
            side,
            quantity,
            order_class: OrderClass::Market,
        }
    }

    pub fn buy(instrument: impl Into<InstrumentId>, quantity: f64) -> Self {
        Self::market(instrument, Side::Buy, quantity)
    }

    pub fn sell(instrument: impl Into<InstrumentId>, quantity: f64) -> Self {
        Self::market(instrument, Side::Sell, quantity)
    }
}

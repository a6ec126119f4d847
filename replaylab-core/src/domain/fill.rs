use crate::domain::ids::InstrumentId;
use crate::domain::order::Side;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The realized, priced outcome of executing one order intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub instrument: InstrumentId,
    pub side: Side,
    /// Whole units, always positive.
    pub quantity: i64,
    pub price: f64,
    pub timestamp: NaiveDateTime,
    pub fee: f64,
}

impl Fill {
    /// Position delta implied by this fill: +quantity for buys, -quantity for sells.
    pub fn signed_quantity(&self) -> i64 {
        self.side.sign() * self.quantity
    }

    /// Traded notional before fees.
    pub fn notional(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

//! Domain types for replaylab

pub mod bar;
pub mod fill;
pub mod ids;
pub mod order;
pub mod trade;

pub use bar::Bar;
pub use fill::Fill;
pub use ids::InstrumentId;
pub use order::{OrderClass, OrderIntent, Side};
pub use trade::{LotSide, TradeRecord};

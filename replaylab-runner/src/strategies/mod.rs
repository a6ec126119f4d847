//! Reference strategies and the factory that builds them from config.
//!
//! `BuyAndHold` lives in core; the volatility-targeted strategies live here
//! with the indicator math they share.

pub mod indicators;
pub mod rsi_reversion;
pub mod sma_trend;

pub use rsi_reversion::RsiReversion;
pub use sma_trend::SmaTrend;

use replaylab_core::{BuyAndHold, InstrumentId, Ledger, OrderIntent, Strategy};

use crate::config::StrategyConfig;

/// Gross exposure cap, as a multiple of equity.
pub const MAX_WEIGHT: f64 = 2.0;

/// Minimum weight change that triggers a rebalance.
pub const REBALANCE_BAND: f64 = 0.02;

/// Lower bound on annualized volatility when sizing.
pub const VOL_FLOOR: f64 = 1e-6;

/// Build the strategy a config describes.
pub fn build_strategy(config: &StrategyConfig) -> Box<dyn Strategy> {
    match config {
        StrategyConfig::BuyAndHold { symbol, shares } => match shares {
            Some(shares) => Box::new(BuyAndHold::with_shares(symbol.as_str(), *shares)),
            None => Box::new(BuyAndHold::new(symbol.as_str())),
        },
        StrategyConfig::SmaTrend {
            symbol,
            sma_window,
            vol_window,
            vol_target_ann,
        } => Box::new(SmaTrend::new(
            symbol.as_str(),
            *sma_window,
            *vol_window,
            *vol_target_ann,
        )),
        StrategyConfig::RsiReversion {
            symbol,
            rsi_window,
            vol_window,
            vol_target_ann,
        } => Box::new(RsiReversion::new(
            symbol.as_str(),
            *rsi_window,
            *vol_window,
            *vol_target_ann,
        )),
    }
}

/// Current holding, single-instrument equity, and exposure weight at `close`.
///
/// Equity is cash plus this instrument's position value. `None` when equity
/// is not positive, in which case the strategies stand aside.
pub(crate) fn exposure(
    ledger: &Ledger,
    instrument: &InstrumentId,
    close: f64,
) -> Option<(i64, f64, f64)> {
    let qty = ledger.position(instrument);
    let equity = ledger.cash() + qty as f64 * close;
    if !equity.is_finite() || equity <= 0.0 {
        return None;
    }
    Some((qty, equity, qty as f64 * close / equity))
}

/// Market order for a signed unit delta. Zero is no order.
pub(crate) fn order_for_delta(instrument: &InstrumentId, delta: i64) -> Option<OrderIntent> {
    match delta {
        0 => None,
        d if d > 0 => Some(OrderIntent::buy(instrument.clone(), d as f64)),
        d => Some(OrderIntent::sell(instrument.clone(), d.unsigned_abs() as f64)),
    }
}

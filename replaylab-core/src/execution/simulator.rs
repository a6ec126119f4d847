//! Execution simulator — turns one order intent into exactly one fill or a rejection.
//!
//! Every accepted intent fills completely at the slipped reference price. No
//! volume or liquidity caps are modeled. The result depends only on the intent,
//! the reference price, the timestamp, and the cost configuration.

use super::cost_model::{ExecutionConfig, ExecutionConfigError};
use crate::domain::{Fill, OrderClass, OrderIntent, Side};
use chrono::NaiveDateTime;
use thiserror::Error;

/// Why an intent could not be filled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error("order quantity for {instrument} must be finite and > 0 (got {quantity})")]
    InvalidQuantity { instrument: String, quantity: f64 },

    #[error("order quantity {quantity} for {instrument} is below one whole unit")]
    BelowOneUnit { instrument: String, quantity: f64 },

    #[error("order quantity {quantity} for {instrument} exceeds the largest representable position")]
    QuantityTooLarge { instrument: String, quantity: f64 },

    #[error("reference price for {instrument} must be finite and > 0 (got {price})")]
    InvalidReferencePrice { instrument: String, price: f64 },
}

/// Simulated broker for market intents.
#[derive(Debug, Clone, Default)]
pub struct ExecutionSimulator {
    config: ExecutionConfig,
}

impl ExecutionSimulator {
    pub fn new(config: ExecutionConfig) -> Self {
        Self { config }
    }

    /// Build a simulator directly from raw cost parameters.
    pub fn with_costs(
        slippage_bps: f64,
        commission_per_order: f64,
    ) -> Result<Self, ExecutionConfigError> {
        Ok(Self::new(ExecutionConfig::new(slippage_bps, commission_per_order)?))
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Price and size an intent against `reference_price`.
    ///
    /// Fractional quantities are floored to whole units.
    pub fn execute(
        &self,
        intent: &OrderIntent,
        reference_price: f64,
        timestamp: NaiveDateTime,
    ) -> Result<Fill, ExecutionError> {
        if !intent.quantity.is_finite() || intent.quantity <= 0.0 {
            return Err(ExecutionError::InvalidQuantity {
                instrument: intent.instrument.to_string(),
                quantity: intent.quantity,
            });
        }
        if !reference_price.is_finite() || reference_price <= 0.0 {
            return Err(ExecutionError::InvalidReferencePrice {
                instrument: intent.instrument.to_string(),
                price: reference_price,
            });
        }
        let units = intent.quantity.floor();
        if units < 1.0 {
            return Err(ExecutionError::BelowOneUnit {
                instrument: intent.instrument.to_string(),
                quantity: intent.quantity,
            });
        }
        if units >= i64::MAX as f64 {
            return Err(ExecutionError::QuantityTooLarge {
                instrument: intent.instrument.to_string(),
                quantity: intent.quantity,
            });
        }

        let price = match intent.order_class {
            OrderClass::Market => self
                .config
                .apply_slippage(reference_price, intent.side == Side::Buy),
        };

        Ok(Fill {
            instrument: intent.instrument.clone(),
            side: intent.side,
            quantity: units as i64,
            price,
            timestamp,
            fee: self.config.commission_per_order(),
        })
    }
}

//! Cost model — proportional slippage and a flat per-order commission.
//!
//! Slippage is one-way and directional: buyers pay more, sellers receive less.
//! Commission is a flat fee per order, independent of quantity or notional.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid execution-cost parameters, rejected at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionConfigError {
    #[error("slippage_bps must be finite and >= 0 (got {0})")]
    InvalidSlippage(f64),

    #[error("commission_per_order must be finite and >= 0 (got {0})")]
    InvalidCommission(f64),
}

/// Named cost bundles for quick setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPreset {
    /// No slippage, no commission.
    Frictionless,
    /// 5 bps slippage, $1 per order.
    Retail,
    /// 25 bps slippage, $5 per order.
    Hostile,
}

impl ExecutionPreset {
    pub fn slippage_bps(self) -> f64 {
        match self {
            ExecutionPreset::Frictionless => 0.0,
            ExecutionPreset::Retail => 5.0,
            ExecutionPreset::Hostile => 25.0,
        }
    }

    pub fn commission_per_order(self) -> f64 {
        match self {
            ExecutionPreset::Frictionless => 0.0,
            ExecutionPreset::Retail => 1.0,
            ExecutionPreset::Hostile => 5.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExecutionPreset::Frictionless => "frictionless",
            ExecutionPreset::Retail => "retail",
            ExecutionPreset::Hostile => "hostile",
        }
    }
}

/// Validated execution-cost parameters.
///
/// Only constructible through [`ExecutionConfig::new`] or a preset, so a
/// simulator never sees negative or non-finite costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExecutionConfig {
    slippage_bps: f64,
    commission_per_order: f64,
}

impl ExecutionConfig {
    pub fn new(slippage_bps: f64, commission_per_order: f64) -> Result<Self, ExecutionConfigError> {
        if !slippage_bps.is_finite() || slippage_bps < 0.0 {
            return Err(ExecutionConfigError::InvalidSlippage(slippage_bps));
        }
        if !commission_per_order.is_finite() || commission_per_order < 0.0 {
            return Err(ExecutionConfigError::InvalidCommission(commission_per_order));
        }
        Ok(Self {
            slippage_bps,
            commission_per_order,
        })
    }

    pub fn frictionless() -> Self {
        Self::from_preset(ExecutionPreset::Frictionless)
    }

    pub fn from_preset(preset: ExecutionPreset) -> Self {
        Self {
            slippage_bps: preset.slippage_bps(),
            commission_per_order: preset.commission_per_order(),
        }
    }

    pub fn slippage_bps(&self) -> f64 {
        self.slippage_bps
    }

    pub fn commission_per_order(&self) -> f64 {
        self.commission_per_order
    }

    /// Reference price worsened by slippage in the direction of the trade.
    pub fn apply_slippage(&self, reference_price: f64, is_buy: bool) -> f64 {
        let slip = reference_price * (self.slippage_bps / 10_000.0);
        if is_buy {
            reference_price + slip
        } else {
            reference_price - slip
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self::frictionless()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frictionless_returns_reference_price() {
        let cost = ExecutionConfig::frictionless();
        assert_eq!(cost.apply_slippage(100.0, true), 100.0);
        assert_eq!(cost.apply_slippage(100.0, false), 100.0);
        assert_eq!(cost.commission_per_order(), 0.0);
    }

    #[test]
    fn buy_slippage_increases_price() {
        let cost = ExecutionConfig::new(10.0, 0.0).unwrap();
        // 100 * (1 + 10/10000) = 100.10
        assert!((cost.apply_slippage(100.0, true) - 100.10).abs() < 1e-10);
    }

    #[test]
    fn sell_slippage_decreases_price() {
        let cost = ExecutionConfig::new(10.0, 0.0).unwrap();
        assert!((cost.apply_slippage(100.0, false) - 99.90).abs() < 1e-10);
    }

    #[test]
    fn rejects_negative_slippage() {
        assert_eq!(
            ExecutionConfig::new(-1.0, 0.0),
            Err(ExecutionConfigError::InvalidSlippage(-1.0))
        );
    }

    #[test]
    fn rejects_non_finite_commission() {
        assert!(matches!(
            ExecutionConfig::new(0.0, f64::NAN),
            Err(ExecutionConfigError::InvalidCommission(_))
        ));
        assert!(ExecutionConfig::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn hostile_preset_highest_costs() {
        let frictionless = ExecutionConfig::from_preset(ExecutionPreset::Frictionless);
        let retail = ExecutionConfig::from_preset(ExecutionPreset::Retail);
        let hostile = ExecutionConfig::from_preset(ExecutionPreset::Hostile);

        assert!(hostile.slippage_bps() > retail.slippage_bps());
        assert!(retail.slippage_bps() > frictionless.slippage_bps());
        assert!(hostile.commission_per_order() > retail.commission_per_order());
    }
}

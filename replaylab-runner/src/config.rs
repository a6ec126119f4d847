//! Serializable backtest configuration.
//!
//! A run is fully described by one TOML document: starting cash, where the
//! bars come from, execution costs, the strategy and its parameters, and the
//! metric conventions. Validation happens eagerly so a bad file fails before
//! any data is loaded.

use chrono::NaiveDate;
use replaylab_core::execution::{ExecutionConfig, ExecutionConfigError, ExecutionPreset};
use replaylab_core::ledger::DEFAULT_INITIAL_CASH;
use replaylab_core::MetricsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Errors from loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid execution costs: {0}")]
    Execution(#[from] ExecutionConfigError),

    #[error("failed to fingerprint config: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Everything needed to reproduce one backtest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    #[serde(default = "default_initial_cash")]
    pub initial_cash: f64,
    pub data: DataConfig,
    #[serde(default)]
    pub execution: ExecutionSettings,
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

fn default_initial_cash() -> f64 {
    DEFAULT_INITIAL_CASH
}

impl BacktestConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_cash.is_finite() || self.initial_cash <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "initial_cash must be finite and > 0 (got {})",
                self.initial_cash
            )));
        }
        self.data.validate()?;
        self.execution.to_config()?;
        self.strategy.validate()?;

        let m = &self.metrics;
        if !m.periods_per_year.is_finite() || m.periods_per_year <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "metrics.periods_per_year must be > 0 (got {})",
                m.periods_per_year
            )));
        }
        if !m.risk_free_annual.is_finite() || m.risk_free_annual <= -1.0 {
            return Err(ConfigError::Invalid(format!(
                "metrics.risk_free_annual must be > -1 (got {})",
                m.risk_free_annual
            )));
        }
        Ok(())
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

/// Where bars come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataConfig {
    /// Long-form CSV: `datetime,symbol,open,high,low,close`.
    Csv { path: PathBuf },

    /// Parquet with `timestamp` in epoch milliseconds.
    Parquet { path: PathBuf },

    /// Seeded random walk per symbol, weekdays only. Development use.
    Synthetic {
        symbols: Vec<String>,
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl DataConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            DataConfig::Synthetic {
                symbols,
                start,
                end,
            } => {
                if symbols.is_empty() {
                    return Err(ConfigError::Invalid(
                        "synthetic data needs at least one symbol".into(),
                    ));
                }
                if start > end {
                    return Err(ConfigError::Invalid(format!(
                        "synthetic start {start} is after end {end}"
                    )));
                }
                Ok(())
            }
            DataConfig::Csv { path } | DataConfig::Parquet { path } => {
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::Invalid("data path is empty".into()));
                }
                Ok(())
            }
        }
    }
}

/// Execution costs: a named preset or explicit values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ExecutionSettings {
    Preset {
        preset: ExecutionPreset,
    },
    Explicit {
        slippage_bps: f64,
        commission_per_order: f64,
    },
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        ExecutionSettings::Preset {
            preset: ExecutionPreset::Frictionless,
        }
    }
}

impl ExecutionSettings {
    /// Resolve to a validated cost model.
    pub fn to_config(&self) -> Result<ExecutionConfig, ExecutionConfigError> {
        match *self {
            ExecutionSettings::Preset { preset } => Ok(ExecutionConfig::from_preset(preset)),
            ExecutionSettings::Explicit {
                slippage_bps,
                commission_per_order,
            } => ExecutionConfig::new(slippage_bps, commission_per_order),
        }
    }
}

/// Strategy selection and parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Buy once on the first bar and hold. `shares = None` spends all cash.
    BuyAndHold {
        symbol: String,
        #[serde(default)]
        shares: Option<f64>,
    },

    /// Volatility-targeted long-only trend following on an SMA filter.
    SmaTrend {
        symbol: String,
        #[serde(default = "default_sma_window")]
        sma_window: usize,
        #[serde(default = "default_vol_window")]
        vol_window: usize,
        #[serde(default = "default_vol_target")]
        vol_target_ann: f64,
    },

    /// Volatility-targeted RSI mean reversion, long and short.
    RsiReversion {
        symbol: String,
        #[serde(default = "default_rsi_window")]
        rsi_window: usize,
        #[serde(default = "default_vol_window")]
        vol_window: usize,
        #[serde(default = "default_vol_target")]
        vol_target_ann: f64,
    },
}

fn default_sma_window() -> usize {
    200
}

fn default_vol_window() -> usize {
    20
}

fn default_vol_target() -> f64 {
    0.10
}

fn default_rsi_window() -> usize {
    14
}

impl StrategyConfig {
    pub fn symbol(&self) -> &str {
        match self {
            StrategyConfig::BuyAndHold { symbol, .. }
            | StrategyConfig::SmaTrend { symbol, .. }
            | StrategyConfig::RsiReversion { symbol, .. } => symbol,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol().trim().is_empty() {
            return Err(ConfigError::Invalid("strategy symbol is empty".into()));
        }
        match *self {
            StrategyConfig::BuyAndHold { shares, .. } => {
                if let Some(shares) = shares {
                    if !shares.is_finite() || shares < 1.0 {
                        return Err(ConfigError::Invalid(format!(
                            "buy_and_hold shares must be >= 1 (got {shares})"
                        )));
                    }
                }
            }
            StrategyConfig::SmaTrend {
                sma_window,
                vol_window,
                vol_target_ann,
                ..
            } => {
                check_window("sma_window", sma_window, 1)?;
                check_window("vol_window", vol_window, 2)?;
                check_vol_target(vol_target_ann)?;
            }
            StrategyConfig::RsiReversion {
                rsi_window,
                vol_window,
                vol_target_ann,
                ..
            } => {
                check_window("rsi_window", rsi_window, 1)?;
                check_window("vol_window", vol_window, 1)?;
                check_vol_target(vol_target_ann)?;
            }
        }
        Ok(())
    }
}

fn check_window(name: &str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::Invalid(format!(
            "{name} must be >= {min} (got {value})"
        )));
    }
    Ok(())
}

fn check_vol_target(value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::Invalid(format!(
            "vol_target_ann must be finite and > 0 (got {value})"
        )));
    }
    Ok(())
}

//! Backtest runner — wires config, bar loading, strategy, and engine together.
//!
//! Two entry points:
//! - `run_from_config()`: loads bars as the config describes, then runs. Used by the CLI.
//! - `run_with_source()`: takes a pre-loaded bar source. Used by sweeps and tests,
//!   where many runs share one immutable source.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use replaylab_core::execution::ExecutionConfigError;
use replaylab_core::{
    run_backtest, BacktestResult, BarSource, EngineError, ExecutionConfig, ExecutionSimulator,
    InstrumentId, Ledger, TradeRecord,
};

use crate::config::{BacktestConfig, ConfigError, ExecutionSettings, RunId};
use crate::data_loader::{load_bars, LoadError};
use crate::strategies::build_strategy;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("execution config error: {0}")]
    Execution(#[from] ExecutionConfigError),
    #[error("backtest failed: {0}")]
    Engine(#[from] EngineError),
    #[error("symbol '{0}' not found in loaded data")]
    SymbolNotFound(String),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Everything a single run produced, plus its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub strategy: String,
    pub config: BacktestConfig,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub result: BacktestResult,
    /// Closed trades from the strategy's journal, empty if it keeps none.
    pub trades: Vec<TradeRecord>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Load bars per `config.data` and run the configured strategy over them.
pub fn run_from_config(config: &BacktestConfig) -> Result<RunOutcome, RunError> {
    config.validate()?;
    let loaded = load_bars(&config.data)?;
    run_with_source(
        config,
        &loaded.source,
        &loaded.dataset_hash,
        loaded.has_synthetic,
    )
}

/// Run the configured strategy over an already-loaded source. No I/O.
pub fn run_with_source(
    config: &BacktestConfig,
    source: &dyn BarSource,
    dataset_hash: &str,
    has_synthetic: bool,
) -> Result<RunOutcome, RunError> {
    let exec = config.execution.to_config()?;
    execute(config.clone(), exec, source, dataset_hash, has_synthetic)
}

/// Run with an explicit cost model, overriding `config.execution`.
///
/// The cost model is written back into the recorded config so the run id
/// reflects what was actually simulated.
pub fn run_with_exec_config(
    config: &BacktestConfig,
    exec: ExecutionConfig,
    source: &dyn BarSource,
    dataset_hash: &str,
    has_synthetic: bool,
) -> Result<RunOutcome, RunError> {
    let mut config = config.clone();
    config.execution = ExecutionSettings::Explicit {
        slippage_bps: exec.slippage_bps(),
        commission_per_order: exec.commission_per_order(),
    };
    execute(config, exec, source, dataset_hash, has_synthetic)
}

fn execute(
    config: BacktestConfig,
    exec: ExecutionConfig,
    source: &dyn BarSource,
    dataset_hash: &str,
    has_synthetic: bool,
) -> Result<RunOutcome, RunError> {
    let symbol = config.strategy.symbol();
    if source.history_for(&InstrumentId::from(symbol)).is_empty() {
        return Err(RunError::SymbolNotFound(symbol.to_string()));
    }
    let run_id = config.run_id()?;

    let simulator = ExecutionSimulator::new(exec);
    let mut ledger = Ledger::new(config.initial_cash);
    let mut strategy = build_strategy(&config.strategy);

    let result = run_backtest(
        source,
        strategy.as_mut(),
        &mut ledger,
        &simulator,
        &config.metrics,
    )?;
    let trades = strategy
        .journal_mut()
        .map(|journal| journal.trades().to_vec())
        .unwrap_or_default();

    info!(
        run_id = %run_id,
        strategy = strategy.name(),
        final_equity = result.final_equity().unwrap_or(config.initial_cash),
        trades = trades.len(),
        "run complete"
    );

    Ok(RunOutcome {
        schema_version: SCHEMA_VERSION,
        run_id,
        strategy: strategy.name().to_string(),
        config,
        dataset_hash: dataset_hash.to_string(),
        has_synthetic,
        result,
        trades,
    })
}

//! Execution-cost sweeps over one loaded dataset.
//!
//! Every grid cell is a fully independent run: its own ledger, strategy,
//! and simulator. Cells share only the immutable bar source, so they run in
//! parallel with Rayon and come back in grid order.

use rayon::prelude::*;
use replaylab_core::ExecutionConfig;
use serde::{Deserialize, Serialize};

use crate::config::BacktestConfig;
use crate::data_loader::LoadedData;
use crate::runner::{run_with_exec_config, RunError, RunOutcome};

/// Slippage × commission grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostGrid {
    pub slippage_bps: Vec<f64>,
    pub commission_per_order: Vec<f64>,
}

impl CostGrid {
    pub fn new(slippage_bps: Vec<f64>, commission_per_order: Vec<f64>) -> Self {
        Self {
            slippage_bps,
            commission_per_order,
        }
    }

    pub fn size(&self) -> usize {
        self.slippage_bps.len() * self.commission_per_order.len()
    }

    /// Cells in slippage-major order.
    pub fn cells(&self) -> Vec<(f64, f64)> {
        self.slippage_bps
            .iter()
            .flat_map(|&s| self.commission_per_order.iter().map(move |&c| (s, c)))
            .collect()
    }

    /// Validate every cell up front so a bad value fails before any run starts.
    fn configs(&self) -> Result<Vec<ExecutionConfig>, RunError> {
        self.cells()
            .into_iter()
            .map(|(s, c)| ExecutionConfig::new(s, c).map_err(RunError::from))
            .collect()
    }
}

/// One completed grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub slippage_bps: f64,
    pub commission_per_order: f64,
    pub outcome: RunOutcome,
}

impl SweepPoint {
    pub fn final_equity(&self) -> f64 {
        self.outcome
            .result
            .final_equity()
            .unwrap_or(self.outcome.config.initial_cash)
    }

    pub fn total_fees(&self) -> f64 {
        self.outcome.result.total_fees()
    }
}

/// Run the grid in parallel. Output order matches [`CostGrid::cells`].
pub fn sweep_execution_costs(
    config: &BacktestConfig,
    data: &LoadedData,
    grid: &CostGrid,
) -> Result<Vec<SweepPoint>, RunError> {
    grid.configs()?
        .into_par_iter()
        .map(|exec| run_cell(config, data, exec))
        .collect()
}

/// Same as [`sweep_execution_costs`] on the calling thread.
pub fn sweep_execution_costs_sequential(
    config: &BacktestConfig,
    data: &LoadedData,
    grid: &CostGrid,
) -> Result<Vec<SweepPoint>, RunError> {
    grid.configs()?
        .into_iter()
        .map(|exec| run_cell(config, data, exec))
        .collect()
}

fn run_cell(
    config: &BacktestConfig,
    data: &LoadedData,
    exec: ExecutionConfig,
) -> Result<SweepPoint, RunError> {
    let outcome = run_with_exec_config(
        config,
        exec,
        &data.source,
        &data.dataset_hash,
        data.has_synthetic,
    )?;
    Ok(SweepPoint {
        slippage_bps: exec.slippage_bps(),
        commission_per_order: exec.commission_per_order(),
        outcome,
    })
}

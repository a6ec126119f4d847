//! ReplayLab Runner — backtest orchestration on top of `replaylab-core`.
//!
//! This crate provides:
//! - TOML run configuration with content-addressed run ids
//! - Bar loading from CSV, Parquet, or a seeded synthetic walk
//! - Reference strategies (SMA trend, RSI mean reversion) and their indicators
//! - Single-run entry points and parallel execution-cost sweeps
//! - Buy-and-hold benchmark comparison
//! - JSON / CSV / Markdown artifact export

pub mod benchmark;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod strategies;
pub mod sweep;

pub use benchmark::{compare_to_buy_and_hold, BenchmarkError, Comparison};
pub use config::{BacktestConfig, ConfigError, DataConfig, ExecutionSettings, StrategyConfig};
pub use data_loader::{load_bars, LoadError, LoadedData};
pub use runner::{run_from_config, run_with_source, RunError, RunOutcome, SCHEMA_VERSION};
pub use strategies::build_strategy;
pub use sweep::{sweep_execution_costs, CostGrid, SweepPoint};

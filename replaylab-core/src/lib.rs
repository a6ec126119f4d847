//! ReplayLab Core — bar replay engine, portfolio ledger, execution simulator, strategy contract.
//!
//! This crate contains the deterministic heart of the backtester:
//! - Domain types (bars, order intents, fills, trade records)
//! - Portfolio ledger with mark-to-market equity and log-return curves
//! - Execution simulator with bps slippage and flat commission
//! - Strategy trait with a default FIFO trade journal and end-of-run report
//! - Single-threaded bar loop enforcing decide → execute → settle → mark
//! - Pure performance metrics over a return series

pub mod data;
pub mod domain;
pub mod engine;
pub mod execution;
pub mod ledger;
pub mod metrics;
pub mod serde_float;
pub mod strategy;

pub use data::{BarSource, InMemoryBarSource};
pub use domain::{Bar, Fill, InstrumentId, LotSide, OrderClass, OrderIntent, Side, TradeRecord};
pub use engine::{run_backtest, BacktestResult, EngineError};
pub use execution::{ExecutionConfig, ExecutionError, ExecutionPreset, ExecutionSimulator};
pub use ledger::Ledger;
pub use metrics::{MetricsConfig, PerformanceMetrics};
pub use strategy::{BuyAndHold, RunReport, Strategy, StrategyError, TradeJournal, TradeSummary};

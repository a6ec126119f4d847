//! Backtesting engine — orchestrates bar source, strategy, execution, and ledger.
//!
//! The engine pulls bars in delivery order and, for each one, runs the
//! decide → execute → settle → mark sequence to completion before touching
//! the next bar. It is single-threaded and synchronous; parallel sweeps run
//! one independent engine per scenario.

pub mod error;
pub mod lifecycle;
pub mod loop_runner;
pub mod result;

pub use error::EngineError;
pub use lifecycle::{Lifecycle, Phase};
pub use loop_runner::run_backtest;
pub use result::BacktestResult;

//! Execution: converts order intents into priced fills.
//!
//! - **Cost model**: proportional one-way slippage in bps, flat commission per order
//! - **Simulator**: one intent → exactly one fill, or a rejection

pub mod cost_model;
pub mod simulator;

pub use cost_model::{ExecutionConfig, ExecutionConfigError, ExecutionPreset};
pub use simulator::{ExecutionError, ExecutionSimulator};

use super::lifecycle::Phase;
use crate::execution::ExecutionError;
use crate::strategy::StrategyError;
use thiserror::Error;

/// Why a run was aborted. No partial result accompanies any variant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("strategy '{strategy}' failed: {source}")]
    Strategy {
        strategy: String,
        #[source]
        source: StrategyError,
    },

    #[error("execution rejected an order: {0}")]
    Execution(#[from] ExecutionError),

    #[error("ledger already has {marks} mark(s); each run needs a fresh ledger")]
    LedgerNotFresh { marks: usize },

    #[error("invalid lifecycle transition: {from:?} -> {to:?}")]
    InvalidTransition { from: Phase, to: Phase },
}

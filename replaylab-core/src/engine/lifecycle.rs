//! Strategy lifecycle state machine, enforced by the engine.
//!
//! `Uninitialized → Ready → Finalized`. Bars and fills are only delivered while
//! `Ready`; nothing leaves `Finalized`.

use super::error::EngineError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Uninitialized,
    Ready,
    Finalized,
}

#[derive(Debug, Clone)]
pub struct Lifecycle {
    phase: Phase,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            phase: Phase::Uninitialized,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Move to `to` if the transition is legal.
    pub fn advance(&mut self, to: Phase) -> Result<(), EngineError> {
        let legal = matches!(
            (self.phase, to),
            (Phase::Uninitialized, Phase::Ready) | (Phase::Ready, Phase::Finalized)
        );
        if !legal {
            return Err(EngineError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        self.phase = to;
        Ok(())
    }

    /// Fail unless bars and fills may currently be delivered.
    pub fn ensure_ready(&self) -> Result<(), EngineError> {
        if self.phase == Phase::Ready {
            Ok(())
        } else {
            Err(EngineError::InvalidTransition {
                from: self.phase,
                to: Phase::Ready,
            })
        }
    }
}

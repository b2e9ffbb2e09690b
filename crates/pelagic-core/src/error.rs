//! Tick-level error type.
//!
//! Numerical non-convergence inside behaviour loops is never an error
//! (it resolves to a calibrated fallback); only broken state that makes
//! continuing meaningless surfaces here.

use crate::id::AnimalId;
use std::error::Error;
use std::fmt;

/// Errors from executing one simulation tick.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// A scheduled task failed.
    TaskFailed {
        /// Name of the failing task.
        name: String,
        /// Human-readable reason.
        reason: String,
    },
    /// An animal's state became NaN or infinite.
    NonFiniteState {
        /// The affected animal.
        animal: AnimalId,
        /// Which quantity went non-finite.
        quantity: &'static str,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskFailed { name, reason } => write!(f, "task '{name}' failed: {reason}"),
            Self::NonFiniteState { animal, quantity } => {
                write!(f, "animal {animal} has non-finite {quantity}")
            }
        }
    }
}

impl Error for StepError {}

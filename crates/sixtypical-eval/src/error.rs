//! Evaluation errors
//!
//! Every variant is fatal: evaluation stops at the first one and no
//! partial state is reported.

use thiserror::Error;

/// Evaluation result type
pub type Result<T> = std::result::Result<T, EvalError>;

/// Evaluation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("location '{0}' read before it was set")]
    UnboundLocation(String),

    #[error("part reference height {0} is not supported (only 0 and 1)")]
    UnsupportedPartHeight(u8),

    #[error("cannot assign to {0}")]
    InvalidAssignmentTarget(String),

    #[error("program has no 'main' routine")]
    MissingEntryPoint,

    #[error("location '{0}' holds a routine, not a value")]
    RoutineAsValue(String),

    #[error("location '{0}' does not hold a routine")]
    NotARoutine(String),

    #[error("call depth exceeded {depth} nested routines")]
    CallDepthExceeded { depth: usize },

    #[error("step budget of {steps} instructions exhausted")]
    StepBudgetExhausted { steps: u64 },
}

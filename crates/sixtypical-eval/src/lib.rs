//! SixtyPical evaluator
//!
//! Reference semantics for SixtyPical programs: runs a typed program tree
//! directly against an abstract machine state instead of generating code.
//!
//! ```ignore
//! use sixtypical_ast::Program;
//! use sixtypical_eval::eval_program;
//!
//! let program = Program::load("countdown.json")?;
//! let ctx = eval_program(&program)?;
//! println!("{ctx}");
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod observer;

pub use config::EvalConfig;
pub use context::Context;
pub use error::{EvalError, Result};
pub use evaluator::{Evaluator, eval_program};
pub use observer::{NoopObserver, Observer, StepBudget};

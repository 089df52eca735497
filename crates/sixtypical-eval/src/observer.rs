//! Instruction hook
//!
//! The evaluator runs a program to completion however long that takes.
//! Callers that need a bound (a test harness, a REPL) install an
//! [`Observer`] and fail the run from there.

use sixtypical_ast::{Instr, Routine};

use crate::context::Context;
use crate::error::{EvalError, Result};

/// Called before every instruction the evaluator executes
pub trait Observer {
    fn on_instr(&mut self, routine: &Routine, instr: &Instr, ctx: &Context<'_>) -> Result<()>;
}

/// Observer that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn on_instr(&mut self, _: &Routine, _: &Instr, _: &Context<'_>) -> Result<()> {
        Ok(())
    }
}

/// Fails the run once more than `limit` instructions have executed
#[derive(Debug, Clone, Copy)]
pub struct StepBudget {
    limit: u64,
    steps: u64,
}

impl StepBudget {
    pub fn new(limit: u64) -> Self {
        Self { limit, steps: 0 }
    }

    /// Instructions executed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl Observer for StepBudget {
    fn on_instr(&mut self, _: &Routine, _: &Instr, _: &Context<'_>) -> Result<()> {
        if self.steps >= self.limit {
            return Err(EvalError::StepBudgetExhausted { steps: self.limit });
        }
        self.steps += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sixtypical_ast::model::reg_a;

    #[test]
    fn test_step_budget_counts_and_trips() {
        let routine = Routine::new("main", vec![]);
        let instr = Instr::Inc { dest: reg_a() };
        let ctx = Context::new();

        let mut budget = StepBudget::new(2);
        assert!(budget.on_instr(&routine, &instr, &ctx).is_ok());
        assert!(budget.on_instr(&routine, &instr, &ctx).is_ok());
        assert_eq!(budget.steps(), 2);
        assert_eq!(
            budget.on_instr(&routine, &instr, &ctx),
            Err(EvalError::StepBudgetExhausted { steps: 2 })
        );
    }
}

//! Instruction evaluator
//!
//! Walks program → routine → block → instruction and applies each opcode to
//! a [`Context`]. Arithmetic mirrors an 8-bit accumulator machine: results
//! are masked to a byte and Z/N/C are updated the way the hardware would.
//!
//! # Control flow
//!
//! - `call` runs the target routine as a nested invocation (native
//!   recursion, bounded by [`EvalConfig::max_call_depth`]) and then resumes.
//! - `goto` produces [`Flow::Goto`], which every enclosing block returns
//!   immediately. The routine trampoline catches it and starts the target
//!   routine in place of the current one, so jumps never grow the stack.

use sixtypical_ast::model::{self, FLAG_C, FLAG_N, FLAG_Z, REG_A, REG_Y};
use sixtypical_ast::{Block, Instr, Program, Routine, Word};
use tracing::{debug, error, info, instrument, trace};

use crate::config::EvalConfig;
use crate::context::Context;
use crate::error::{EvalError, Result};
use crate::observer::{NoopObserver, Observer};


/// How control leaves a block
#[derive(Debug, Clone, Copy)]
enum Flow<'p> {
    /// Fell off the end; carry on with the next instruction
    Continue,
    /// Abandon every enclosing block and run this routine instead
    Goto(&'p Routine),
}

/// Evaluates programs against a fresh context
pub struct Evaluator<O = NoopObserver> {
    config: EvalConfig,
    observer: O,
    /// Routine invocations currently active, `main` included
    depth: usize,
}

impl Evaluator<NoopObserver> {
    pub fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    pub fn with_config(config: EvalConfig) -> Self {
        Self {
            config,
            observer: NoopObserver,
            depth: 0,
        }
    }
}

impl Default for Evaluator<NoopObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Observer> Evaluator<O> {
    /// Replace the observer called before each instruction
    pub fn with_observer<P: Observer>(self, observer: P) -> Evaluator<P> {
        Evaluator {
            config: self.config,
            observer,
            depth: 0,
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Run `main` to completion and return the final context
    ///
    /// Registers and flags start at zero, then declared initial values are
    /// applied, then every routine is bound under its own name.
    #[instrument(skip_all, name = "eval_program")]
    pub fn eval_program<'p>(&mut self, program: &'p Program) -> Result<Context<'p>> {
        let mut ctx = Context::new();
        for cell in model::machine_cells() {
            ctx.set(&cell, 0)?;
        }
        for defn in &program.defns {
            if let Some(initial) = defn.initial {
                ctx.store(&defn.location.name, initial);
            }
        }
        for routine in &program.routines {
            ctx.bind_routine(routine);
        }

        let Some(main) = program.main() else {
            error!("no entry point");
            return Err(EvalError::MissingEntryPoint);
        };

        info!(
            defns = program.defns.len(),
            routines = program.routines.len(),
            "evaluation starting"
        );
        self.depth = 0;
        self.eval_routine(main, &mut ctx)?;
        info!("evaluation complete");
        Ok(ctx)
    }

    /// Run a routine, following any `goto`s it makes, until one finishes
    fn eval_routine<'p>(&mut self, routine: &'p Routine, ctx: &mut Context<'p>) -> Result<()> {
        if self.depth >= self.config.max_call_depth {
            error!(routine = %routine.name, depth = self.depth, "call depth exceeded");
            return Err(EvalError::CallDepthExceeded {
                depth: self.config.max_call_depth,
            });
        }
        self.depth += 1;
        let result = self.trampoline(routine, ctx);
        self.depth -= 1;
        result
    }

    fn trampoline<'p>(&mut self, routine: &'p Routine, ctx: &mut Context<'p>) -> Result<()> {
        let mut current = routine;
        loop {
            debug!(routine = %current.name, depth = self.depth, "entering routine");
            match self.eval_block(current, &current.block, ctx)? {
                Flow::Continue => return Ok(()),
                Flow::Goto(next) => {
                    debug!(from = %current.name, to = %next.name, "goto");
                    current = next;
                }
            }
        }
    }

    fn eval_block<'p>(
        &mut self,
        routine: &'p Routine,
        block: &'p Block,
        ctx: &mut Context<'p>,
    ) -> Result<Flow<'p>> {
        for instr in &block.instrs {
            self.observer.on_instr(routine, instr, ctx)?;
            trace!(routine = %routine.name, %instr, "exec");
            if let Flow::Goto(target) = self.eval_instr(routine, instr, ctx)? {
                return Ok(Flow::Goto(target));
            }
        }
        Ok(Flow::Continue)
    }

    fn eval_instr<'p>(
        &mut self,
        routine: &'p Routine,
        instr: &'p Instr,
        ctx: &mut Context<'p>,
    ) -> Result<Flow<'p>> {
        match instr {
            Instr::Ld { dest, src } => {
                let result = ctx.get(src)?;
                set_zn(ctx, result);
                ctx.set(dest, result)?;
            }
            Instr::St { dest, src } => {
                ctx.transfer(dest, src)?;
            }
            Instr::Add { dest, src } => {
                let carry = ctx.load(FLAG_C)?;
                let sum = u32::from(ctx.get(dest)?) + u32::from(ctx.get(src)?) + u32::from(carry);
                ctx.store(FLAG_C, Word::from(sum > 0xff));
                let result = (sum & 0xff) as Word;
                set_zn(ctx, result);
                ctx.set(dest, result)?;
            }
            Instr::Sub { dest, src } => {
                let carry = ctx.load(FLAG_C)?;
                let diff = i32::from(ctx.get(dest)?) - i32::from(ctx.get(src)?) - i32::from(carry);
                ctx.store(FLAG_C, Word::from(diff < 0));
                let result = (diff & 0xff) as Word;
                set_zn(ctx, result);
                ctx.set(dest, result)?;
            }
            Instr::Inc { dest } => {
                let result = ctx.get(dest)?.wrapping_add(1) & 0xff;
                set_zn(ctx, result);
                ctx.set(dest, result)?;
            }
            Instr::Dec { dest } => {
                let result = ctx.get(dest)?.wrapping_sub(1) & 0xff;
                set_zn(ctx, result);
                ctx.set(dest, result)?;
            }
            Instr::Cmp { dest, src } => {
                let diff = i32::from(ctx.get(dest)?) - i32::from(ctx.get(src)?);
                ctx.store(FLAG_Z, Word::from(diff == 0));
                ctx.store(FLAG_N, Word::from(diff & 0x80 != 0));
                ctx.store(FLAG_C, Word::from(diff < 0));
            }
            Instr::And { dest, src } => {
                let result = ctx.get(dest)? & ctx.get(src)?;
                set_zn(ctx, result);
                ctx.set(dest, result)?;
            }
            Instr::Or { dest, src } => {
                let result = ctx.get(dest)? | ctx.get(src)?;
                set_zn(ctx, result);
                ctx.set(dest, result)?;
            }
            Instr::Xor { dest, src } => {
                let result = ctx.get(dest)? ^ ctx.get(src)?;
                set_zn(ctx, result);
                ctx.set(dest, result)?;
            }
            Instr::Shl { dest } => {
                let value = ctx.get(dest)?;
                let carry = ctx.load(FLAG_C)?;
                ctx.store(FLAG_C, Word::from(value & 0x80 != 0));
                let result = (value << 1).wrapping_add(carry) & 0xff;
                set_zn(ctx, result);
                ctx.set(dest, result)?;
            }
            Instr::Shr { dest } => {
                let value = ctx.get(dest)?;
                let carry = ctx.load(FLAG_C)?;
                ctx.store(FLAG_C, value & 1);
                let result = (value >> 1).wrapping_add(carry.wrapping_mul(0x80));
                set_zn(ctx, result);
                ctx.set(dest, result)?;
            }
            Instr::Call { location } => {
                let callee = ctx.routine(location)?;
                debug!(caller = %routine.name, callee = %callee.name, "call");
                self.eval_routine(callee, ctx)?;
            }
            Instr::Goto { location } => {
                return Ok(Flow::Goto(ctx.routine(location)?));
            }
            Instr::If {
                src,
                inverted,
                block1,
                block2,
            } => {
                let taken = (ctx.get(src)? != 0) != *inverted;
                if taken {
                    return self.eval_block(routine, block1, ctx);
                }
                if let Some(block2) = block2 {
                    return self.eval_block(routine, block2, ctx);
                }
            }
            Instr::Repeat { src, block } => loop {
                if let Flow::Goto(target) = self.eval_block(routine, block, ctx)? {
                    return Ok(Flow::Goto(target));
                }
                if ctx.get(src)? != 0 {
                    break;
                }
            },
            Instr::Copy { dest, src } => {
                ctx.transfer(dest, src)?;
                trash_accumulator(ctx);
            }
            Instr::CopyIndexed { dest, src } => {
                // Memory is not modeled; the store lands on the base location.
                // The base must already be bound, so an unset table fails here
                // with `UnboundLocation` before anything is written.
                let base = ctx.get(dest)?;
                let index = ctx.load(REG_Y)?;
                trace!(address = base.wrapping_add(index), "indexed copy");
                ctx.transfer(dest, src)?;
                trash_accumulator(ctx);
            }
            Instr::WithSei { block } => {
                return self.eval_block(routine, block, ctx);
            }
        }
        Ok(Flow::Continue)
    }
}

/// Z and N as left by a byte result
fn set_zn(ctx: &mut Context<'_>, result: Word) {
    ctx.store(FLAG_Z, Word::from(result == 0));
    ctx.store(FLAG_N, Word::from(result & 0x80 != 0));
}

/// The 6502 sequence behind `copy` goes through A, leaving A, Z and N
/// unspecified; they read as zero afterwards.
fn trash_accumulator(ctx: &mut Context<'_>) {
    ctx.store(REG_A, 0);
    ctx.store(FLAG_Z, 0);
    ctx.store(FLAG_N, 0);
}

/// Evaluate a program with the default configuration
pub fn eval_program(program: &Program) -> Result<Context<'_>> {
    Evaluator::new().eval_program(program)
}

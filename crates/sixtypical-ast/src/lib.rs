// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Program representation for SixtyPical
//!
//! This crate holds the typed program tree the evaluator consumes:
//! storage references ([`model`]), routines, blocks and instructions
//! ([`ast`]), and the JSON encoding tooling uses to exchange programs.
//! Parsing SixtyPical source and type checking live upstream; everything
//! here is assumed to have passed those stages.

pub mod ast;
pub mod error;
mod load;
pub mod model;
mod wire;

pub use ast::{Block, Defn, Instr, Program, Routine};
pub use error::{ProgramError, ProgramResult};
pub use model::{LocationRef, Ref, Type, Word};

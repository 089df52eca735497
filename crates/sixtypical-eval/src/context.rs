//! Execution context
//!
//! Current values of every storage cell during one program run, plus
//! resolution of constant, location and part references.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use sixtypical_ast::{LocationRef, Ref, Routine, Word};

use crate::error::{EvalError, Result};

/// What a storage cell currently holds
#[derive(Debug, Clone, Copy)]
enum Binding<'p> {
    Value(Word),
    /// Bound under the routine's own name, or copied into a vector
    Routine(&'p Routine),
}

/// Storage for one program run
///
/// Borrows routine definitions from the program being evaluated, so a
/// context never outlives its program.
#[derive(Debug, Default)]
pub struct Context<'p> {
    cells: IndexMap<String, Binding<'p>>,
}

impl<'p> Context<'p> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a reference to its current value
    pub fn get(&self, reference: &Ref) -> Result<Word> {
        match reference {
            Ref::Constant { value } => Ok(*value),
            Ref::Location(location) => self.load(&location.name),
            Ref::Part { inner, height } => {
                let value = self.get(inner)?;
                match height {
                    0 => Ok(value & 0xff),
                    1 => Ok((value >> 8) & 0xff),
                    other => Err(EvalError::UnsupportedPartHeight(*other)),
                }
            }
        }
    }

    /// Write a value through a reference
    ///
    /// Part writes read the full underlying value first and replace only
    /// the addressed byte.
    pub fn set(&mut self, reference: &Ref, value: Word) -> Result<()> {
        match reference {
            Ref::Constant { .. } => Err(EvalError::InvalidAssignmentTarget(reference.to_string())),
            Ref::Location(location) => {
                self.store(&location.name, value);
                Ok(())
            }
            Ref::Part { inner, height } => {
                let old = self.get(inner)?;
                let merged = match height {
                    0 => (old & 0xff00) | (value & 0xff),
                    1 => ((value & 0xff) << 8) | (old & 0xff),
                    other => return Err(EvalError::UnsupportedPartHeight(*other)),
                };
                self.set(inner, merged)
            }
        }
    }

    /// Move whatever `src` holds into `dest`
    ///
    /// A location bound to a routine hands over the routine itself, so the
    /// destination can later be the target of `call` or `goto`. Anything
    /// else moves as a plain value through [`Context::set`].
    pub fn transfer(&mut self, dest: &Ref, src: &Ref) -> Result<()> {
        let held = match src {
            Ref::Location(from) => match self.cells.get(&from.name) {
                Some(Binding::Routine(routine)) => Some((from, *routine)),
                _ => None,
            },
            _ => None,
        };
        let Some((from, routine)) = held else {
            let value = self.get(src)?;
            return self.set(dest, value);
        };
        match dest {
            Ref::Location(to) => {
                self.cells.insert(to.name.clone(), Binding::Routine(routine));
                Ok(())
            }
            Ref::Part { .. } => Err(EvalError::RoutineAsValue(from.name.clone())),
            Ref::Constant { .. } => Err(EvalError::InvalidAssignmentTarget(dest.to_string())),
        }
    }

    /// Overwrite (or create) a named cell
    pub fn store(&mut self, name: &str, value: Word) {
        self.cells.insert(name.to_string(), Binding::Value(value));
    }

    /// Read a named cell
    pub fn load(&self, name: &str) -> Result<Word> {
        match self.cells.get(name) {
            Some(Binding::Value(v)) => Ok(*v),
            Some(Binding::Routine(_)) => Err(EvalError::RoutineAsValue(name.to_string())),
            None => Err(EvalError::UnboundLocation(name.to_string())),
        }
    }

    /// Bind a routine to its own name
    pub fn bind_routine(&mut self, routine: &'p Routine) {
        self.cells
            .insert(routine.name.clone(), Binding::Routine(routine));
    }

    /// The routine a location is bound to
    pub fn routine(&self, location: &LocationRef) -> Result<&'p Routine> {
        match self.cells.get(&location.name) {
            Some(Binding::Routine(routine)) => Ok(*routine),
            Some(Binding::Value(_)) => Err(EvalError::NotARoutine(location.name.clone())),
            None => Err(EvalError::UnboundLocation(location.name.clone())),
        }
    }

    /// Current value of a named cell, if it holds one
    pub fn value(&self, name: &str) -> Option<Word> {
        match self.cells.get(name)? {
            Binding::Value(v) => Some(*v),
            Binding::Routine(_) => None,
        }
    }

    /// All value cells sorted by name; routine bindings are left out
    pub fn snapshot(&self) -> BTreeMap<String, Word> {
        self.cells
            .iter()
            .filter_map(|(name, binding)| match binding {
                Binding::Value(v) => Some((name.clone(), *v)),
                Binding::Routine(_) => None,
            })
            .collect()
    }
}

impl fmt::Display for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self
            .snapshot()
            .into_iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

//! Program tree: declarations, routines, blocks and instructions
//!
//! The tree is built by the front end (parser + type checker) and is
//! read-only from the evaluator's point of view.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{LocationRef, Ref, Type, Word};
use crate::wire::RawProgram;

/// A complete program: data declarations followed by routines
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawProgram", into = "RawProgram")]
pub struct Program {
    pub defns: Vec<Defn>,
    pub routines: Vec<Routine>,
}

impl Program {
    /// Name of the routine execution starts from.
    pub const ENTRY_POINT: &'static str = "main";

    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a storage location, optionally with an initial value.
    pub fn with_defn(mut self, location: LocationRef, initial: Option<Word>) -> Self {
        self.defns.push(Defn { location, initial });
        self
    }

    pub fn with_routine(mut self, routine: Routine) -> Self {
        self.routines.push(routine);
        self
    }

    /// The entry routine, if the program has one.
    pub fn main(&self) -> Option<&Routine> {
        self.routine(Self::ENTRY_POINT)
    }

    pub fn routine(&self, name: &str) -> Option<&Routine> {
        self.routines.iter().find(|r| r.name == name)
    }
}

/// A data declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defn {
    pub location: LocationRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<Word>,
}

/// A named unit of code that can be called or jumped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    pub name: String,
    pub block: Block,
}

impl Routine {
    pub fn new(name: impl Into<String>, instrs: Vec<Instr>) -> Self {
        Self {
            name: name.into(),
            block: Block::new(instrs),
        }
    }

    /// The storage location the routine is bound to while a program runs.
    pub fn location(&self) -> LocationRef {
        LocationRef::new(Type::Routine, self.name.clone())
    }
}

/// A straight-line sequence of instructions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub instrs: Vec<Instr>,
}

impl Block {
    pub fn new(instrs: Vec<Instr>) -> Self {
        Self { instrs }
    }
}

impl From<Vec<Instr>> for Block {
    fn from(instrs: Vec<Instr>) -> Self {
        Self::new(instrs)
    }
}

/// One instruction, carrying exactly the operands its opcode uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    Ld { dest: Ref, src: Ref },
    St { dest: Ref, src: Ref },
    Add { dest: Ref, src: Ref },
    Sub { dest: Ref, src: Ref },
    Inc { dest: Ref },
    Dec { dest: Ref },
    Cmp { dest: Ref, src: Ref },
    And { dest: Ref, src: Ref },
    Or { dest: Ref, src: Ref },
    Xor { dest: Ref, src: Ref },
    Shl { dest: Ref },
    Shr { dest: Ref },
    Call { location: LocationRef },
    Goto { location: LocationRef },
    If {
        src: Ref,
        inverted: bool,
        block1: Block,
        block2: Option<Block>,
    },
    /// Body runs at least once and repeats while `src` reads zero
    Repeat { src: Ref, block: Block },
    Copy { dest: Ref, src: Ref },
    /// `copy[]`: indexed store into memory
    CopyIndexed { dest: Ref, src: Ref },
    WithSei { block: Block },
}

impl Instr {
    /// Mnemonic as written in SixtyPical source.
    pub fn opcode(&self) -> &'static str {
        match self {
            Instr::Ld { .. } => "ld",
            Instr::St { .. } => "st",
            Instr::Add { .. } => "add",
            Instr::Sub { .. } => "sub",
            Instr::Inc { .. } => "inc",
            Instr::Dec { .. } => "dec",
            Instr::Cmp { .. } => "cmp",
            Instr::And { .. } => "and",
            Instr::Or { .. } => "or",
            Instr::Xor { .. } => "xor",
            Instr::Shl { .. } => "shl",
            Instr::Shr { .. } => "shr",
            Instr::Call { .. } => "call",
            Instr::Goto { .. } => "goto",
            Instr::If { .. } => "if",
            Instr::Repeat { .. } => "repeat",
            Instr::Copy { .. } => "copy",
            Instr::CopyIndexed { .. } => "copy[]",
            Instr::WithSei { .. } => "with-sei",
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.opcode();
        match self {
            Instr::Ld { dest, src }
            | Instr::St { dest, src }
            | Instr::Add { dest, src }
            | Instr::Sub { dest, src }
            | Instr::Cmp { dest, src }
            | Instr::And { dest, src }
            | Instr::Or { dest, src }
            | Instr::Xor { dest, src } => write!(f, "{op} {dest}, {src}"),
            Instr::Copy { dest, src } => write!(f, "{op} {src}, {dest}"),
            Instr::CopyIndexed { dest, src } => write!(f, "copy {src}, {dest} + y"),
            Instr::Inc { dest } | Instr::Dec { dest } | Instr::Shl { dest } | Instr::Shr { dest } => {
                write!(f, "{op} {dest}")
            }
            Instr::Call { location } | Instr::Goto { location } => write!(f, "{op} {location}"),
            Instr::If { src, inverted, .. } => {
                let not = if *inverted { "not " } else { "" };
                write!(f, "if {not}{src} {{ .. }}")
            }
            Instr::Repeat { src, .. } => write!(f, "repeat {{ .. }} until {src}"),
            Instr::WithSei { .. } => write!(f, "with interrupts off {{ .. }}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{reg_a, reg_y};

    #[test]
    fn test_main_lookup() {
        let program = Program::new()
            .with_routine(Routine::new("helper", vec![]))
            .with_routine(Routine::new("main", vec![]));
        assert_eq!(program.main().map(|r| r.name.as_str()), Some("main"));
        assert!(program.routine("missing").is_none());

        let headless = Program::new().with_routine(Routine::new("helper", vec![]));
        assert!(headless.main().is_none());
    }

    #[test]
    fn test_routine_location_is_routine_typed() {
        let routine = Routine::new("tick", vec![]);
        let location = routine.location();
        assert_eq!(location.name, "tick");
        assert_eq!(location.ty, Type::Routine);
    }

    #[test]
    fn test_instr_display() {
        let ld = Instr::Ld {
            dest: reg_a(),
            src: Ref::constant(5),
        };
        assert_eq!(ld.to_string(), "ld a, 5");

        let copy = Instr::CopyIndexed {
            dest: Ref::word("ptr"),
            src: reg_y(),
        };
        assert_eq!(copy.opcode(), "copy[]");
        assert_eq!(copy.to_string(), "copy y, ptr + y");
    }
}

//! Flat JSON encoding of the program tree
//!
//! Instructions travel as one record shape regardless of opcode:
//!
//! ```json
//! { "opcode": "if", "src": { "kind": "location", "type": "bit", "name": "z" },
//!   "inverted": true, "block1": { "instrs": [] } }
//! ```
//!
//! Decoding checks the opcode and that every operand it needs is present.

use serde::{Deserialize, Serialize};

use crate::ast::{Block, Defn, Instr, Program, Routine};
use crate::error::ProgramError;
use crate::model::{LocationRef, Ref};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RawProgram {
    #[serde(default)]
    defns: Vec<Defn>,
    #[serde(default)]
    routines: Vec<RawRoutine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRoutine {
    name: String,
    block: RawBlock,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawBlock {
    #[serde(default)]
    instrs: Vec<RawInstr>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawInstr {
    opcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dest: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    src: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<LocationRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    block: Option<RawBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    block1: Option<RawBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    block2: Option<RawBlock>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    inverted: bool,
}

impl RawInstr {
    fn require<T>(&self, field: Option<T>, name: &'static str) -> Result<T, ProgramError> {
        field.ok_or_else(|| ProgramError::MissingField {
            opcode: self.opcode.clone(),
            field: name,
        })
    }

    fn dest(&mut self) -> Result<Ref, ProgramError> {
        let dest = self.dest.take();
        self.require(dest, "dest")
    }

    fn src(&mut self) -> Result<Ref, ProgramError> {
        let src = self.src.take();
        self.require(src, "src")
    }

    fn location(&mut self) -> Result<LocationRef, ProgramError> {
        let location = self.location.take();
        self.require(location, "location")
    }

    fn block(&mut self) -> Result<Block, ProgramError> {
        let block = self.block.take();
        self.require(block, "block")?.try_into()
    }

    fn block1(&mut self) -> Result<Block, ProgramError> {
        let block = self.block1.take();
        self.require(block, "block1")?.try_into()
    }
}

impl TryFrom<RawProgram> for Program {
    type Error = ProgramError;

    fn try_from(raw: RawProgram) -> Result<Self, Self::Error> {
        let routines = raw
            .routines
            .into_iter()
            .map(|r| -> Result<Routine, ProgramError> {
                Ok(Routine {
                    name: r.name,
                    block: r.block.try_into()?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Program {
            defns: raw.defns,
            routines,
        })
    }
}

impl TryFrom<RawBlock> for Block {
    type Error = ProgramError;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        let instrs = raw
            .instrs
            .into_iter()
            .map(Instr::try_from)
            .collect::<Result<_, _>>()?;
        Ok(Block { instrs })
    }
}

impl TryFrom<RawInstr> for Instr {
    type Error = ProgramError;

    fn try_from(mut raw: RawInstr) -> Result<Self, Self::Error> {
        let opcode = raw.opcode.clone();
        let instr = match opcode.as_str() {
            "ld" => Instr::Ld {
                dest: raw.dest()?,
                src: raw.src()?,
            },
            "st" => Instr::St {
                dest: raw.dest()?,
                src: raw.src()?,
            },
            "add" => Instr::Add {
                dest: raw.dest()?,
                src: raw.src()?,
            },
            "sub" => Instr::Sub {
                dest: raw.dest()?,
                src: raw.src()?,
            },
            "inc" => Instr::Inc { dest: raw.dest()? },
            "dec" => Instr::Dec { dest: raw.dest()? },
            "cmp" => Instr::Cmp {
                dest: raw.dest()?,
                src: raw.src()?,
            },
            "and" => Instr::And {
                dest: raw.dest()?,
                src: raw.src()?,
            },
            "or" => Instr::Or {
                dest: raw.dest()?,
                src: raw.src()?,
            },
            "xor" => Instr::Xor {
                dest: raw.dest()?,
                src: raw.src()?,
            },
            "shl" => Instr::Shl { dest: raw.dest()? },
            "shr" => Instr::Shr { dest: raw.dest()? },
            "call" => Instr::Call {
                location: raw.location()?,
            },
            "goto" => Instr::Goto {
                location: raw.location()?,
            },
            "if" => Instr::If {
                src: raw.src()?,
                inverted: raw.inverted,
                block1: raw.block1()?,
                block2: raw.block2.take().map(Block::try_from).transpose()?,
            },
            "repeat" => Instr::Repeat {
                src: raw.src()?,
                block: raw.block()?,
            },
            "copy" => Instr::Copy {
                dest: raw.dest()?,
                src: raw.src()?,
            },
            "copy[]" => Instr::CopyIndexed {
                dest: raw.dest()?,
                src: raw.src()?,
            },
            "with-sei" => Instr::WithSei {
                block: raw.block()?,
            },
            _ => return Err(ProgramError::UnknownOpcode(raw.opcode)),
        };
        Ok(instr)
    }
}

impl From<Program> for RawProgram {
    fn from(program: Program) -> Self {
        RawProgram {
            defns: program.defns,
            routines: program
                .routines
                .into_iter()
                .map(|r| RawRoutine {
                    name: r.name,
                    block: r.block.into(),
                })
                .collect(),
        }
    }
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        RawBlock {
            instrs: block.instrs.into_iter().map(RawInstr::from).collect(),
        }
    }
}

impl From<Instr> for RawInstr {
    fn from(instr: Instr) -> Self {
        let mut raw = RawInstr {
            opcode: instr.opcode().to_string(),
            ..RawInstr::default()
        };
        match instr {
            Instr::Ld { dest, src }
            | Instr::St { dest, src }
            | Instr::Add { dest, src }
            | Instr::Sub { dest, src }
            | Instr::Cmp { dest, src }
            | Instr::And { dest, src }
            | Instr::Or { dest, src }
            | Instr::Xor { dest, src }
            | Instr::Copy { dest, src }
            | Instr::CopyIndexed { dest, src } => {
                raw.dest = Some(dest);
                raw.src = Some(src);
            }
            Instr::Inc { dest } | Instr::Dec { dest } | Instr::Shl { dest } | Instr::Shr { dest } => {
                raw.dest = Some(dest);
            }
            Instr::Call { location } | Instr::Goto { location } => {
                raw.location = Some(location);
            }
            Instr::If {
                src,
                inverted,
                block1,
                block2,
            } => {
                raw.src = Some(src);
                raw.inverted = inverted;
                raw.block1 = Some(block1.into());
                raw.block2 = block2.map(RawBlock::from);
            }
            Instr::Repeat { src, block } => {
                raw.src = Some(src);
                raw.block = Some(block.into());
            }
            Instr::WithSei { block } => {
                raw.block = Some(block.into());
            }
        }
        raw
    }
}

//! Storage model: location types and references
//!
//! A reference names something an instruction reads from or writes to:
//! a literal constant, a named storage cell, or one byte of a wider cell.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer held by a storage cell.
///
/// Bytes and words share one representation; words are 16 bits wide.
pub type Word = u16;

/// Declared type of a storage location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Bit,
    Byte,
    Word,
    #[serde(rename = "byte table")]
    ByteTable,
    Routine,
    Vector,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Bit => "bit",
            Type::Byte => "byte",
            Type::Word => "word",
            Type::ByteTable => "byte table",
            Type::Routine => "routine",
            Type::Vector => "vector",
        };
        write!(f, "{name}")
    }
}

/// A named storage cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationRef {
    #[serde(rename = "type")]
    pub ty: Type,
    pub name: String,
}

impl LocationRef {
    pub fn new(ty: Type, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

impl fmt::Display for LocationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Operand of an instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Ref {
    /// Literal value; never a write target
    Constant { value: Word },
    /// A named storage cell
    Location(LocationRef),
    /// Byte `height` of another reference (0 = low, 1 = high)
    Part {
        #[serde(rename = "ref")]
        inner: Box<Ref>,
        height: u8,
    },
}

impl Ref {
    pub fn constant(value: Word) -> Self {
        Ref::Constant { value }
    }

    pub fn byte(name: impl Into<String>) -> Self {
        Ref::Location(LocationRef::new(Type::Byte, name))
    }

    pub fn word(name: impl Into<String>) -> Self {
        Ref::Location(LocationRef::new(Type::Word, name))
    }

    pub fn low(inner: Ref) -> Self {
        Ref::Part {
            inner: Box::new(inner),
            height: 0,
        }
    }

    pub fn high(inner: Ref) -> Self {
        Ref::Part {
            inner: Box::new(inner),
            height: 1,
        }
    }
}

impl From<LocationRef> for Ref {
    fn from(location: LocationRef) -> Self {
        Ref::Location(location)
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ref::Constant { value } => write!(f, "{value}"),
            Ref::Location(location) => write!(f, "{location}"),
            Ref::Part { inner, height: 0 } => write!(f, "<{inner}"),
            Ref::Part { inner, height: 1 } => write!(f, ">{inner}"),
            Ref::Part { inner, height } => write!(f, "{inner}.{height}"),
        }
    }
}

pub const REG_A: &str = "a";
pub const REG_X: &str = "x";
pub const REG_Y: &str = "y";
pub const FLAG_Z: &str = "z";
pub const FLAG_N: &str = "n";
pub const FLAG_V: &str = "v";
pub const FLAG_C: &str = "c";

pub fn reg_a() -> Ref {
    Ref::byte(REG_A)
}

pub fn reg_x() -> Ref {
    Ref::byte(REG_X)
}

pub fn reg_y() -> Ref {
    Ref::byte(REG_Y)
}

pub fn flag_z() -> Ref {
    Ref::Location(LocationRef::new(Type::Bit, FLAG_Z))
}

pub fn flag_n() -> Ref {
    Ref::Location(LocationRef::new(Type::Bit, FLAG_N))
}

pub fn flag_v() -> Ref {
    Ref::Location(LocationRef::new(Type::Bit, FLAG_V))
}

pub fn flag_c() -> Ref {
    Ref::Location(LocationRef::new(Type::Bit, FLAG_C))
}

/// Registers and flags every machine starts with, in initialization order
pub fn machine_cells() -> [Ref; 7] {
    [
        reg_a(),
        reg_x(),
        reg_y(),
        flag_z(),
        flag_n(),
        flag_v(),
        flag_c(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_display() {
        assert_eq!(Ref::constant(7).to_string(), "7");
        assert_eq!(reg_a().to_string(), "a");
        assert_eq!(Ref::low(Ref::word("ptr")).to_string(), "<ptr");
        assert_eq!(Ref::high(Ref::word("ptr")).to_string(), ">ptr");
    }

    #[test]
    fn test_ref_wire_format() {
        let json = r#"{"kind":"part","ref":{"kind":"location","type":"word","name":"ptr"},"height":1}"#;
        let parsed: Ref = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, Ref::high(Ref::word("ptr")));

        let table: LocationRef =
            serde_json::from_str(r#"{"type":"byte table","name":"screen"}"#).unwrap();
        assert_eq!(table.ty, Type::ByteTable);
    }
}

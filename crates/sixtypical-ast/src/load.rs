//! Loading programs from their JSON encoding

use std::path::Path;

use crate::ast::Program;
use crate::error::ProgramResult;
use crate::wire::RawProgram;

impl Program {
    /// Load a program from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> ProgramResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Decode a program from a JSON string.
    ///
    /// Decoding goes through the flat record form so opcode problems come
    /// back as [`ProgramError::UnknownOpcode`](crate::ProgramError::UnknownOpcode)
    /// or [`ProgramError::MissingField`](crate::ProgramError::MissingField)
    /// rather than as opaque JSON errors.
    pub fn from_json(json: &str) -> ProgramResult<Self> {
        let raw: RawProgram = serde_json::from_str(json)?;
        Program::try_from(raw)
    }

    /// Encode the program as pretty-printed JSON.
    pub fn to_json(&self) -> ProgramResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Instr, Program, Routine};
    use crate::error::ProgramError;
    use crate::model::{Ref, Type, reg_a};

    const COUNTDOWN: &str = r#"
{
  "defns": [
    { "location": { "type": "byte", "name": "counter" }, "initial": 0 }
  ],
  "routines": [
    {
      "name": "main",
      "block": {
        "instrs": [
          { "opcode": "ld",
            "dest": { "kind": "location", "type": "byte", "name": "a" },
            "src": { "kind": "constant", "value": 5 } },
          { "opcode": "repeat",
            "src": { "kind": "location", "type": "bit", "name": "z" },
            "block": { "instrs": [
              { "opcode": "dec", "dest": { "kind": "location", "type": "byte", "name": "a" } }
            ] } }
        ]
      }
    }
  ]
}
"#;

    #[test]
    fn test_program_from_json() {
        let program = Program::from_json(COUNTDOWN).unwrap();
        assert_eq!(program.defns.len(), 1);
        assert_eq!(program.defns[0].location.ty, Type::Byte);
        assert_eq!(program.defns[0].initial, Some(0));

        let main = program.main().unwrap();
        assert_eq!(main.block.instrs.len(), 2);
        assert_eq!(
            main.block.instrs[0],
            Instr::Ld {
                dest: reg_a(),
                src: Ref::constant(5),
            }
        );
        match &main.block.instrs[1] {
            Instr::Repeat { block, .. } => assert_eq!(block.instrs.len(), 1),
            other => panic!("expected repeat, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_opcode() {
        let json = r#"{ "routines": [ { "name": "main", "block": { "instrs": [
            { "opcode": "jsr" }
        ] } } ] }"#;
        let err = Program::from_json(json).unwrap_err();
        assert!(matches!(err, ProgramError::UnknownOpcode(ref op) if op == "jsr"));
    }

    #[test]
    fn test_unknown_opcode_in_nested_block() {
        let json = r#"{ "routines": [ { "name": "main", "block": { "instrs": [
            { "opcode": "with-sei", "block": { "instrs": [ { "opcode": "nop" } ] } }
        ] } } ] }"#;
        let err = Program::from_json(json).unwrap_err();
        assert!(matches!(err, ProgramError::UnknownOpcode(ref op) if op == "nop"));
    }

    #[test]
    fn test_missing_operand() {
        let json = r#"{ "routines": [ { "name": "main", "block": { "instrs": [
            { "opcode": "st", "dest": { "kind": "location", "type": "byte", "name": "a" } }
        ] } } ] }"#;
        let err = Program::from_json(json).unwrap_err();
        match err {
            ProgramError::MissingField { opcode, field } => {
                assert_eq!(opcode, "st");
                assert_eq!(field, "src");
            }
            other => panic!("expected missing field, got {other}"),
        }
    }

    #[test]
    fn test_json_encoding_is_stable() {
        let program = Program::from_json(COUNTDOWN).unwrap();
        let encoded = program.to_json().unwrap();
        assert_eq!(Program::from_json(&encoded).unwrap(), program);
    }

    #[test]
    fn test_if_without_else() {
        let program = Program::new().with_routine(Routine::new(
            "main",
            vec![Instr::If {
                src: reg_a(),
                inverted: true,
                block1: vec![Instr::Inc { dest: reg_a() }].into(),
                block2: None,
            }],
        ));
        let encoded = program.to_json().unwrap();
        assert!(encoded.contains("\"inverted\": true"));
        assert!(!encoded.contains("block2"));
    }
}

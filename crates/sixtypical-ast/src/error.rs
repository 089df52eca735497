//! Errors raised while loading a program representation

use thiserror::Error;

/// Errors that can occur when loading or decoding a program.
#[derive(Debug, Error)]
pub enum ProgramError {
    /// Failed to read the program file.
    #[error("failed to read program file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse the program JSON.
    #[error("failed to parse program JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Opcode outside the instruction set.
    #[error("unknown opcode '{0}'")]
    UnknownOpcode(String),

    /// An operand the opcode requires is absent.
    #[error("'{opcode}' instruction is missing its {field}")]
    MissingField { opcode: String, field: &'static str },
}

/// Result type for program loading.
pub type ProgramResult<T> = Result<T, ProgramError>;

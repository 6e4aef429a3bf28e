use thiserror::Error;

use crate::lang::ValueType;

/// Failure while executing a chunk.
///
/// Every variant records the offset of the instruction that failed, so the
/// caller can look up its source line.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("unknown opcode {byte}")]
    UnknownOpcode { byte: u8, offset: usize },

    #[error("stack overflow")]
    StackOverflow { offset: usize },

    #[error("stack underflow")]
    StackUnderflow { offset: usize },

    #[error("division by zero")]
    DivisionByZero { offset: usize },

    /// Ran past the last byte without a `RETURN`, or an operand was cut off.
    #[error("unexpected end of bytecode")]
    UnexpectedEnd { offset: usize },

    #[error("constant index {index} out of range")]
    BadConstant { index: u8, offset: usize },

    #[error("expected {expected} operand, found {found}")]
    OperandType {
        expected: ValueType,
        found: ValueType,
        offset: usize,
    },

    #[error("failed to write output: {source}")]
    Output {
        source: std::io::Error,
        offset: usize,
    },
}

impl RuntimeError {
    /// Offset of the opcode byte of the failing instruction.
    pub fn offset(&self) -> usize {
        match self {
            RuntimeError::UnknownOpcode { offset, .. }
            | RuntimeError::StackOverflow { offset }
            | RuntimeError::StackUnderflow { offset }
            | RuntimeError::DivisionByZero { offset }
            | RuntimeError::UnexpectedEnd { offset }
            | RuntimeError::BadConstant { offset, .. }
            | RuntimeError::OperandType { offset, .. }
            | RuntimeError::Output { offset, .. } => *offset,
        }
    }
}

use thiserror::Error;

use crate::lang::ValueType;

/// Code generation failure.
///
/// Displays in the same `[line N] error: message` form as front-end
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The constant pool is full.
    #[error("[line {line}] error: too many constants in one chunk")]
    TooManyConstants { line: usize },

    /// The chunk needs more stack than the VM has.
    #[error("[line {line}] error: expression too deep for the VM stack")]
    StackTooDeep {
        line: usize,
        depth: usize,
        capacity: usize,
    },

    /// A node reached code generation without a usable type.
    #[error("[line {line}] error: cannot compile {what} of type {ty}")]
    Untyped {
        line: usize,
        what: &'static str,
        ty: ValueType,
    },

    /// Internal compiler error (shouldn't happen in normal use)
    #[error("[line {line}] error: internal compiler error: {message}")]
    Internal { line: usize, message: String },
}

impl CompileError {
    pub fn line(&self) -> usize {
        match self {
            CompileError::TooManyConstants { line }
            | CompileError::StackTooDeep { line, .. }
            | CompileError::Untyped { line, .. }
            | CompileError::Internal { line, .. } => *line,
        }
    }

    pub fn internal(line: usize, message: impl Into<String>) -> Self {
        CompileError::Internal {
            line,
            message: message.into(),
        }
    }
}

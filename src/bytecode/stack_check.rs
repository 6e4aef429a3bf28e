use thiserror::Error;

use crate::bytecode::{Chunk, OpCode};
use crate::bytecode::disasm::{DisasmError, decode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackCheckError {
    #[error("stack-check error: {0}")]
    Decode(#[from] DisasmError),

    #[error("stack-check error: stack underflow at offset {offset}, {opcode} needs {needed} items")]
    Underflow {
        offset: usize,
        opcode: OpCode,
        needed: usize,
    },
}

impl StackCheckError {
    pub fn offset(&self) -> usize {
        match self {
            StackCheckError::Decode(e) => e.offset(),
            StackCheckError::Underflow { offset, .. } => *offset,
        }
    }
}

/// Result of a successful check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackDepth {
    /// Highest stack height reached.
    pub max: usize,
    /// Offset of the first instruction that reached `max`.
    pub offset: usize,
}

/// Folds each instruction's stack effect over the chunk, starting from an
/// empty stack.
///
/// The code is straight-line, so a linear scan sees every path.
pub fn check_chunk(chunk: &Chunk) -> Result<StackDepth, StackCheckError> {
    let mut height: usize = 0;
    let mut depth = StackDepth { max: 0, offset: 0 };

    for instruction in decode(chunk)? {
        let (pops, pushes) = instruction.opcode.stack_effect();
        height = height
            .checked_sub(pops)
            .ok_or(StackCheckError::Underflow {
                offset: instruction.offset,
                opcode: instruction.opcode,
                needed: pops,
            })?;
        height += pushes;
        if height > depth.max {
            depth = StackDepth {
                max: height,
                offset: instruction.offset,
            };
        }
    }

    Ok(depth)
}

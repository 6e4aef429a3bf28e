use crate::bytecode::OpCode;
use crate::lang::value::Value;

/// Most entries a constant pool can hold; `LOADC` indexes it with one byte.
pub const MAX_CONSTANTS: usize = 256;

/// A compiled instruction stream.
///
/// `lines` runs parallel to `code`: `lines[i]` is the source line of the
/// node that emitted `code[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    pub code: Vec<u8>,
    pub lines: Vec<usize>,
    pub constants: Vec<Value>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, byte: u8, line: usize) {
        self.code.push(byte);
        self.lines.push(line);
    }

    pub fn write_op(&mut self, op: OpCode, line: usize) {
        self.write(op.into(), line);
    }

    /// Appends `value` to the pool and returns its index, or `None` once the
    /// pool is full.
    pub fn add_constant(&mut self, value: Value) -> Option<u8> {
        let index = u8::try_from(self.constants.len()).ok()?;
        self.constants.push(value);
        Some(index)
    }

    /// Source line of the byte at `offset`, if there is one.
    pub fn line_at(&self, offset: usize) -> Option<usize> {
        self.lines.get(offset).copied()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

use std::fmt;

use thiserror::Error;

use crate::bytecode::{Chunk, OpCode};

/// Decoded operand of one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    None,
    /// `BIPUSH` immediate.
    Byte(i8),
    /// `SIPUSH` immediate.
    Short(i16),
    /// `LOADC` pool index.
    Constant(u8),
}

/// One decoded instruction and the offset of its opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub offset: usize,
    pub opcode: OpCode,
    pub operand: Operand,
}

impl Instruction {
    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        1 + self.opcode.operand_width()
    }

    /// Appends the encoded bytes to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.opcode.into());
        match self.operand {
            Operand::None => {}
            Operand::Byte(b) => out.push(b as u8),
            Operand::Short(s) => out.extend_from_slice(&s.to_be_bytes()),
            Operand::Constant(idx) => out.push(idx),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisasmError {
    #[error("unknown opcode {byte:#04x} at offset {offset}")]
    UnknownOpcode { byte: u8, offset: usize },

    #[error("truncated operand for {opcode} at offset {offset}")]
    TruncatedOperand { opcode: OpCode, offset: usize },

    #[error("no instruction at offset {offset}")]
    OutOfBounds { offset: usize },
}

impl DisasmError {
    pub fn offset(&self) -> usize {
        match self {
            DisasmError::UnknownOpcode { offset, .. }
            | DisasmError::TruncatedOperand { offset, .. }
            | DisasmError::OutOfBounds { offset } => *offset,
        }
    }
}

/// Decodes the instruction starting at `offset`.
pub fn decode_at(code: &[u8], offset: usize) -> Result<Instruction, DisasmError> {
    let byte = *code.get(offset).ok_or(DisasmError::OutOfBounds { offset })?;
    let opcode = OpCode::try_from(byte).map_err(|byte| DisasmError::UnknownOpcode { byte, offset })?;

    let operand_bytes = code
        .get(offset + 1..offset + 1 + opcode.operand_width())
        .ok_or(DisasmError::TruncatedOperand { opcode, offset })?;

    let operand = match (opcode, operand_bytes) {
        (OpCode::Bipush, [b]) => Operand::Byte(*b as i8),
        (OpCode::Sipush, [hi, lo]) => Operand::Short(i16::from_be_bytes([*hi, *lo])),
        (OpCode::Loadc, [idx]) => Operand::Constant(*idx),
        _ => Operand::None,
    };

    Ok(Instruction {
        offset,
        opcode,
        operand,
    })
}

/// Decodes a whole chunk.
pub fn decode(chunk: &Chunk) -> Result<Vec<Instruction>, DisasmError> {
    let mut instructions = Vec::new();
    let mut offset = 0;
    while offset < chunk.code.len() {
        let instruction = decode_at(&chunk.code, offset)?;
        offset += instruction.size();
        instructions.push(instruction);
    }
    Ok(instructions)
}

/// Re-encodes decoded instructions.
pub fn encode(instructions: &[Instruction]) -> Vec<u8> {
    let mut code = Vec::new();
    for instruction in instructions {
        instruction.encode(&mut code);
    }
    code
}

/// Human-readable listing of a chunk, for `--bc`.
pub struct Disassembly<'a> {
    name: &'a str,
    chunk: &'a Chunk,
}

impl<'a> Disassembly<'a> {
    pub fn new(name: &'a str, chunk: &'a Chunk) -> Self {
        Disassembly { name, chunk }
    }

    fn write_instruction(&self, f: &mut fmt::Formatter<'_>, instruction: &Instruction) -> fmt::Result {
        let mnemonic = instruction.opcode.mnemonic();
        match instruction.operand {
            Operand::None => match instruction.opcode.stack_effect() {
                (2, 1) => writeln!(f, "{:<11} ; ( a b -- c )", mnemonic),
                (1, 1) => writeln!(f, "{:<11} ; ( a -- b )", mnemonic),
                (0, 1) => writeln!(f, "{:<11} ; ( -- a )", mnemonic),
                (1, 0) => writeln!(f, "{:<11} ; ( value -- )", mnemonic),
                _ => writeln!(f, "{}", mnemonic),
            },
            Operand::Byte(b) => writeln!(f, "{:<11} {}", mnemonic, b),
            Operand::Short(s) => writeln!(f, "{:<11} {}", mnemonic, s),
            Operand::Constant(idx) => match self.chunk.constants.get(idx as usize) {
                Some(value) => writeln!(f, "{:<11} #{} ({})", mnemonic, idx, value),
                None => writeln!(f, "{:<11} #{} (out of range)", mnemonic, idx),
            },
        }
    }
}

impl fmt::Display for Disassembly<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "════════════════════════════════════════")?;
        writeln!(f, " {}", self.name)?;
        writeln!(
            f,
            " {} bytes, {} constants",
            self.chunk.code.len(),
            self.chunk.constants.len()
        )?;
        writeln!(f, "════════════════════════════════════════")?;

        let mut previous_line = None;
        let mut offset = 0;
        while offset < self.chunk.code.len() {
            write!(f, "{:04} ", offset)?;
            let line = self.chunk.line_at(offset);
            if line.is_some() && line == previous_line {
                write!(f, "   | ")?;
            } else {
                match line {
                    Some(line) => write!(f, "{:4} ", line)?,
                    None => write!(f, "   ? ")?,
                }
            }
            previous_line = line;

            match decode_at(&self.chunk.code, offset) {
                Ok(instruction) => {
                    self.write_instruction(f, &instruction)?;
                    offset += instruction.size();
                }
                Err(e) => {
                    // nothing after a bad byte can be trusted
                    writeln!(f, "??? {}", e)?;
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Renders `chunk` as a listing titled "main".
pub fn disassemble(chunk: &Chunk) -> String {
    Disassembly::new("main", chunk).to_string()
}

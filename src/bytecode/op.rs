// =============================================================================
// OPCODE - Bytecode instructions
// =============================================================================

/// One-byte instruction opcode.
///
/// The discriminants are the encoded byte values. `BIPUSH` and `LOADC` take a
/// one-byte operand, `SIPUSH` a big-endian two-byte operand; every other
/// opcode stands alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    Nop = 0,

    // literals
    /// Push a sign-extended `i8` as an int.
    Bipush,
    /// Push a big-endian `i16` as an int.
    Sipush,
    /// Push `constants[idx]`.
    Loadc,

    // typed arithmetic
    Iadd,
    Fadd,
    Isub,
    Fsub,
    Imul,
    Fmul,
    Idiv,
    Fdiv,
    Ineg,
    Fneg,

    // booleans
    True,
    False,
    Not,

    // conversions
    B2i,
    B2f,
    I2b,
    I2f,
    F2b,
    F2i,

    // I/O
    Print,

    Return,
}

impl OpCode {
    /// Every opcode, in encoding order.
    pub const ALL: [OpCode; 25] = [
        OpCode::Nop,
        OpCode::Bipush,
        OpCode::Sipush,
        OpCode::Loadc,
        OpCode::Iadd,
        OpCode::Fadd,
        OpCode::Isub,
        OpCode::Fsub,
        OpCode::Imul,
        OpCode::Fmul,
        OpCode::Idiv,
        OpCode::Fdiv,
        OpCode::Ineg,
        OpCode::Fneg,
        OpCode::True,
        OpCode::False,
        OpCode::Not,
        OpCode::B2i,
        OpCode::B2f,
        OpCode::I2b,
        OpCode::I2f,
        OpCode::F2b,
        OpCode::F2i,
        OpCode::Print,
        OpCode::Return,
    ];

    /// Number of operand bytes following the opcode.
    pub fn operand_width(self) -> usize {
        match self {
            OpCode::Bipush | OpCode::Loadc => 1,
            OpCode::Sipush => 2,
            _ => 0,
        }
    }

    /// Returns (pops, pushes).
    pub fn stack_effect(self) -> (usize, usize) {
        use OpCode::*;
        match self {
            Nop | Return => (0, 0),
            Bipush | Sipush | Loadc | True | False => (0, 1),
            Iadd | Fadd | Isub | Fsub | Imul | Fmul | Idiv | Fdiv => (2, 1),
            Ineg | Fneg | Not => (1, 1),
            B2i | B2f | I2b | I2f | F2b | F2i => (1, 1),
            Print => (1, 0),
        }
    }

    pub fn mnemonic(self) -> &'static str {
        use OpCode::*;
        match self {
            Nop => "NOP",
            Bipush => "BIPUSH",
            Sipush => "SIPUSH",
            Loadc => "LOADC",
            Iadd => "IADD",
            Fadd => "FADD",
            Isub => "ISUB",
            Fsub => "FSUB",
            Imul => "IMUL",
            Fmul => "FMUL",
            Idiv => "IDIV",
            Fdiv => "FDIV",
            Ineg => "INEG",
            Fneg => "FNEG",
            True => "TRUE",
            False => "FALSE",
            Not => "NOT",
            B2i => "B2I",
            B2f => "B2F",
            I2b => "I2B",
            I2f => "I2F",
            F2b => "F2B",
            F2i => "F2I",
            Print => "PRINT",
            Return => "RETURN",
        }
    }
}

impl TryFrom<u8> for OpCode {
    type Error = u8;

    /// Decodes a byte, handing it back if no opcode has that value.
    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        OpCode::ALL.get(byte as usize).copied().ok_or(byte)
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> u8 {
        op as u8
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbering() {
        assert_eq!(OpCode::Nop as u8, 0);
        assert_eq!(OpCode::Bipush as u8, 1);
        assert_eq!(OpCode::Loadc as u8, 3);
        assert_eq!(OpCode::Iadd as u8, 4);
        assert_eq!(OpCode::True as u8, 14);
        assert_eq!(OpCode::F2i as u8, 22);
        assert_eq!(OpCode::Return as u8, 24);
    }

    #[test]
    fn test_all_is_in_encoding_order() {
        for (i, op) in OpCode::ALL.iter().enumerate() {
            assert_eq!(*op as usize, i, "{:?}", op);
            assert_eq!(OpCode::try_from(i as u8), Ok(*op));
        }
    }

    #[test]
    fn test_unknown_byte() {
        assert_eq!(OpCode::try_from(25), Err(25));
        assert_eq!(OpCode::try_from(0xff), Err(0xff));
    }

    #[test]
    fn test_operand_widths() {
        assert_eq!(OpCode::Bipush.operand_width(), 1);
        assert_eq!(OpCode::Sipush.operand_width(), 2);
        assert_eq!(OpCode::Loadc.operand_width(), 1);
        assert_eq!(OpCode::Iadd.operand_width(), 0);
        assert_eq!(OpCode::Return.operand_width(), 0);
    }

    #[test]
    fn test_stack_effects() {
        assert_eq!(OpCode::Iadd.stack_effect(), (2, 1));
        assert_eq!(OpCode::Bipush.stack_effect(), (0, 1));
        assert_eq!(OpCode::I2f.stack_effect(), (1, 1));
        assert_eq!(OpCode::Print.stack_effect(), (1, 0));
    }

    #[test]
    fn test_display() {
        assert_eq!(OpCode::Sipush.to_string(), "SIPUSH");
        assert_eq!(OpCode::F2b.to_string(), "F2B");
    }
}

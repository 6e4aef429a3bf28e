use crate::{
    bytecode::{Chunk, OpCode, compile_error::CompileError, stack_check::check_chunk},
    lang::{BinaryOp, Node, NodeKind, UnaryOp, Value, ValueType},
    runtime::vm::STACK_CAPACITY,
};

/// Lowers a typed expression tree into a chunk.
///
/// Expects every node to carry the type assigned by semantic analysis.
/// The emitted chunk evaluates the expression, prints the result and
/// returns.
pub struct Compiler {
    /// Output chunk
    chunk: Chunk,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            chunk: Chunk::new(),
        }
    }

    pub fn compile_expression(mut self, root: &Node) -> Result<Chunk, CompileError> {
        self.compile_node(root)?;

        self.chunk.write_op(OpCode::Print, root.line);
        self.chunk.write_op(OpCode::Return, root.line);

        let depth = check_chunk(&self.chunk).map_err(|e| {
            let line = self.chunk.line_at(e.offset()).unwrap_or(root.line);
            CompileError::internal(line, e.to_string())
        })?;
        if depth.max > STACK_CAPACITY {
            return Err(CompileError::StackTooDeep {
                line: self.chunk.line_at(depth.offset).unwrap_or(root.line),
                depth: depth.max,
                capacity: STACK_CAPACITY,
            });
        }

        tracing::debug!(
            code = self.chunk.len(),
            constants = self.chunk.constants.len(),
            max_stack = depth.max,
            "compiled expression"
        );
        Ok(self.chunk)
    }

    fn compile_node(&mut self, node: &Node) -> Result<(), CompileError> {
        let line = node.line;
        match &node.kind {
            NodeKind::Literal(value) => self.compile_literal(*value, line)?,

            NodeKind::Binary { op, left, right } => {
                if left.ty != node.ty || right.ty != node.ty {
                    return Err(CompileError::internal(
                        line,
                        format!(
                            "operand types {} and {} do not match result type {}",
                            left.ty, right.ty, node.ty
                        ),
                    ));
                }
                self.compile_node(left)?;
                self.compile_node(right)?;
                let opcode = match (node.ty, op) {
                    (ValueType::Int, BinaryOp::Add) => OpCode::Iadd,
                    (ValueType::Int, BinaryOp::Sub) => OpCode::Isub,
                    (ValueType::Int, BinaryOp::Mul) => OpCode::Imul,
                    (ValueType::Int, BinaryOp::Div) => OpCode::Idiv,
                    (ValueType::Float, BinaryOp::Add) => OpCode::Fadd,
                    (ValueType::Float, BinaryOp::Sub) => OpCode::Fsub,
                    (ValueType::Float, BinaryOp::Mul) => OpCode::Fmul,
                    (ValueType::Float, BinaryOp::Div) => OpCode::Fdiv,
                    (ty, _) => {
                        return Err(CompileError::Untyped {
                            line,
                            what: "binary operation",
                            ty,
                        });
                    }
                };
                self.chunk.write_op(opcode, line);
            }

            NodeKind::Unary { op, operand } => {
                self.compile_node(operand)?;
                let opcode = match (op, operand.ty) {
                    (UnaryOp::Negate, ValueType::Int) => OpCode::Ineg,
                    (UnaryOp::Negate, ValueType::Float) => OpCode::Fneg,
                    (UnaryOp::Not, ValueType::Bool) => OpCode::Not,
                    (UnaryOp::Negate, ty) => {
                        return Err(CompileError::Untyped {
                            line,
                            what: "negation",
                            ty,
                        });
                    }
                    (UnaryOp::Not, ty) => {
                        return Err(CompileError::Untyped {
                            line,
                            what: "logical not",
                            ty,
                        });
                    }
                };
                self.chunk.write_op(opcode, line);
            }

            NodeKind::Cast { target, operand } => {
                self.compile_node(operand)?;
                let opcode = match (operand.ty, *target) {
                    (from, to) if from == to && from != ValueType::None => None,
                    (ValueType::Bool, ValueType::Int) => Some(OpCode::B2i),
                    (ValueType::Bool, ValueType::Float) => Some(OpCode::B2f),
                    (ValueType::Int, ValueType::Bool) => Some(OpCode::I2b),
                    (ValueType::Int, ValueType::Float) => Some(OpCode::I2f),
                    (ValueType::Float, ValueType::Bool) => Some(OpCode::F2b),
                    (ValueType::Float, ValueType::Int) => Some(OpCode::F2i),
                    (ValueType::None, _) => {
                        return Err(CompileError::Untyped {
                            line,
                            what: "cast operand",
                            ty: ValueType::None,
                        });
                    }
                    (_, to) => {
                        return Err(CompileError::Untyped {
                            line,
                            what: "cast",
                            ty: to,
                        });
                    }
                };
                // identity casts emit nothing
                if let Some(opcode) = opcode {
                    self.chunk.write_op(opcode, line);
                }
            }
        }
        Ok(())
    }

    // ───────────────────────────── Literals ─────────────────────────────

    fn compile_literal(&mut self, value: Value, line: usize) -> Result<(), CompileError> {
        match value {
            Value::Int(n) => self.emit_int(n, line),
            Value::Float(_) => self.emit_constant(value, line),
            Value::Bool(true) => {
                self.chunk.write_op(OpCode::True, line);
                Ok(())
            }
            Value::Bool(false) => {
                self.chunk.write_op(OpCode::False, line);
                Ok(())
            }
            Value::None => Err(CompileError::Untyped {
                line,
                what: "literal",
                ty: ValueType::None,
            }),
        }
    }

    /// Picks the narrowest encoding: `BIPUSH` for `i8`, `SIPUSH` for `i16`,
    /// the constant pool otherwise.
    fn emit_int(&mut self, n: i32, line: usize) -> Result<(), CompileError> {
        if let Ok(byte) = i8::try_from(n) {
            self.chunk.write_op(OpCode::Bipush, line);
            self.chunk.write(byte as u8, line);
        } else if let Ok(short) = i16::try_from(n) {
            let [hi, lo] = short.to_be_bytes();
            self.chunk.write_op(OpCode::Sipush, line);
            self.chunk.write(hi, line);
            self.chunk.write(lo, line);
        } else {
            self.emit_constant(Value::Int(n), line)?;
        }
        Ok(())
    }

    fn emit_constant(&mut self, value: Value, line: usize) -> Result<(), CompileError> {
        let index = self
            .chunk
            .add_constant(value)
            .ok_or(CompileError::TooManyConstants { line })?;
        self.chunk.write_op(OpCode::Loadc, line);
        self.chunk.write(index, line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::chunk::MAX_CONSTANTS;
    use crate::bytecode::disasm::{Operand, decode, encode};
    use crate::frontend::{Lexer, Parser};
    use crate::semantic::Analyzer;

    fn compile(source: &str) -> Result<Chunk, CompileError> {
        let mut root = Parser::new(Lexer::new(source).tokenize())
            .parse()
            .unwrap_or_else(|e| panic!("parse of {:?} failed: {}", source, e));
        Analyzer::new()
            .analyze(&mut root)
            .unwrap_or_else(|e| panic!("analysis of {:?} failed: {}", source, e));
        Compiler::new().compile_expression(&root)
    }

    fn opcodes(chunk: &Chunk) -> Vec<OpCode> {
        decode(chunk).unwrap().iter().map(|i| i.opcode).collect()
    }

    fn typed_literal(value: Value) -> Node {
        let mut node = Node::literal(value, 1);
        node.ty = value.value_type();
        node
    }

    // =========================================================================
    // Integer encoding widths
    // =========================================================================

    fn int_encoding(n: i32) -> (OpCode, Operand) {
        let chunk = Compiler::new()
            .compile_expression(&typed_literal(Value::Int(n)))
            .unwrap();
        let first = decode(&chunk).unwrap()[0];
        (first.opcode, first.operand)
    }

    #[test]
    fn test_bipush_range() {
        assert_eq!(int_encoding(-128), (OpCode::Bipush, Operand::Byte(-128)));
        assert_eq!(int_encoding(127), (OpCode::Bipush, Operand::Byte(127)));
        assert_eq!(int_encoding(0), (OpCode::Bipush, Operand::Byte(0)));
    }

    #[test]
    fn test_sipush_range() {
        assert_eq!(int_encoding(-129), (OpCode::Sipush, Operand::Short(-129)));
        assert_eq!(int_encoding(128), (OpCode::Sipush, Operand::Short(128)));
        assert_eq!(int_encoding(-32768), (OpCode::Sipush, Operand::Short(-32768)));
        assert_eq!(int_encoding(32767), (OpCode::Sipush, Operand::Short(32767)));
    }

    #[test]
    fn test_sipush_is_big_endian() {
        let chunk = compile("300").unwrap();
        assert_eq!(&chunk.code[..3], &[OpCode::Sipush as u8, 0x01, 0x2c]);
    }

    #[test]
    fn test_constant_pool_range() {
        assert_eq!(int_encoding(-32769), (OpCode::Loadc, Operand::Constant(0)));
        assert_eq!(int_encoding(32768), (OpCode::Loadc, Operand::Constant(0)));

        let chunk = compile("100000").unwrap();
        assert_eq!(chunk.constants, vec![Value::Int(100000)]);
    }

    // =========================================================================
    // Instruction selection
    // =========================================================================

    #[test]
    fn test_literal_program() {
        let chunk = compile("10").unwrap();
        assert_eq!(
            chunk.code,
            vec![OpCode::Bipush as u8, 10, OpCode::Print as u8, OpCode::Return as u8]
        );
        assert_eq!(chunk.lines, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_float_literal_uses_pool() {
        let chunk = compile("2.5").unwrap();
        assert_eq!(opcodes(&chunk), vec![OpCode::Loadc, OpCode::Print, OpCode::Return]);
        assert_eq!(chunk.constants, vec![Value::Float(2.5)]);
    }

    #[test]
    fn test_int_arithmetic() {
        let chunk = compile("-10 + 20 * 3 / 4 - 1").unwrap();
        assert_eq!(
            opcodes(&chunk),
            vec![
                OpCode::Bipush,
                OpCode::Ineg,
                OpCode::Bipush,
                OpCode::Bipush,
                OpCode::Imul,
                OpCode::Bipush,
                OpCode::Idiv,
                OpCode::Iadd,
                OpCode::Bipush,
                OpCode::Isub,
                OpCode::Print,
                OpCode::Return,
            ]
        );
    }

    #[test]
    fn test_mixed_arithmetic_converts_int_side() {
        let chunk = compile("(float)3 + 4").unwrap();
        assert_eq!(
            opcodes(&chunk),
            vec![
                OpCode::Bipush,
                OpCode::I2f,
                OpCode::Bipush,
                OpCode::I2f,
                OpCode::Fadd,
                OpCode::Print,
                OpCode::Return,
            ]
        );

        let chunk = compile("1.5 * 2").unwrap();
        let ops = opcodes(&chunk);
        assert_eq!(ops.iter().filter(|op| **op == OpCode::I2f).count(), 1);
        assert!(ops.contains(&OpCode::Fmul));
    }

    #[test]
    fn test_booleans() {
        let chunk = compile("!true").unwrap();
        assert_eq!(
            opcodes(&chunk),
            vec![OpCode::True, OpCode::Not, OpCode::Print, OpCode::Return]
        );
        let chunk = compile("false").unwrap();
        assert_eq!(opcodes(&chunk)[0], OpCode::False);
    }

    #[test]
    fn test_every_conversion() {
        let cases = [
            ("(int)true", OpCode::B2i),
            ("(float)true", OpCode::B2f),
            ("(bool)1", OpCode::I2b),
            ("(float)1", OpCode::I2f),
            ("(bool)1.0", OpCode::F2b),
            ("(int)1.0", OpCode::F2i),
        ];
        for (source, expected) in cases {
            let ops = opcodes(&compile(source).unwrap());
            assert_eq!(ops[1], expected, "source {:?}", source);
        }
    }

    #[test]
    fn test_identity_cast_emits_nothing() {
        let chunk = compile("(int)5").unwrap();
        assert_eq!(opcodes(&chunk), vec![OpCode::Bipush, OpCode::Print, OpCode::Return]);
    }

    #[test]
    fn test_lines_follow_nodes() {
        let chunk = compile("1\n+\n2").unwrap();
        // BIPUSH 1 | BIPUSH 2 | IADD | PRINT | RETURN
        assert_eq!(chunk.lines, vec![1, 1, 3, 3, 2, 2, 2]);
    }

    #[test]
    fn test_decode_encode_round_trip() {
        let chunk = compile("(int)(-300 * 2.5f) + 70000 - (int)(!false)").unwrap();
        let instructions = decode(&chunk).unwrap();
        assert_eq!(encode(&instructions), chunk.code);
    }

    // =========================================================================
    // Capacity limits
    // =========================================================================

    fn sum_of_distinct_constants(count: usize) -> String {
        (0..count)
            .map(|i| (100_000 + i).to_string())
            .collect::<Vec<_>>()
            .join(" + ")
    }

    #[test]
    fn test_pool_fills_to_capacity() {
        let chunk = compile(&sum_of_distinct_constants(MAX_CONSTANTS)).unwrap();
        assert_eq!(chunk.constants.len(), MAX_CONSTANTS);
    }

    #[test]
    fn test_pool_overflow() {
        let err = compile(&sum_of_distinct_constants(MAX_CONSTANTS + 1)).unwrap_err();
        assert_eq!(err, CompileError::TooManyConstants { line: 1 });
    }

    fn right_leaning_sum(levels: usize) -> String {
        format!("{}1+1{}", "1+(".repeat(levels), ")".repeat(levels))
    }

    #[test]
    fn test_deepest_expression_that_fits() {
        // k nested groups need k + 2 slots
        assert!(compile(&right_leaning_sum(STACK_CAPACITY - 2)).is_ok());
    }

    #[test]
    fn test_stack_too_deep() {
        let err = compile(&right_leaning_sum(STACK_CAPACITY - 1)).unwrap_err();
        assert!(
            matches!(err, CompileError::StackTooDeep { depth, capacity, .. } if depth == STACK_CAPACITY + 1 && capacity == STACK_CAPACITY),
            "got {:?}",
            err
        );
    }

    // =========================================================================
    // Untyped trees
    // =========================================================================

    #[test]
    fn test_untyped_binary_is_rejected() {
        let node = Node::binary(
            BinaryOp::Add,
            Node::literal(Value::Int(1), 1),
            Node::literal(Value::Int(2), 1),
            1,
        );
        let err = Compiler::new().compile_expression(&node).unwrap_err();
        assert!(matches!(err, CompileError::Untyped { what: "binary operation", .. }));
    }

    #[test]
    fn test_mismatched_operands_are_rejected() {
        let mut node = Node::binary(
            BinaryOp::Add,
            typed_literal(Value::Int(1)),
            typed_literal(Value::Float(2.0)),
            1,
        );
        node.ty = ValueType::Float;
        let err = Compiler::new().compile_expression(&node).unwrap_err();
        assert!(matches!(err, CompileError::Internal { .. }));
    }

    #[test]
    fn test_placeholder_literal_is_rejected() {
        let err = Compiler::new()
            .compile_expression(&Node::literal(Value::None, 4))
            .unwrap_err();
        assert_eq!(err.line(), 4);
    }
}

use std::io::Write;

use crate::bytecode::{Chunk, OpCode};
use crate::lang::{Value, ValueType};
use crate::runtime::runtime_error::RuntimeError;

/// Number of value slots on the VM stack.
pub const STACK_CAPACITY: usize = 256;

/// Stack machine for compiled chunks.
///
/// The stack is a fixed array; pushing onto a full stack is a runtime error,
/// never a reallocation.
pub struct Vm {
    stack: [Value; STACK_CAPACITY],
    top: usize,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    pub fn new() -> Self {
        Self {
            stack: [Value::None; STACK_CAPACITY],
            top: 0,
        }
    }

    /// Values currently on the stack, bottom first.
    pub fn stack(&self) -> &[Value] {
        &self.stack[..self.top]
    }

    /// Executes `chunk` from offset 0 on an empty stack until `RETURN`.
    ///
    /// `PRINT` writes to `out`.
    pub fn run<W: Write>(&mut self, chunk: &Chunk, out: &mut W) -> Result<(), RuntimeError> {
        self.top = 0;
        let code = chunk.code.as_slice();
        let mut ip = 0;

        loop {
            let offset = ip;
            let byte = fetch(code, &mut ip, offset)?;
            let op = OpCode::try_from(byte)
                .map_err(|byte| RuntimeError::UnknownOpcode { byte, offset })?;

            tracing::trace!(offset, %op, depth = self.top, "exec");

            match op {
                OpCode::Nop => {}

                // ───── Literals ─────
                OpCode::Bipush => {
                    let b = fetch(code, &mut ip, offset)? as i8;
                    self.push(Value::Int(b.into()), offset)?;
                }
                OpCode::Sipush => {
                    let hi = fetch(code, &mut ip, offset)?;
                    let lo = fetch(code, &mut ip, offset)?;
                    self.push(Value::Int(i16::from_be_bytes([hi, lo]).into()), offset)?;
                }
                OpCode::Loadc => {
                    let index = fetch(code, &mut ip, offset)?;
                    let value = *chunk
                        .constants
                        .get(index as usize)
                        .ok_or(RuntimeError::BadConstant { index, offset })?;
                    self.push(value, offset)?;
                }

                // ───── Arithmetic ─────
                OpCode::Iadd => self.int_binary(offset, |a, b| Ok(a.wrapping_add(b)))?,
                OpCode::Isub => self.int_binary(offset, |a, b| Ok(a.wrapping_sub(b)))?,
                OpCode::Imul => self.int_binary(offset, |a, b| Ok(a.wrapping_mul(b)))?,
                OpCode::Idiv => self.int_binary(offset, |a, b| {
                    if b == 0 {
                        Err(RuntimeError::DivisionByZero { offset })
                    } else {
                        Ok(a.wrapping_div(b))
                    }
                })?,
                OpCode::Fadd => self.float_binary(offset, |a, b| a + b)?,
                OpCode::Fsub => self.float_binary(offset, |a, b| a - b)?,
                OpCode::Fmul => self.float_binary(offset, |a, b| a * b)?,
                OpCode::Fdiv => self.float_binary(offset, |a, b| a / b)?,
                OpCode::Ineg => {
                    let a = self.pop_int(offset)?;
                    self.push(Value::Int(a.wrapping_neg()), offset)?;
                }
                OpCode::Fneg => {
                    let a = self.pop_float(offset)?;
                    self.push(Value::Float(-a), offset)?;
                }

                // ───── Booleans ─────
                OpCode::True => self.push(Value::Bool(true), offset)?,
                OpCode::False => self.push(Value::Bool(false), offset)?,
                OpCode::Not => {
                    let a = self.pop_bool(offset)?;
                    self.push(Value::Bool(!a), offset)?;
                }

                // ───── Conversions ─────
                OpCode::B2i => {
                    let a = self.pop_bool(offset)?;
                    self.push(Value::Int(a.into()), offset)?;
                }
                OpCode::B2f => {
                    let a = self.pop_bool(offset)?;
                    self.push(Value::Float(if a { 1.0 } else { 0.0 }), offset)?;
                }
                OpCode::I2b => {
                    let a = self.pop_int(offset)?;
                    self.push(Value::Bool(a != 0), offset)?;
                }
                OpCode::I2f => {
                    let a = self.pop_int(offset)?;
                    self.push(Value::Float(a as f32), offset)?;
                }
                OpCode::F2b => {
                    let a = self.pop_float(offset)?;
                    self.push(Value::Bool(a != 0.0), offset)?;
                }
                OpCode::F2i => {
                    // `as` truncates toward zero, saturates, and maps NaN to 0
                    let a = self.pop_float(offset)?;
                    self.push(Value::Int(a as i32), offset)?;
                }

                // ───── I/O ─────
                OpCode::Print => {
                    let value = self.pop(offset)?;
                    writeln!(out, "{}", value)
                        .map_err(|source| RuntimeError::Output { source, offset })?;
                }

                OpCode::Return => return Ok(()),
            }
        }
    }

    // =========================================================================
    // Stack helpers
    // =========================================================================

    fn push(&mut self, value: Value, offset: usize) -> Result<(), RuntimeError> {
        let slot = self
            .stack
            .get_mut(self.top)
            .ok_or(RuntimeError::StackOverflow { offset })?;
        *slot = value;
        self.top += 1;
        Ok(())
    }

    fn pop(&mut self, offset: usize) -> Result<Value, RuntimeError> {
        if self.top == 0 {
            return Err(RuntimeError::StackUnderflow { offset });
        }
        self.top -= 1;
        Ok(std::mem::take(&mut self.stack[self.top]))
    }

    fn pop_int(&mut self, offset: usize) -> Result<i32, RuntimeError> {
        match self.pop(offset)? {
            Value::Int(n) => Ok(n),
            other => Err(operand_type(ValueType::Int, other, offset)),
        }
    }

    fn pop_float(&mut self, offset: usize) -> Result<f32, RuntimeError> {
        match self.pop(offset)? {
            Value::Float(n) => Ok(n),
            other => Err(operand_type(ValueType::Float, other, offset)),
        }
    }

    fn pop_bool(&mut self, offset: usize) -> Result<bool, RuntimeError> {
        match self.pop(offset)? {
            Value::Bool(b) => Ok(b),
            other => Err(operand_type(ValueType::Bool, other, offset)),
        }
    }

    /// Pops right then left, pushes `f(left, right)`.
    fn int_binary(
        &mut self,
        offset: usize,
        f: impl FnOnce(i32, i32) -> Result<i32, RuntimeError>,
    ) -> Result<(), RuntimeError> {
        let b = self.pop_int(offset)?;
        let a = self.pop_int(offset)?;
        self.push(Value::Int(f(a, b)?), offset)
    }

    fn float_binary(&mut self, offset: usize, f: impl FnOnce(f32, f32) -> f32) -> Result<(), RuntimeError> {
        let b = self.pop_float(offset)?;
        let a = self.pop_float(offset)?;
        self.push(Value::Float(f(a, b)), offset)
    }
}

fn fetch(code: &[u8], ip: &mut usize, offset: usize) -> Result<u8, RuntimeError> {
    let byte = *code
        .get(*ip)
        .ok_or(RuntimeError::UnexpectedEnd { offset })?;
    *ip += 1;
    Ok(byte)
}

fn operand_type(expected: ValueType, found: Value, offset: usize) -> RuntimeError {
    RuntimeError::OperandType {
        expected,
        found: found.value_type(),
        offset,
    }
}

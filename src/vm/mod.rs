//! Reference stack VM for compiled expressions.
//!
//! Executes a [`BytecodeChunk`] against its [`ConstantPool`] and a set of
//! local slots. Opcodes are typed, so every instruction checks the runtime
//! kind of its operands and reports a [`RuntimeError::TypeMismatch`] when
//! the compiler and the VM disagree.

mod value;

pub use value::Value;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive, Zero};
use tracing::trace;
use tsbc_compiler::CompiledExpression;
use tsbc_compiler::bytecode::{BytecodeChunk, Constant, ConstantPool, OpCode, tag_type};
use tsbc_core::{RuntimeError, TypeKind};

use std::rc::Rc;

/// Pop two operands of the same kind, compute, push the result.
macro_rules! binary {
    ($vm:expr, $offset:expr, $pop:ident, |$a:ident, $b:ident| $body:expr) => {{
        let $b = $vm.$pop($offset)?;
        let $a = $vm.$pop($offset)?;
        let result = $body;
        $vm.stack.push(result);
    }};
}

/// Pop one operand, compute, push the result.
macro_rules! unary {
    ($vm:expr, $offset:expr, $pop:ident, |$a:ident| $body:expr) => {{
        let $a = $vm.$pop($offset)?;
        let result = $body;
        $vm.stack.push(result);
    }};
}

pub struct Vm {
    stack: Vec<Value>,
    locals: Vec<Value>,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            locals: Vec::new(),
        }
    }

    /// Create a VM whose local slots hold `locals`, slot 0 first.
    pub fn with_locals(locals: impl IntoIterator<Item = Value>) -> Self {
        Self {
            stack: Vec::new(),
            locals: locals.into_iter().collect(),
        }
    }

    /// Set a local slot, growing the slot table with nulls as needed.
    pub fn set_local(&mut self, slot: u16, value: Value) {
        let index = usize::from(slot);
        if index >= self.locals.len() {
            self.locals.resize(index + 1, Value::Null);
        }
        self.locals[index] = value;
    }

    pub fn local(&self, slot: u16) -> Option<&Value> {
        self.locals.get(usize::from(slot))
    }

    /// Clear the operand stack. Locals are kept.
    pub fn reset(&mut self) {
        self.stack.clear();
    }

    /// Run a compiled expression and return its value.
    pub fn run(&mut self, compiled: &CompiledExpression) -> Result<Value, RuntimeError> {
        self.execute(&compiled.chunk, &compiled.constants)
    }

    /// Execute a chunk from offset 0 until `RETURN` or the end of the code.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn execute(
        &mut self,
        chunk: &BytecodeChunk,
        constants: &ConstantPool,
    ) -> Result<Value, RuntimeError> {
        self.stack.clear();
        let mut ip = 0usize;

        while ip < chunk.len() {
            let offset = ip;
            let byte = chunk.read_byte(ip).ok_or(RuntimeError::MissingOperand { offset })?;
            let op = OpCode::from_u8(byte).ok_or(RuntimeError::InvalidOpcode { byte, offset })?;
            ip += 1;

            trace!(offset, op = op.name(), depth = self.stack.len(), "execute");

            match op {
                // =============================================================
                // Constants and stack
                // =============================================================
                OpCode::Constant => {
                    let index = u32::from(operand_u8(chunk, &mut ip, offset)?);
                    self.push_constant(constants, index)?;
                }
                OpCode::ConstantWide => {
                    let index = u32::from(operand_u16(chunk, &mut ip, offset)?);
                    self.push_constant(constants, index)?;
                }
                OpCode::PushNull => self.stack.push(Value::Null),
                OpCode::PushTrue => self.stack.push(Value::Bool(true)),
                OpCode::PushFalse => self.stack.push(Value::Bool(false)),
                OpCode::PushZero => self.stack.push(Value::Int(0)),
                OpCode::PushOne => self.stack.push(Value::Int(1)),
                OpCode::Pop => {
                    self.pop(offset)?;
                }

                // =============================================================
                // Locals
                // =============================================================
                OpCode::GetLocal => {
                    let slot = u16::from(operand_u8(chunk, &mut ip, offset)?);
                    self.get_local(slot)?;
                }
                OpCode::GetLocalWide => {
                    let slot = operand_u16(chunk, &mut ip, offset)?;
                    self.get_local(slot)?;
                }
                OpCode::PreInc => {
                    let slot = u16::from(operand_u8(chunk, &mut ip, offset)?);
                    self.pre_increment(slot)?;
                }
                OpCode::PreIncWide => {
                    let slot = operand_u16(chunk, &mut ip, offset)?;
                    self.pre_increment(slot)?;
                }

                // =============================================================
                // Arithmetic
                // =============================================================
                OpCode::AddI32 => binary!(self, offset, pop_int, |a, b| Value::Int(a.wrapping_add(b))),
                OpCode::SubI32 => binary!(self, offset, pop_int, |a, b| Value::Int(a.wrapping_sub(b))),
                OpCode::MulI32 => binary!(self, offset, pop_int, |a, b| Value::Int(a.wrapping_mul(b))),
                OpCode::DivI32 => binary!(self, offset, pop_int, |a, b| {
                    if b == 0 {
                        return Err(RuntimeError::division_by_zero());
                    }
                    Value::Int(a.wrapping_div(b))
                }),
                OpCode::ModI32 => binary!(self, offset, pop_int, |a, b| {
                    if b == 0 {
                        return Err(RuntimeError::division_by_zero());
                    }
                    Value::Int(a.wrapping_rem(b))
                }),
                OpCode::AddI64 => binary!(self, offset, pop_long, |a, b| Value::Long(a.wrapping_add(b))),
                OpCode::SubI64 => binary!(self, offset, pop_long, |a, b| Value::Long(a.wrapping_sub(b))),
                OpCode::MulI64 => binary!(self, offset, pop_long, |a, b| Value::Long(a.wrapping_mul(b))),
                OpCode::DivI64 => binary!(self, offset, pop_long, |a, b| {
                    if b == 0 {
                        return Err(RuntimeError::division_by_zero());
                    }
                    Value::Long(a.wrapping_div(b))
                }),
                OpCode::ModI64 => binary!(self, offset, pop_long, |a, b| {
                    if b == 0 {
                        return Err(RuntimeError::division_by_zero());
                    }
                    Value::Long(a.wrapping_rem(b))
                }),
                OpCode::AddF32 => binary!(self, offset, pop_float, |a, b| Value::Float(a + b)),
                OpCode::SubF32 => binary!(self, offset, pop_float, |a, b| Value::Float(a - b)),
                OpCode::MulF32 => binary!(self, offset, pop_float, |a, b| Value::Float(a * b)),
                OpCode::DivF32 => binary!(self, offset, pop_float, |a, b| Value::Float(a / b)),
                OpCode::ModF32 => binary!(self, offset, pop_float, |a, b| Value::Float(a % b)),
                OpCode::AddF64 => binary!(self, offset, pop_double, |a, b| Value::Double(a + b)),
                OpCode::SubF64 => binary!(self, offset, pop_double, |a, b| Value::Double(a - b)),
                OpCode::MulF64 => binary!(self, offset, pop_double, |a, b| Value::Double(a * b)),
                OpCode::DivF64 => binary!(self, offset, pop_double, |a, b| Value::Double(a / b)),
                OpCode::ModF64 => binary!(self, offset, pop_double, |a, b| Value::Double(a % b)),
                OpCode::PowF64 => binary!(self, offset, pop_double, |a, b| Value::Double(power(a, b))),
                OpCode::AddBig => binary!(self, offset, pop_big, |a, b| Value::big(&*a + &*b)),
                OpCode::SubBig => binary!(self, offset, pop_big, |a, b| Value::big(&*a - &*b)),
                OpCode::MulBig => binary!(self, offset, pop_big, |a, b| Value::big(&*a * &*b)),
                OpCode::DivBig => binary!(self, offset, pop_big, |a, b| {
                    if b.is_zero() {
                        return Err(RuntimeError::division_by_zero());
                    }
                    Value::big(&*a / &*b)
                }),
                OpCode::ModBig => binary!(self, offset, pop_big, |a, b| {
                    if b.is_zero() {
                        return Err(RuntimeError::division_by_zero());
                    }
                    Value::big(&*a % &*b)
                }),
                OpCode::PowBig => {
                    let exponent = self.pop_int(offset)?;
                    let base = self.pop_big(offset)?;
                    let exponent =
                        u32::try_from(exponent).map_err(|_| RuntimeError::negative_exponent())?;
                    self.stack.push(Value::big(base.pow(exponent)));
                }

                // =============================================================
                // Strings
                // =============================================================
                OpCode::Concat => {
                    let right = self.pop(offset)?;
                    let left = self.pop(offset)?;
                    let text = format!("{}{}", left, right);
                    self.stack.push(Value::Str(Rc::from(text)));
                }
                OpCode::ToString => {
                    let text = match self.pop(offset)? {
                        text @ Value::Str(_) => text,
                        other => Value::Str(Rc::from(other.to_string())),
                    };
                    self.stack.push(text);
                }

                // =============================================================
                // Bitwise
                // =============================================================
                OpCode::BitAndI32 => binary!(self, offset, pop_int, |a, b| Value::Int(a & b)),
                OpCode::BitOrI32 => binary!(self, offset, pop_int, |a, b| Value::Int(a | b)),
                OpCode::BitXorI32 => binary!(self, offset, pop_int, |a, b| Value::Int(a ^ b)),
                OpCode::BitAndI64 => binary!(self, offset, pop_long, |a, b| Value::Long(a & b)),
                OpCode::BitOrI64 => binary!(self, offset, pop_long, |a, b| Value::Long(a | b)),
                OpCode::BitXorI64 => binary!(self, offset, pop_long, |a, b| Value::Long(a ^ b)),
                OpCode::BitAndBig => binary!(self, offset, pop_big, |a, b| Value::big(&*a & &*b)),
                OpCode::BitOrBig => binary!(self, offset, pop_big, |a, b| Value::big(&*a | &*b)),
                OpCode::BitXorBig => binary!(self, offset, pop_big, |a, b| Value::big(&*a ^ &*b)),

                // =============================================================
                // Shifts
                // =============================================================
                // The wrapping shifts mask the amount to the operand width.
                OpCode::ShlI32 => {
                    let amount = self.pop_int(offset)? as u32;
                    unary!(self, offset, pop_int, |a| Value::Int(a.wrapping_shl(amount)))
                }
                OpCode::ShrI32 => {
                    let amount = self.pop_int(offset)? as u32;
                    unary!(self, offset, pop_int, |a| Value::Int(a.wrapping_shr(amount)))
                }
                OpCode::UshrI32 => {
                    let amount = self.pop_int(offset)? as u32;
                    unary!(self, offset, pop_int, |a| Value::Int(
                        (a as u32).wrapping_shr(amount) as i32
                    ))
                }
                OpCode::ShlI64 => {
                    let amount = self.pop_int(offset)? as u32;
                    unary!(self, offset, pop_long, |a| Value::Long(a.wrapping_shl(amount)))
                }
                OpCode::ShrI64 => {
                    let amount = self.pop_int(offset)? as u32;
                    unary!(self, offset, pop_long, |a| Value::Long(a.wrapping_shr(amount)))
                }
                OpCode::UshrI64 => {
                    let amount = self.pop_int(offset)? as u32;
                    unary!(self, offset, pop_long, |a| Value::Long(
                        (a as u64).wrapping_shr(amount) as i64
                    ))
                }
                OpCode::ShlBig => {
                    let amount = self.pop_int(offset)?;
                    unary!(self, offset, pop_big, |a| Value::big(shift_big(&a, amount)))
                }
                OpCode::ShrBig => {
                    let amount = self.pop_int(offset)?;
                    unary!(self, offset, pop_big, |a| Value::big(shift_big(
                        &a,
                        amount.wrapping_neg()
                    )))
                }

                // =============================================================
                // Comparisons
                // =============================================================
                OpCode::EqI32 => binary!(self, offset, pop_int, |a, b| Value::Bool(a == b)),
                OpCode::LtI32 => binary!(self, offset, pop_int, |a, b| Value::Bool(a < b)),
                OpCode::LeI32 => binary!(self, offset, pop_int, |a, b| Value::Bool(a <= b)),
                OpCode::GtI32 => binary!(self, offset, pop_int, |a, b| Value::Bool(a > b)),
                OpCode::GeI32 => binary!(self, offset, pop_int, |a, b| Value::Bool(a >= b)),
                OpCode::EqI64 => binary!(self, offset, pop_long, |a, b| Value::Bool(a == b)),
                OpCode::LtI64 => binary!(self, offset, pop_long, |a, b| Value::Bool(a < b)),
                OpCode::LeI64 => binary!(self, offset, pop_long, |a, b| Value::Bool(a <= b)),
                OpCode::GtI64 => binary!(self, offset, pop_long, |a, b| Value::Bool(a > b)),
                OpCode::GeI64 => binary!(self, offset, pop_long, |a, b| Value::Bool(a >= b)),
                OpCode::EqF32 => binary!(self, offset, pop_float, |a, b| Value::Bool(a == b)),
                OpCode::LtF32 => binary!(self, offset, pop_float, |a, b| Value::Bool(a < b)),
                OpCode::LeF32 => binary!(self, offset, pop_float, |a, b| Value::Bool(a <= b)),
                OpCode::GtF32 => binary!(self, offset, pop_float, |a, b| Value::Bool(a > b)),
                OpCode::GeF32 => binary!(self, offset, pop_float, |a, b| Value::Bool(a >= b)),
                OpCode::EqF64 => binary!(self, offset, pop_double, |a, b| Value::Bool(a == b)),
                OpCode::LtF64 => binary!(self, offset, pop_double, |a, b| Value::Bool(a < b)),
                OpCode::LeF64 => binary!(self, offset, pop_double, |a, b| Value::Bool(a <= b)),
                OpCode::GtF64 => binary!(self, offset, pop_double, |a, b| Value::Bool(a > b)),
                OpCode::GeF64 => binary!(self, offset, pop_double, |a, b| Value::Bool(a >= b)),
                OpCode::EqBig => binary!(self, offset, pop_big, |a, b| Value::Bool(a == b)),
                OpCode::LtBig => binary!(self, offset, pop_big, |a, b| Value::Bool(a < b)),
                OpCode::LeBig => binary!(self, offset, pop_big, |a, b| Value::Bool(a <= b)),
                OpCode::GtBig => binary!(self, offset, pop_big, |a, b| Value::Bool(a > b)),
                OpCode::GeBig => binary!(self, offset, pop_big, |a, b| Value::Bool(a >= b)),
                OpCode::EqBool => binary!(self, offset, pop_bool, |a, b| Value::Bool(a == b)),
                OpCode::EqRef => binary!(self, offset, pop, |a, b| Value::Bool(a == b)),
                OpCode::Not => unary!(self, offset, pop_bool, |a| Value::Bool(!a)),

                // =============================================================
                // Numeric conversions
                // =============================================================
                OpCode::I8toI32 => unary!(self, offset, pop_byte, |a| Value::Int(i32::from(a))),
                OpCode::I16toI32 => unary!(self, offset, pop_short, |a| Value::Int(i32::from(a))),
                OpCode::U16toI32 => unary!(self, offset, pop_char, |a| Value::Int(i32::from(a))),
                OpCode::I32toI8 => unary!(self, offset, pop_int, |a| Value::Byte(a as i8)),
                OpCode::I32toI16 => unary!(self, offset, pop_int, |a| Value::Short(a as i16)),
                OpCode::I32toU16 => unary!(self, offset, pop_int, |a| Value::Char(a as u16)),
                OpCode::I32toI64 => unary!(self, offset, pop_int, |a| Value::Long(i64::from(a))),
                OpCode::I32toF32 => unary!(self, offset, pop_int, |a| Value::Float(a as f32)),
                OpCode::I32toF64 => unary!(self, offset, pop_int, |a| Value::Double(f64::from(a))),
                OpCode::I32toBig => unary!(self, offset, pop_int, |a| Value::big(a)),
                OpCode::I64toI32 => unary!(self, offset, pop_long, |a| Value::Int(a as i32)),
                OpCode::I64toF32 => unary!(self, offset, pop_long, |a| Value::Float(a as f32)),
                OpCode::I64toF64 => unary!(self, offset, pop_long, |a| Value::Double(a as f64)),
                OpCode::I64toBig => unary!(self, offset, pop_long, |a| Value::big(a)),
                OpCode::F32toI32 => unary!(self, offset, pop_float, |a| Value::Int(a as i32)),
                OpCode::F32toI64 => unary!(self, offset, pop_float, |a| Value::Long(a as i64)),
                OpCode::F32toF64 => unary!(self, offset, pop_float, |a| Value::Double(f64::from(a))),
                OpCode::F64toI32 => unary!(self, offset, pop_double, |a| Value::Int(a as i32)),
                OpCode::F64toI64 => unary!(self, offset, pop_double, |a| Value::Long(a as i64)),
                OpCode::F64toF32 => unary!(self, offset, pop_double, |a| Value::Float(a as f32)),
                OpCode::F64toBig => unary!(self, offset, pop_double, |a| {
                    let truncated = BigInt::from_f64(a).ok_or_else(|| RuntimeError::Arithmetic {
                        message: format!("cannot convert {} to bigint", Value::Double(a)),
                    })?;
                    Value::big(truncated)
                }),
                OpCode::BigtoI32 => unary!(self, offset, pop_big, |a| Value::Int(low_bits_u32(&a) as i32)),
                OpCode::BigtoI64 => unary!(self, offset, pop_big, |a| Value::Long(low_bits_u64(&a) as i64)),
                OpCode::BigtoF64 => unary!(self, offset, pop_big, |a| Value::Double(
                    a.to_f64().unwrap_or(f64::NAN)
                )),

                // =============================================================
                // Boxing
                // =============================================================
                OpCode::Unbox => {
                    let tag = operand_u8(chunk, &mut ip, offset)?;
                    if self.peek(offset)?.is_null() {
                        return Err(RuntimeError::NullUnboxing {
                            target: tag_type(tag).unwrap_or(TypeKind::Object),
                        });
                    }
                }
                OpCode::Box => {
                    operand_u8(chunk, &mut ip, offset)?;
                }

                // =============================================================
                // Control flow
                // =============================================================
                OpCode::JumpIfFalsy => {
                    let distance = operand_u16(chunk, &mut ip, offset)?;
                    if !self.peek(offset)?.is_truthy() {
                        ip += usize::from(distance);
                    }
                }
                OpCode::JumpIfTruthy => {
                    let distance = operand_u16(chunk, &mut ip, offset)?;
                    if self.peek(offset)?.is_truthy() {
                        ip += usize::from(distance);
                    }
                }
                OpCode::JumpIfNonNull => {
                    let distance = operand_u16(chunk, &mut ip, offset)?;
                    if !self.peek(offset)?.is_null() {
                        ip += usize::from(distance);
                    }
                }
                OpCode::Return => return self.pop(offset),

                // =============================================================
                // Membership
                // =============================================================
                OpCode::InList
                | OpCode::InMap
                | OpCode::InArray
                | OpCode::InText
                | OpCode::InDynamic => {
                    let container = self.pop(offset)?;
                    let probe = self.pop(offset)?;
                    let found = contains(op, &container, &probe)?;
                    self.stack.push(Value::Bool(found));
                }
            }
        }

        self.pop(chunk.len())
    }

    // =========================================================================
    // Stack helpers
    // =========================================================================

    fn pop(&mut self, offset: usize) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow { offset })
    }

    fn peek(&self, offset: usize) -> Result<&Value, RuntimeError> {
        self.stack.last().ok_or(RuntimeError::StackUnderflow { offset })
    }

    fn pop_bool(&mut self, offset: usize) -> Result<bool, RuntimeError> {
        match self.pop(offset)? {
            Value::Bool(v) => Ok(v),
            other => Err(mismatch("boolean", &other)),
        }
    }

    fn pop_byte(&mut self, offset: usize) -> Result<i8, RuntimeError> {
        match self.pop(offset)? {
            Value::Byte(v) => Ok(v),
            other => Err(mismatch("byte", &other)),
        }
    }

    fn pop_short(&mut self, offset: usize) -> Result<i16, RuntimeError> {
        match self.pop(offset)? {
            Value::Short(v) => Ok(v),
            other => Err(mismatch("short", &other)),
        }
    }

    fn pop_char(&mut self, offset: usize) -> Result<u16, RuntimeError> {
        match self.pop(offset)? {
            Value::Char(v) => Ok(v),
            other => Err(mismatch("char", &other)),
        }
    }

    fn pop_int(&mut self, offset: usize) -> Result<i32, RuntimeError> {
        match self.pop(offset)? {
            Value::Int(v) => Ok(v),
            other => Err(mismatch("int", &other)),
        }
    }

    fn pop_long(&mut self, offset: usize) -> Result<i64, RuntimeError> {
        match self.pop(offset)? {
            Value::Long(v) => Ok(v),
            other => Err(mismatch("long", &other)),
        }
    }

    fn pop_float(&mut self, offset: usize) -> Result<f32, RuntimeError> {
        match self.pop(offset)? {
            Value::Float(v) => Ok(v),
            other => Err(mismatch("float", &other)),
        }
    }

    fn pop_double(&mut self, offset: usize) -> Result<f64, RuntimeError> {
        match self.pop(offset)? {
            Value::Double(v) => Ok(v),
            other => Err(mismatch("double", &other)),
        }
    }

    fn pop_big(&mut self, offset: usize) -> Result<Rc<BigInt>, RuntimeError> {
        match self.pop(offset)? {
            Value::BigInt(v) => Ok(v),
            other => Err(mismatch("bigint", &other)),
        }
    }

    fn push_constant(&mut self, constants: &ConstantPool, index: u32) -> Result<(), RuntimeError> {
        let value = match constants.get(index) {
            Some(Constant::Int(v)) => Value::Int(*v),
            Some(Constant::Long(v)) => Value::Long(*v),
            Some(Constant::Float(v)) => Value::Float(*v),
            Some(Constant::Double(v)) => Value::Double(*v),
            Some(Constant::String(s)) => Value::str(s),
            Some(Constant::BigInt(v)) => Value::big(v.clone()),
            None => return Err(RuntimeError::InvalidConstant { index }),
        };
        self.stack.push(value);
        Ok(())
    }

    // =========================================================================
    // Locals
    // =========================================================================

    fn get_local(&mut self, slot: u16) -> Result<(), RuntimeError> {
        let value = self
            .locals
            .get(usize::from(slot))
            .cloned()
            .ok_or(RuntimeError::UnknownLocal { slot })?;
        self.stack.push(value);
        Ok(())
    }

    fn pre_increment(&mut self, slot: u16) -> Result<(), RuntimeError> {
        let current = self
            .locals
            .get(usize::from(slot))
            .ok_or(RuntimeError::UnknownLocal { slot })?;
        let next = match current {
            Value::Byte(v) => Value::Byte(v.wrapping_add(1)),
            Value::Short(v) => Value::Short(v.wrapping_add(1)),
            Value::Char(v) => Value::Char(v.wrapping_add(1)),
            Value::Int(v) => Value::Int(v.wrapping_add(1)),
            Value::Long(v) => Value::Long(v.wrapping_add(1)),
            Value::Float(v) => Value::Float(v + 1.0),
            Value::Double(v) => Value::Double(v + 1.0),
            Value::BigInt(v) => Value::big(&**v + BigInt::from(1)),
            other => return Err(mismatch("numeric local", other)),
        };
        self.locals[usize::from(slot)] = next.clone();
        self.stack.push(next);
        Ok(())
    }
}

// =============================================================================
// Operand decoding
// =============================================================================

fn operand_u8(chunk: &BytecodeChunk, ip: &mut usize, offset: usize) -> Result<u8, RuntimeError> {
    let value = chunk
        .read_byte(*ip)
        .ok_or(RuntimeError::MissingOperand { offset })?;
    *ip += 1;
    Ok(value)
}

fn operand_u16(chunk: &BytecodeChunk, ip: &mut usize, offset: usize) -> Result<u16, RuntimeError> {
    let value = chunk
        .read_u16(*ip)
        .ok_or(RuntimeError::MissingOperand { offset })?;
    *ip += 2;
    Ok(value)
}

fn mismatch(expected: &str, actual: &Value) -> RuntimeError {
    RuntimeError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.kind_name().to_string(),
    }
}

// =============================================================================
// Numeric helpers
// =============================================================================

/// `Math.pow` semantics: a NaN exponent is NaN, and `±1` to an infinite
/// power is NaN.
fn power(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

/// Shift left by `amount`; negative amounts shift right, rounding toward
/// negative infinity.
fn shift_big(value: &BigInt, amount: i32) -> BigInt {
    let distance = amount.unsigned_abs() as usize;
    if amount >= 0 {
        value << distance
    } else {
        value >> distance
    }
}

fn low_bits_u32(value: &BigInt) -> u32 {
    (value & BigInt::from(u32::MAX)).to_u32().unwrap_or(0)
}

fn low_bits_u64(value: &BigInt) -> u64 {
    (value & BigInt::from(u64::MAX)).to_u64().unwrap_or(0)
}

// =============================================================================
// Membership
// =============================================================================

fn contains(op: OpCode, container: &Value, probe: &Value) -> Result<bool, RuntimeError> {
    match (op, container) {
        (OpCode::InList | OpCode::InDynamic, Value::List(items))
        | (OpCode::InArray | OpCode::InDynamic, Value::Array(items)) => {
            Ok(index_in_bounds(probe, items.len()))
        }
        (OpCode::InText | OpCode::InDynamic, Value::Str(text)) => {
            Ok(index_in_bounds(probe, text.encode_utf16().count()))
        }
        // Keys are matched by text form, so a null probe looks up "null".
        (OpCode::InMap | OpCode::InDynamic, Value::Map(entries)) => Ok(match probe {
            Value::Str(key) => entries.contains_key(&**key),
            other => entries.contains_key(&other.to_string()),
        }),
        (_, other) => Err(mismatch(
            match op {
                OpCode::InList => "List",
                OpCode::InMap => "Map",
                OpCode::InArray => "array",
                OpCode::InText => "String",
                _ => "List, Map, array or String",
            },
            other,
        )),
    }
}

fn index_in_bounds(probe: &Value, len: usize) -> bool {
    probe_index(probe).is_some_and(|index| usize::try_from(index).is_ok_and(|i| i < len))
}

/// Convert a membership probe into an index. Probes that do not name an
/// integer are `None`.
fn probe_index(probe: &Value) -> Option<i32> {
    match probe {
        Value::Byte(v) => Some(i32::from(*v)),
        Value::Short(v) => Some(i32::from(*v)),
        Value::Char(v) => Some(i32::from(*v)),
        Value::Int(v) => Some(*v),
        Value::Long(v) => Some(*v as i32),
        Value::Float(v) => whole(f64::from(*v)),
        Value::Double(v) => whole(*v),
        Value::Str(text) => text.trim().parse().ok(),
        Value::Null => None,
        other => other.to_string().parse().ok(),
    }
}

fn whole(value: f64) -> Option<i32> {
    (value.is_finite() && value.fract() == 0.0).then_some(value as i32)
}

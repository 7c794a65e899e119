//! Bytecode emitter.
//!
//! The [`BytecodeEmitter`] provides a small API over [`BytecodeChunk`] for
//! constants, locals and forward jumps. [`lower`] drives it from an
//! emission plan.
//!
//! # Example
//!
//! ```ignore
//! use tsbc_compiler::bytecode::{ConstantPool, OpCode};
//! use tsbc_compiler::emit::BytecodeEmitter;
//!
//! let mut constants = ConstantPool::new();
//! let mut emitter = BytecodeEmitter::new(&mut constants);
//!
//! emitter.emit_int(42)?;
//! emitter.emit_int(10)?;
//! emitter.emit(OpCode::AddI32);
//!
//! let chunk = emitter.finish()?;
//! ```

mod jumps;
mod lower;

pub use lower::{conversion_ops, lower};

use num_bigint::BigInt;
use thiserror::Error;

use crate::bytecode::{BytecodeChunk, ChunkError, Constant, ConstantPool, OpCode};
use crate::plan::Label;
use jumps::JumpManager;

/// Failure while emitting bytecode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error(transparent)]
    Chunk(#[from] ChunkError),

    #[error("constant pool index {index} exceeds u16::MAX")]
    ConstantPoolFull { index: u32 },

    #[error("label {label} was never bound")]
    UnboundLabel { label: Label },
}

/// Emits bytecode instructions for one expression.
pub struct BytecodeEmitter<'pool> {
    chunk: BytecodeChunk,

    /// Shared constant pool (deduplicated)
    constants: &'pool mut ConstantPool,

    /// Branches waiting for their label
    jumps: JumpManager,

    /// Current source line for debug info
    current_line: u32,
}

impl<'pool> BytecodeEmitter<'pool> {
    pub fn new(constants: &'pool mut ConstantPool) -> Self {
        Self {
            chunk: BytecodeChunk::new(),
            constants,
            jumps: JumpManager::new(),
            current_line: 1,
        }
    }

    /// Set current source line for debug info.
    ///
    /// All subsequent instructions will be associated with this line number.
    pub fn set_line(&mut self, line: u32) {
        self.current_line = line;
    }

    pub fn current_line(&self) -> u32 {
        self.current_line
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Emit a single opcode with no operands.
    pub fn emit(&mut self, op: OpCode) {
        self.chunk.write_op(op, self.current_line);
    }

    /// Emit opcode with 8-bit operand.
    pub fn emit_byte(&mut self, op: OpCode, byte: u8) {
        self.chunk.write_op(op, self.current_line);
        self.chunk.write_byte(byte, self.current_line);
    }

    /// Emit opcode with 16-bit operand.
    pub fn emit_u16(&mut self, op: OpCode, value: u16) {
        self.chunk.write_op(op, self.current_line);
        self.chunk.write_u16(value, self.current_line);
    }

    /// Emit a constant load instruction.
    ///
    /// Uses narrow (8-bit) or wide (16-bit) index based on pool size.
    pub fn emit_constant(&mut self, constant: Constant) -> Result<(), EmitError> {
        let index = self.constants.add(constant);
        if let Ok(narrow) = u8::try_from(index) {
            self.emit_byte(OpCode::Constant, narrow);
        } else {
            let wide = u16::try_from(index).map_err(|_| EmitError::ConstantPoolFull { index })?;
            self.emit_u16(OpCode::ConstantWide, wide);
        }
        Ok(())
    }

    // ==========================================================================
    // Constants
    // ==========================================================================

    /// Emit an `int` constant.
    ///
    /// 0 uses `PushZero`, 1 uses `PushOne`.
    pub fn emit_int(&mut self, value: i32) -> Result<(), EmitError> {
        match value {
            0 => self.emit(OpCode::PushZero),
            1 => self.emit(OpCode::PushOne),
            _ => self.emit_constant(Constant::Int(value))?,
        }
        Ok(())
    }

    pub fn emit_long(&mut self, value: i64) -> Result<(), EmitError> {
        self.emit_constant(Constant::Long(value))
    }

    pub fn emit_float(&mut self, value: f32) -> Result<(), EmitError> {
        self.emit_constant(Constant::Float(value))
    }

    pub fn emit_double(&mut self, value: f64) -> Result<(), EmitError> {
        self.emit_constant(Constant::Double(value))
    }

    pub fn emit_string(&mut self, value: &str) -> Result<(), EmitError> {
        self.emit_constant(Constant::String(value.to_owned()))
    }

    pub fn emit_big_int(&mut self, value: BigInt) -> Result<(), EmitError> {
        self.emit_constant(Constant::BigInt(value))
    }

    pub fn emit_null(&mut self) {
        self.emit(OpCode::PushNull);
    }

    pub fn emit_bool(&mut self, value: bool) {
        self.emit(if value {
            OpCode::PushTrue
        } else {
            OpCode::PushFalse
        });
    }

    // ==========================================================================
    // Local Variables
    // ==========================================================================

    /// Emit get local variable.
    ///
    /// Uses narrow (8-bit) or wide (16-bit) slot index based on slot number.
    pub fn emit_get_local(&mut self, slot: u16) {
        match u8::try_from(slot) {
            Ok(narrow) => self.emit_byte(OpCode::GetLocal, narrow),
            Err(_) => self.emit_u16(OpCode::GetLocalWide, slot),
        }
    }

    /// Emit a prefix increment of a local, leaving the new value.
    pub fn emit_pre_inc(&mut self, slot: u16) {
        match u8::try_from(slot) {
            Ok(narrow) => self.emit_byte(OpCode::PreInc, narrow),
            Err(_) => self.emit_u16(OpCode::PreIncWide, slot),
        }
    }

    // ==========================================================================
    // Jumps
    // ==========================================================================

    /// Emit a forward jump with a placeholder offset.
    pub fn emit_jump(&mut self, op: OpCode) -> JumpLabel {
        let offset = self.chunk.emit_jump(op, self.current_line);
        JumpLabel(offset)
    }

    /// Patch a jump to land on the current position.
    pub fn patch_jump(&mut self, label: JumpLabel) -> Result<(), EmitError> {
        self.chunk.patch_jump(label.0)?;
        Ok(())
    }

    /// Emit a forward jump to a plan label that is bound later.
    pub fn emit_branch(&mut self, op: OpCode, target: Label) {
        let jump = self.emit_jump(op);
        self.jumps.add(target, jump);
    }

    /// Bind a plan label to the current position, patching every jump to it.
    pub fn bind_label(&mut self, label: Label) -> Result<(), EmitError> {
        for jump in self.jumps.take(label) {
            self.patch_jump(jump)?;
        }
        Ok(())
    }

    /// Get current code offset.
    pub fn current_offset(&self) -> usize {
        self.chunk.current_offset()
    }

    // ==========================================================================
    // Finalization
    // ==========================================================================

    /// Finish and return the bytecode chunk.
    ///
    /// Fails if a branch still waits for its label.
    pub fn finish(self) -> Result<BytecodeChunk, EmitError> {
        if let Some(label) = self.jumps.first_unresolved() {
            return Err(EmitError::UnboundLabel { label });
        }
        Ok(self.chunk)
    }

    /// Get current chunk size (for debugging).
    pub fn code_size(&self) -> usize {
        self.chunk.len()
    }
}

/// Operand offset of a forward jump that needs patching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpLabel(pub(crate) usize);

impl JumpLabel {
    pub fn offset(&self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::LabelAllocator;

    #[test]
    fn emit_constant() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        emitter.emit_int(42).unwrap();
        let chunk = emitter.finish().unwrap();

        assert_eq!(chunk.read_op(0), Some(OpCode::Constant));
        assert_eq!(chunk.read_byte(1), Some(0));
        assert_eq!(constants.get(0), Some(&Constant::Int(42)));
    }

    #[test]
    fn emit_special_ints() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        emitter.emit_int(0).unwrap();
        emitter.emit_int(1).unwrap();
        let chunk = emitter.finish().unwrap();

        chunk.assert_opcodes(&[OpCode::PushZero, OpCode::PushOne]);
        assert!(constants.is_empty());
    }

    #[test]
    fn long_zero_uses_pool() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        emitter.emit_long(0).unwrap();
        let chunk = emitter.finish().unwrap();

        chunk.assert_opcodes(&[OpCode::Constant]);
        assert_eq!(constants.get(0), Some(&Constant::Long(0)));
    }

    #[test]
    fn constant_deduplication() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        emitter.emit_string("hello").unwrap();
        emitter.emit_string("hello").unwrap();
        emitter.emit_big_int(BigInt::from(7)).unwrap();
        emitter.emit_big_int(BigInt::from(7)).unwrap();

        assert_eq!(constants.len(), 2);
    }

    #[test]
    fn wide_constant_index() {
        let mut constants = ConstantPool::new();
        for i in 0..256 {
            constants.add_int(i + 1000);
        }

        let mut emitter = BytecodeEmitter::new(&mut constants);
        emitter.emit_int(5).unwrap();

        let chunk = emitter.finish().unwrap();
        assert_eq!(chunk.read_op(0), Some(OpCode::ConstantWide));
        assert_eq!(chunk.read_u16(1), Some(256));
    }

    #[test]
    fn emit_locals() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        emitter.emit_get_local(3);
        emitter.emit_get_local(300);
        emitter.emit_pre_inc(4);
        let chunk = emitter.finish().unwrap();

        chunk.assert_opcodes(&[OpCode::GetLocal, OpCode::GetLocalWide, OpCode::PreInc]);
        assert_eq!(chunk.read_u16(3), Some(300));
    }

    #[test]
    fn jump_and_patch() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);

        let jump = emitter.emit_jump(OpCode::JumpIfFalsy);
        emitter.emit(OpCode::PushTrue);
        emitter.patch_jump(jump).unwrap();
        emitter.emit(OpCode::PushFalse);

        let chunk = emitter.finish().unwrap();

        assert_eq!(chunk.read_op(0), Some(OpCode::JumpIfFalsy));
        // Skips PushTrue
        assert_eq!(chunk.read_u16(1), Some(1));
        assert_eq!(chunk.read_op(3), Some(OpCode::PushTrue));
        assert_eq!(chunk.read_op(4), Some(OpCode::PushFalse));
        assert_eq!(jump.offset(), 1);
    }

    #[test]
    fn branches_bind_to_labels() {
        let mut labels = LabelAllocator::new();
        let end = labels.fresh();

        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        emitter.emit(OpCode::PushNull);
        emitter.emit_branch(OpCode::JumpIfNonNull, end);
        emitter.emit(OpCode::Pop);
        emitter.emit(OpCode::PushOne);
        emitter.bind_label(end).unwrap();
        emitter.emit(OpCode::Return);

        let chunk = emitter.finish().unwrap();
        assert_eq!(chunk.read_u16(2), Some(2));
    }

    #[test]
    fn unbound_label_is_an_error() {
        let mut labels = LabelAllocator::new();
        let end = labels.fresh();

        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        emitter.emit_branch(OpCode::JumpIfTruthy, end);

        assert_eq!(
            emitter.finish().unwrap_err(),
            EmitError::UnboundLabel { label: end }
        );
    }

    #[test]
    fn line_tracking() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);

        emitter.set_line(10);
        emitter.emit(OpCode::PushTrue);
        emitter.set_line(20);
        emitter.emit(OpCode::PushFalse);
        assert_eq!(emitter.current_line(), 20);
        assert_eq!(emitter.code_size(), 2);

        let chunk = emitter.finish().unwrap();
        assert_eq!(chunk.line_at(0), Some(10));
        assert_eq!(chunk.line_at(1), Some(20));
    }
}

//! Bytecode chunk for a compiled expression.
//!
//! A `BytecodeChunk` holds the instructions for one expression together with
//! the source line of every byte.

use thiserror::Error;

use super::OpCode;

/// Failure while writing or patching a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("jump distance {distance} exceeds u16::MAX")]
    JumpTooFar { distance: usize },

    #[error("no jump operand at offset {offset}")]
    NotAJump { offset: usize },
}

/// A chunk of compiled bytecode.
///
/// Constants live in a separate [`ConstantPool`](super::ConstantPool) so
/// identical literals share one slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BytecodeChunk {
    code: Vec<u8>,
    /// Parallel to `code`.
    lines: Vec<u32>,
}

impl BytecodeChunk {
    /// Create a new empty bytecode chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write an opcode.
    pub fn write_op(&mut self, op: OpCode, line: u32) {
        self.code.push(op.into());
        self.lines.push(line);
    }

    /// Write a byte operand.
    pub fn write_byte(&mut self, byte: u8, line: u32) {
        self.code.push(byte);
        self.lines.push(line);
    }

    /// Write a 16-bit operand (big-endian).
    pub fn write_u16(&mut self, value: u16, line: u32) {
        for byte in value.to_be_bytes() {
            self.write_byte(byte, line);
        }
    }

    /// Get current code offset (for jump patching).
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    /// Emit a forward jump and return the operand offset to patch later.
    ///
    /// The operand is initialized to 0xFFFF as a placeholder.
    pub fn emit_jump(&mut self, op: OpCode, line: u32) -> usize {
        self.write_op(op, line);
        let offset = self.code.len();
        self.write_u16(0xFFFF, line);
        offset
    }

    /// Patch the jump operand at `offset` to land on the current position.
    pub fn patch_jump(&mut self, offset: usize) -> Result<(), ChunkError> {
        let Some(distance) = self.code.len().checked_sub(offset + 2) else {
            return Err(ChunkError::NotAJump { offset });
        };
        let distance = u16::try_from(distance).map_err(|_| ChunkError::JumpTooFar { distance })?;
        let [hi, lo] = distance.to_be_bytes();
        self.code[offset] = hi;
        self.code[offset + 1] = lo;
        Ok(())
    }

    /// Get the bytecode.
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Get the line numbers.
    pub fn lines(&self) -> &[u32] {
        &self.lines
    }

    /// Get the line number for a given offset.
    pub fn line_at(&self, offset: usize) -> Option<u32> {
        self.lines.get(offset).copied()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Read a byte at the given offset.
    pub fn read_byte(&self, offset: usize) -> Option<u8> {
        self.code.get(offset).copied()
    }

    /// Read a u16 at the given offset (big-endian).
    pub fn read_u16(&self, offset: usize) -> Option<u16> {
        let hi = *self.code.get(offset)?;
        let lo = *self.code.get(offset + 1)?;
        Some(u16::from_be_bytes([hi, lo]))
    }

    /// Read an opcode at the given offset.
    pub fn read_op(&self, offset: usize) -> Option<OpCode> {
        self.code.get(offset).and_then(|&b| OpCode::from_u8(b))
    }

    /// Extract all opcodes from the chunk, skipping operands.
    pub fn opcodes(&self) -> Vec<OpCode> {
        let mut ops = Vec::new();
        let mut offset = 0;

        while offset < self.code.len() {
            if let Some(op) = self.read_op(offset) {
                ops.push(op);
                offset += 1 + op.operand_size();
            } else {
                offset += 1;
            }
        }

        ops
    }

    /// Check if this chunk contains exactly the given opcode sequence.
    ///
    /// Operand values are ignored. Panics with both sequences on mismatch.
    #[track_caller]
    pub fn assert_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        assert_eq!(
            actual,
            expected,
            "Bytecode mismatch.\nExpected: {:?}\nActual:   {:?}",
            expected.iter().map(|op| op.name()).collect::<Vec<_>>(),
            actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
        );
    }

    /// Check that the given opcodes appear in order, not necessarily
    /// contiguous.
    #[track_caller]
    pub fn assert_contains_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        let mut expected_iter = expected.iter().peekable();

        for op in &actual {
            if expected_iter.peek() == Some(&op) {
                expected_iter.next();
            }
        }

        if expected_iter.peek().is_some() {
            let remaining: Vec<_> = expected_iter.map(|op| op.name()).collect();
            panic!(
                "Missing opcodes in sequence.\nExpected to find: {:?}\nActual bytecode:  {:?}",
                remaining,
                actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
            );
        }
    }
}

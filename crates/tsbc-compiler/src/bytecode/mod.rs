//! Bytecode types for compiled expressions.
//!
//! - [`OpCode`] - The typed instruction set
//! - [`BytecodeChunk`] - Instructions for one expression
//! - [`Constant`] and [`ConstantPool`] - Literal storage

mod chunk;
mod constant;
mod opcode;

pub use chunk::{BytecodeChunk, ChunkError};
pub use constant::{Constant, ConstantPool};
pub use opcode::{BOOLEAN_TAG, OpCode, tag_type, type_tag};

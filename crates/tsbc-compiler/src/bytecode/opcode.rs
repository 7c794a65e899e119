//! Bytecode operation codes.
//!
//! Each opcode is a single byte, with operands following inline. Opcodes are
//! typed: the operand kind is part of the instruction, so the VM never
//! dispatches on the runtime kind of an arithmetic operand.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use tsbc_core::{NumericKind, TypeKind};

/// Bytecode operation codes.
///
/// The VM is a stack-based machine. Most operations pop operands
/// from the stack and push results back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum OpCode {
    // =========================================================================
    // Constants
    // =========================================================================
    /// Push constant from pool (8-bit index).
    /// Operand: u8 constant index
    Constant = 0,
    /// Push constant from pool (16-bit index).
    /// Operand: u16 constant index (big-endian)
    ConstantWide,
    /// Push null reference.
    PushNull,
    /// Push boolean true.
    PushTrue,
    /// Push boolean false.
    PushFalse,
    /// Push int 0.
    PushZero,
    /// Push int 1.
    PushOne,

    // =========================================================================
    // Stack Operations
    // =========================================================================
    /// Pop top of stack.
    Pop,

    // =========================================================================
    // Local Variables
    // =========================================================================
    /// Load local variable (8-bit slot).
    /// Operand: u8 slot index
    GetLocal,
    /// Load local variable (16-bit slot).
    /// Operand: u16 slot index (big-endian)
    GetLocalWide,
    /// Increment a numeric local and push the new value.
    /// Operand: u8 slot index
    PreInc,
    /// Increment a numeric local (16-bit slot) and push the new value.
    /// Operand: u16 slot index (big-endian)
    PreIncWide,

    // =========================================================================
    // Arithmetic (i32, wrapping)
    // =========================================================================
    /// Add two i32 values.
    AddI32,
    /// Subtract two i32 values.
    SubI32,
    /// Multiply two i32 values.
    MulI32,
    /// Divide two i32 values, truncating. Zero divisor raises.
    DivI32,
    /// Remainder of two i32 values. Zero divisor raises.
    ModI32,

    // =========================================================================
    // Arithmetic (i64, wrapping)
    // =========================================================================
    /// Add two i64 values.
    AddI64,
    /// Subtract two i64 values.
    SubI64,
    /// Multiply two i64 values.
    MulI64,
    /// Divide two i64 values, truncating. Zero divisor raises.
    DivI64,
    /// Remainder of two i64 values. Zero divisor raises.
    ModI64,

    // =========================================================================
    // Arithmetic (f32)
    // =========================================================================
    /// Add two f32 values.
    AddF32,
    /// Subtract two f32 values.
    SubF32,
    /// Multiply two f32 values.
    MulF32,
    /// Divide two f32 values.
    DivF32,
    /// Remainder of two f32 values (sign of dividend).
    ModF32,

    // =========================================================================
    // Arithmetic (f64)
    // =========================================================================
    /// Add two f64 values.
    AddF64,
    /// Subtract two f64 values.
    SubF64,
    /// Multiply two f64 values.
    MulF64,
    /// Divide two f64 values.
    DivF64,
    /// Remainder of two f64 values (sign of dividend).
    ModF64,
    /// Raise an f64 base to an f64 exponent.
    PowF64,

    // =========================================================================
    // Arithmetic (big integer)
    // =========================================================================
    /// Add two big integers.
    AddBig,
    /// Subtract two big integers.
    SubBig,
    /// Multiply two big integers.
    MulBig,
    /// Divide two big integers, truncating. Zero divisor raises.
    DivBig,
    /// Remainder of two big integers. Zero divisor raises.
    ModBig,
    /// Raise a big integer to an i32 exponent. Negative exponents raise.
    PowBig,

    // =========================================================================
    // Strings
    // =========================================================================
    /// Concatenate two strings.
    Concat,
    /// Replace the top of stack with its text form.
    ToString,

    // =========================================================================
    // Bitwise
    // =========================================================================
    /// Bitwise AND of two i32 values.
    BitAndI32,
    /// Bitwise OR of two i32 values.
    BitOrI32,
    /// Bitwise XOR of two i32 values.
    BitXorI32,
    /// Bitwise AND of two i64 values.
    BitAndI64,
    /// Bitwise OR of two i64 values.
    BitOrI64,
    /// Bitwise XOR of two i64 values.
    BitXorI64,
    /// Two's-complement AND of two big integers.
    BitAndBig,
    /// Two's-complement OR of two big integers.
    BitOrBig,
    /// Two's-complement XOR of two big integers.
    BitXorBig,

    // =========================================================================
    // Shifts (amount is i32, masked to the operand width)
    // =========================================================================
    /// Shift an i32 left.
    ShlI32,
    /// Arithmetic shift of an i32 right.
    ShrI32,
    /// Logical shift of an i32 right.
    UshrI32,
    /// Shift an i64 left.
    ShlI64,
    /// Arithmetic shift of an i64 right.
    ShrI64,
    /// Logical shift of an i64 right.
    UshrI64,
    /// Shift a big integer left (negative amounts shift right).
    ShlBig,
    /// Shift a big integer right, rounding toward negative infinity.
    ShrBig,

    // =========================================================================
    // Comparisons
    // =========================================================================
    /// i32 equality.
    EqI32,
    /// i32 less than.
    LtI32,
    /// i32 less than or equal.
    LeI32,
    /// i32 greater than.
    GtI32,
    /// i32 greater than or equal.
    GeI32,
    /// i64 equality.
    EqI64,
    /// i64 less than.
    LtI64,
    /// i64 less than or equal.
    LeI64,
    /// i64 greater than.
    GtI64,
    /// i64 greater than or equal.
    GeI64,
    /// f32 equality (NaN is unequal to everything).
    EqF32,
    /// f32 less than.
    LtF32,
    /// f32 less than or equal.
    LeF32,
    /// f32 greater than.
    GtF32,
    /// f32 greater than or equal.
    GeF32,
    /// f64 equality (NaN is unequal to everything).
    EqF64,
    /// f64 less than.
    LtF64,
    /// f64 less than or equal.
    LeF64,
    /// f64 greater than.
    GtF64,
    /// f64 greater than or equal.
    GeF64,
    /// Big integer equality.
    EqBig,
    /// Big integer less than.
    LtBig,
    /// Big integer less than or equal.
    LeBig,
    /// Big integer greater than.
    GtBig,
    /// Big integer greater than or equal.
    GeBig,
    /// Boolean equality.
    EqBool,
    /// Null-safe value equality of two references.
    EqRef,
    /// Logical NOT of a boolean.
    Not,

    // =========================================================================
    // Numeric Conversions
    // =========================================================================
    /// byte to int.
    I8toI32,
    /// short to int.
    I16toI32,
    /// char to int (zero-extending).
    U16toI32,
    /// int to byte (truncating).
    I32toI8,
    /// int to short (truncating).
    I32toI16,
    /// int to char (truncating).
    I32toU16,
    /// int to long.
    I32toI64,
    /// int to float.
    I32toF32,
    /// int to double.
    I32toF64,
    /// int to big integer.
    I32toBig,
    /// long to int (low 32 bits).
    I64toI32,
    /// long to float.
    I64toF32,
    /// long to double.
    I64toF64,
    /// long to big integer.
    I64toBig,
    /// float to int (saturating, NaN is 0).
    F32toI32,
    /// float to long (saturating, NaN is 0).
    F32toI64,
    /// float to double.
    F32toF64,
    /// double to int (saturating, NaN is 0).
    F64toI32,
    /// double to long (saturating, NaN is 0).
    F64toI64,
    /// double to float.
    F64toF32,
    /// double to big integer (truncating).
    F64toBig,
    /// big integer to int (low 32 bits).
    BigtoI32,
    /// big integer to long (low 64 bits).
    BigtoI64,
    /// big integer to double.
    BigtoF64,

    // =========================================================================
    // Boxing
    // =========================================================================
    /// Unwrap a boxed value. Null raises.
    /// Operand: u8 primitive type tag
    Unbox,
    /// Wrap a primitive value.
    /// Operand: u8 primitive type tag
    Box,

    // =========================================================================
    // Control Flow
    // =========================================================================
    /// Jump if the top of stack is falsy (peeks).
    /// Operand: u16 offset
    JumpIfFalsy,
    /// Jump if the top of stack is truthy (peeks).
    /// Operand: u16 offset
    JumpIfTruthy,
    /// Jump if the top of stack is not null (peeks).
    /// Operand: u16 offset
    JumpIfNonNull,
    /// Stop execution; the top of stack is the result.
    Return,

    // =========================================================================
    // Membership
    // =========================================================================
    /// Index probe against a list.
    InList,
    /// Key probe against a map.
    InMap,
    /// Index probe against an array.
    InArray,
    /// Index probe against the UTF-16 units of a string.
    InText,
    /// Probe using the protocol of the runtime value.
    InDynamic,
}

impl OpCode {
    /// Decode an opcode byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Get the size of operands for this opcode in bytes.
    ///
    /// This does NOT include the opcode byte itself.
    pub fn operand_size(&self) -> usize {
        match self {
            // 1-byte operand
            OpCode::Constant
            | OpCode::GetLocal
            | OpCode::PreInc
            | OpCode::Unbox
            | OpCode::Box => 1,
            // 2-byte operand
            OpCode::ConstantWide
            | OpCode::GetLocalWide
            | OpCode::PreIncWide
            | OpCode::JumpIfFalsy
            | OpCode::JumpIfTruthy
            | OpCode::JumpIfNonNull => 2,
            // No operands
            _ => 0,
        }
    }

    /// Get the mnemonic of this opcode.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::Constant => "CONSTANT",
            OpCode::ConstantWide => "CONSTANT_WIDE",
            OpCode::PushNull => "PUSH_NULL",
            OpCode::PushTrue => "PUSH_TRUE",
            OpCode::PushFalse => "PUSH_FALSE",
            OpCode::PushZero => "PUSH_ZERO",
            OpCode::PushOne => "PUSH_ONE",
            OpCode::Pop => "POP",
            OpCode::GetLocal => "GET_LOCAL",
            OpCode::GetLocalWide => "GET_LOCAL_WIDE",
            OpCode::PreInc => "PRE_INC",
            OpCode::PreIncWide => "PRE_INC_WIDE",
            OpCode::AddI32 => "ADD_I32",
            OpCode::SubI32 => "SUB_I32",
            OpCode::MulI32 => "MUL_I32",
            OpCode::DivI32 => "DIV_I32",
            OpCode::ModI32 => "MOD_I32",
            OpCode::AddI64 => "ADD_I64",
            OpCode::SubI64 => "SUB_I64",
            OpCode::MulI64 => "MUL_I64",
            OpCode::DivI64 => "DIV_I64",
            OpCode::ModI64 => "MOD_I64",
            OpCode::AddF32 => "ADD_F32",
            OpCode::SubF32 => "SUB_F32",
            OpCode::MulF32 => "MUL_F32",
            OpCode::DivF32 => "DIV_F32",
            OpCode::ModF32 => "MOD_F32",
            OpCode::AddF64 => "ADD_F64",
            OpCode::SubF64 => "SUB_F64",
            OpCode::MulF64 => "MUL_F64",
            OpCode::DivF64 => "DIV_F64",
            OpCode::ModF64 => "MOD_F64",
            OpCode::PowF64 => "POW_F64",
            OpCode::AddBig => "ADD_BIG",
            OpCode::SubBig => "SUB_BIG",
            OpCode::MulBig => "MUL_BIG",
            OpCode::DivBig => "DIV_BIG",
            OpCode::ModBig => "MOD_BIG",
            OpCode::PowBig => "POW_BIG",
            OpCode::Concat => "CONCAT",
            OpCode::ToString => "TO_STRING",
            OpCode::BitAndI32 => "BIT_AND_I32",
            OpCode::BitOrI32 => "BIT_OR_I32",
            OpCode::BitXorI32 => "BIT_XOR_I32",
            OpCode::BitAndI64 => "BIT_AND_I64",
            OpCode::BitOrI64 => "BIT_OR_I64",
            OpCode::BitXorI64 => "BIT_XOR_I64",
            OpCode::BitAndBig => "BIT_AND_BIG",
            OpCode::BitOrBig => "BIT_OR_BIG",
            OpCode::BitXorBig => "BIT_XOR_BIG",
            OpCode::ShlI32 => "SHL_I32",
            OpCode::ShrI32 => "SHR_I32",
            OpCode::UshrI32 => "USHR_I32",
            OpCode::ShlI64 => "SHL_I64",
            OpCode::ShrI64 => "SHR_I64",
            OpCode::UshrI64 => "USHR_I64",
            OpCode::ShlBig => "SHL_BIG",
            OpCode::ShrBig => "SHR_BIG",
            OpCode::EqI32 => "EQ_I32",
            OpCode::LtI32 => "LT_I32",
            OpCode::LeI32 => "LE_I32",
            OpCode::GtI32 => "GT_I32",
            OpCode::GeI32 => "GE_I32",
            OpCode::EqI64 => "EQ_I64",
            OpCode::LtI64 => "LT_I64",
            OpCode::LeI64 => "LE_I64",
            OpCode::GtI64 => "GT_I64",
            OpCode::GeI64 => "GE_I64",
            OpCode::EqF32 => "EQ_F32",
            OpCode::LtF32 => "LT_F32",
            OpCode::LeF32 => "LE_F32",
            OpCode::GtF32 => "GT_F32",
            OpCode::GeF32 => "GE_F32",
            OpCode::EqF64 => "EQ_F64",
            OpCode::LtF64 => "LT_F64",
            OpCode::LeF64 => "LE_F64",
            OpCode::GtF64 => "GT_F64",
            OpCode::GeF64 => "GE_F64",
            OpCode::EqBig => "EQ_BIG",
            OpCode::LtBig => "LT_BIG",
            OpCode::LeBig => "LE_BIG",
            OpCode::GtBig => "GT_BIG",
            OpCode::GeBig => "GE_BIG",
            OpCode::EqBool => "EQ_BOOL",
            OpCode::EqRef => "EQ_REF",
            OpCode::Not => "NOT",
            OpCode::I8toI32 => "I8_TO_I32",
            OpCode::I16toI32 => "I16_TO_I32",
            OpCode::U16toI32 => "U16_TO_I32",
            OpCode::I32toI8 => "I32_TO_I8",
            OpCode::I32toI16 => "I32_TO_I16",
            OpCode::I32toU16 => "I32_TO_U16",
            OpCode::I32toI64 => "I32_TO_I64",
            OpCode::I32toF32 => "I32_TO_F32",
            OpCode::I32toF64 => "I32_TO_F64",
            OpCode::I32toBig => "I32_TO_BIG",
            OpCode::I64toI32 => "I64_TO_I32",
            OpCode::I64toF32 => "I64_TO_F32",
            OpCode::I64toF64 => "I64_TO_F64",
            OpCode::I64toBig => "I64_TO_BIG",
            OpCode::F32toI32 => "F32_TO_I32",
            OpCode::F32toI64 => "F32_TO_I64",
            OpCode::F32toF64 => "F32_TO_F64",
            OpCode::F64toI32 => "F64_TO_I32",
            OpCode::F64toI64 => "F64_TO_I64",
            OpCode::F64toF32 => "F64_TO_F32",
            OpCode::F64toBig => "F64_TO_BIG",
            OpCode::BigtoI32 => "BIG_TO_I32",
            OpCode::BigtoI64 => "BIG_TO_I64",
            OpCode::BigtoF64 => "BIG_TO_F64",
            OpCode::Unbox => "UNBOX",
            OpCode::Box => "BOX",
            OpCode::JumpIfFalsy => "JUMP_IF_FALSY",
            OpCode::JumpIfTruthy => "JUMP_IF_TRUTHY",
            OpCode::JumpIfNonNull => "JUMP_IF_NON_NULL",
            OpCode::Return => "RETURN",
            OpCode::InList => "IN_LIST",
            OpCode::InMap => "IN_MAP",
            OpCode::InArray => "IN_ARRAY",
            OpCode::InText => "IN_TEXT",
            OpCode::InDynamic => "IN_DYNAMIC",
        }
    }
}

// =============================================================================
// Type Tags
// =============================================================================

/// Tag for `boolean` in the `BOX`/`UNBOX` operand.
pub const BOOLEAN_TAG: u8 = 8;

/// Encode the primitive side of a box/unbox as an operand byte.
///
/// Numeric kinds use their position in [`NumericKind::ALL`].
pub fn type_tag(ty: &TypeKind) -> Option<u8> {
    if ty.unboxed() == TypeKind::Boolean {
        return Some(BOOLEAN_TAG);
    }
    let kind = ty.numeric_kind()?;
    NumericKind::ALL
        .iter()
        .position(|k| *k == kind)
        .map(|index| index as u8)
}

/// Decode a `BOX`/`UNBOX` operand byte into its primitive type.
pub fn tag_type(tag: u8) -> Option<TypeKind> {
    if tag == BOOLEAN_TAG {
        return Some(TypeKind::Boolean);
    }
    NumericKind::ALL
        .get(usize::from(tag))
        .map(|kind| kind.primitive())
}

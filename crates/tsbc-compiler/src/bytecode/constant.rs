//! Constant pool for compiled expressions.
//!
//! Literals that do not fit a dedicated push instruction are stored here and
//! referenced by index from `CONSTANT`/`CONSTANT_WIDE`.

use num_bigint::BigInt;
use rustc_hash::FxHashMap;

/// Values stored in the constant pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// Arbitrary-precision integer, parsed from its decimal literal.
    BigInt(BigInt),
}

/// Constant pool with deduplication.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    constants: Vec<Constant>,
    /// Deduplication index: maps constant to its index.
    index: FxHashMap<ConstantKey, u32>,
}

/// Hashable form of [`Constant`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstantKey {
    Int(i32),
    Long(i64),
    Float(u32),  // Bit pattern for hashing
    Double(u64), // Bit pattern for hashing
    String(String),
    BigInt(BigInt),
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or get existing constant, returns index.
    pub fn add(&mut self, constant: Constant) -> u32 {
        let key = Self::to_key(&constant);

        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }

        let idx = self.constants.len() as u32;
        self.constants.push(constant);
        self.index.insert(key, idx);
        idx
    }

    pub fn add_int(&mut self, value: i32) -> u32 {
        self.add(Constant::Int(value))
    }

    pub fn add_long(&mut self, value: i64) -> u32 {
        self.add(Constant::Long(value))
    }

    pub fn add_float(&mut self, value: f32) -> u32 {
        self.add(Constant::Float(value))
    }

    pub fn add_double(&mut self, value: f64) -> u32 {
        self.add(Constant::Double(value))
    }

    pub fn add_string(&mut self, value: impl Into<String>) -> u32 {
        self.add(Constant::String(value.into()))
    }

    pub fn add_big_int(&mut self, value: BigInt) -> u32 {
        self.add(Constant::BigInt(value))
    }

    /// Get constant by index.
    pub fn get(&self, index: u32) -> Option<&Constant> {
        self.constants.get(index as usize)
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    fn to_key(constant: &Constant) -> ConstantKey {
        match constant {
            Constant::Int(v) => ConstantKey::Int(*v),
            Constant::Long(v) => ConstantKey::Long(*v),
            Constant::Float(v) => ConstantKey::Float(v.to_bits()),
            Constant::Double(v) => ConstantKey::Double(v.to_bits()),
            Constant::String(s) => ConstantKey::String(s.clone()),
            Constant::BigInt(b) => ConstantKey::BigInt(b.clone()),
        }
    }
}

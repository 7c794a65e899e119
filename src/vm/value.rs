//! Runtime values.
//!
//! Boxed and primitive values share one representation: boxing is a change
//! of static type only, so a boxed `Integer` at run time is `Value::Int` or
//! `Value::Null`.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::Zero;
use tsbc_core::ClassId;

/// A value on the VM stack or in a local slot.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    /// UTF-16 code unit
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    BigInt(Rc<BigInt>),
    Str(Rc<str>),
    /// A `java.util.List`
    List(Rc<Vec<Value>>),
    Array(Rc<Vec<Value>>),
    /// A `java.util.Map` keyed by text
    Map(Rc<BTreeMap<String, Value>>),
    /// An instance of a class with no special runtime support.
    Opaque(ClassId),
}

impl Value {
    pub fn str(text: &str) -> Self {
        Value::Str(Rc::from(text))
    }

    pub fn big(value: impl Into<BigInt>) -> Self {
        Value::BigInt(Rc::new(value.into()))
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(Rc::new(items.into_iter().collect()))
    }

    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(Rc::new(items.into_iter().collect()))
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(Rc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the runtime kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Char(_) => "char",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::BigInt(_) => "bigint",
            Value::Str(_) => "String",
            Value::List(_) => "List",
            Value::Array(_) => "array",
            Value::Map(_) => "Map",
            Value::Opaque(_) => "Object",
        }
    }

    /// Truthiness used by `&&` and `||`.
    ///
    /// Booleans by value, numbers when non-zero and not NaN, strings when
    /// non-empty, `null` is false and every other reference is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Byte(v) => *v != 0,
            Value::Short(v) => *v != 0,
            Value::Char(v) => *v != 0,
            Value::Int(v) => *v != 0,
            Value::Long(v) => *v != 0,
            Value::Float(v) => *v != 0.0 && !v.is_nan(),
            Value::Double(v) => *v != 0.0 && !v.is_nan(),
            Value::BigInt(v) => !v.is_zero(),
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Array(_) | Value::Map(_) | Value::Opaque(_) => true,
        }
    }
}

/// Value equality of references: same runtime kind and equal contents.
///
/// Floating values compare by bit pattern, so `NaN` equals itself and
/// `0.0` differs from `-0.0`. Numbers of different kinds are never equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

/// Java text forms, as produced by string conversion and concatenation.
///
/// Arrays print their elements like lists, not the JVM identity form
/// (`[I@1b6d3586`).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Char(c) => write!(f, "{}", String::from_utf16_lossy(&[*c])),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => {
                let text = float_text(f64::from(*v), &v.to_string(), &format!("{:e}", v));
                write!(f, "{}", text)
            }
            Value::Double(v) => write!(f, "{}", float_text(*v, &v.to_string(), &format!("{:e}", v))),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) | Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Opaque(class) => write!(f, "Object@{}", class),
        }
    }
}

/// Text form of a floating value in the target runtime's format.
///
/// `plain` and `scientific` are the shortest round-trip renderings of the
/// value at its own precision; `magnitude` decides between them.
fn float_text(magnitude: f64, plain: &str, scientific: &str) -> String {
    if magnitude.is_nan() {
        return "NaN".to_string();
    }
    if magnitude.is_infinite() {
        return if magnitude > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let abs = magnitude.abs();
    if abs == 0.0 || (1e-3..1e7).contains(&abs) {
        if plain.contains('.') {
            plain.to_string()
        } else {
            format!("{}.0", plain)
        }
    } else {
        let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific, "0"));
        if mantissa.contains('.') {
            format!("{}E{}", mantissa, exponent)
        } else {
            format!("{}.0E{}", mantissa, exponent)
        }
    }
}

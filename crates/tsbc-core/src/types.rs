//! Static types seen by the binary-expression engine.
//!
//! [`TypeKind`] is the closed set of static types an operand can have after
//! upstream type checking. Numeric types come in two flavours, the primitive
//! form and the boxed wrapper form; boxed-ness is an orthogonal property that
//! the resolver always removes with an explicit unbox step.

use std::fmt;

use bitflags::bitflags;

use crate::ClassId;

/// The ordered numeric kinds of the type lattice.
///
/// Declaration order is the widening order used by
/// [`NumericKind::width_rank`]; `Char` sits with `Short` because both are
/// 16 bits wide and both promote to `Int` in any binary context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NumericKind {
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    BigInt,
}

impl NumericKind {
    /// All numeric kinds, narrowest first.
    pub const ALL: [NumericKind; 8] = [
        NumericKind::Byte,
        NumericKind::Short,
        NumericKind::Char,
        NumericKind::Int,
        NumericKind::Long,
        NumericKind::Float,
        NumericKind::Double,
        NumericKind::BigInt,
    ];

    /// Whether this kind is an integer kind (fixed-width or unlimited).
    pub const fn is_integral(self) -> bool {
        !self.is_floating()
    }

    /// Whether this kind is `float` or `double`.
    pub const fn is_floating(self) -> bool {
        matches!(self, NumericKind::Float | NumericKind::Double)
    }

    /// Whether this kind has a fixed bit width.
    pub const fn is_fixed_width(self) -> bool {
        !matches!(self, NumericKind::BigInt)
    }

    /// Bit width of the kind, `None` for the unlimited-width integer.
    pub const fn bit_width(self) -> Option<u32> {
        match self {
            NumericKind::Byte => Some(8),
            NumericKind::Short | NumericKind::Char => Some(16),
            NumericKind::Int | NumericKind::Float => Some(32),
            NumericKind::Long | NumericKind::Double => Some(64),
            NumericKind::BigInt => None,
        }
    }

    /// Position in the widening order. Higher rank = wider type.
    pub const fn width_rank(self) -> u8 {
        match self {
            NumericKind::Byte => 1,
            NumericKind::Short | NumericKind::Char => 2,
            NumericKind::Int => 3,
            NumericKind::Long => 4,
            NumericKind::Float => 5,
            NumericKind::Double => 6,
            NumericKind::BigInt => 7,
        }
    }

    /// The primitive type for this kind.
    pub const fn primitive(self) -> TypeKind {
        match self {
            NumericKind::Byte => TypeKind::Byte,
            NumericKind::Short => TypeKind::Short,
            NumericKind::Char => TypeKind::Char,
            NumericKind::Int => TypeKind::Int,
            NumericKind::Long => TypeKind::Long,
            NumericKind::Float => TypeKind::Float,
            NumericKind::Double => TypeKind::Double,
            NumericKind::BigInt => TypeKind::BigInt,
        }
    }

    /// The boxed wrapper type for this kind.
    pub const fn boxed(self) -> TypeKind {
        match self {
            NumericKind::Byte => TypeKind::BoxedByte,
            NumericKind::Short => TypeKind::BoxedShort,
            NumericKind::Char => TypeKind::BoxedChar,
            NumericKind::Int => TypeKind::BoxedInt,
            NumericKind::Long => TypeKind::BoxedLong,
            NumericKind::Float => TypeKind::BoxedFloat,
            NumericKind::Double => TypeKind::BoxedDouble,
            NumericKind::BigInt => TypeKind::BoxedBigInt,
        }
    }

    /// Source-facing name of the primitive form.
    pub const fn name(self) -> &'static str {
        match self {
            NumericKind::Byte => "byte",
            NumericKind::Short => "short",
            NumericKind::Char => "char",
            NumericKind::Int => "int",
            NumericKind::Long => "long",
            NumericKind::Float => "float",
            NumericKind::Double => "double",
            NumericKind::BigInt => "bigint",
        }
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Classification bits derived from a [`TypeKind`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeTraits: u16 {
        const NUMERIC = 1 << 0;
        const INTEGRAL = 1 << 1;
        const FLOATING = 1 << 2;
        const UNLIMITED = 1 << 3;
        const BOOLEAN = 1 << 4;
        const BOXED = 1 << 5;
        const TEXT = 1 << 6;
        const REFERENCE = 1 << 7;
        const NULLABLE = 1 << 8;
        const ARRAY = 1 << 9;
        const NULL = 1 << 10;
    }
}

/// A static operand or result type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    /// Unlimited-width integer (`bigint`).
    BigInt,
    BoxedBoolean,
    BoxedByte,
    BoxedShort,
    BoxedChar,
    BoxedInt,
    BoxedLong,
    BoxedFloat,
    BoxedDouble,
    BoxedBigInt,
    String,
    /// The type of the `null` literal.
    Null,
    /// Dynamic top type (`any`, `unknown`).
    Object,
    Reference(ClassId),
    Array(Box<TypeKind>),
}

impl TypeKind {
    /// Array of the given element type.
    pub fn array_of(element: TypeKind) -> TypeKind {
        TypeKind::Array(Box::new(element))
    }

    /// The numeric kind of this type, looking through boxing.
    pub const fn numeric_kind(&self) -> Option<NumericKind> {
        match self {
            TypeKind::Byte | TypeKind::BoxedByte => Some(NumericKind::Byte),
            TypeKind::Short | TypeKind::BoxedShort => Some(NumericKind::Short),
            TypeKind::Char | TypeKind::BoxedChar => Some(NumericKind::Char),
            TypeKind::Int | TypeKind::BoxedInt => Some(NumericKind::Int),
            TypeKind::Long | TypeKind::BoxedLong => Some(NumericKind::Long),
            TypeKind::Float | TypeKind::BoxedFloat => Some(NumericKind::Float),
            TypeKind::Double | TypeKind::BoxedDouble => Some(NumericKind::Double),
            TypeKind::BigInt | TypeKind::BoxedBigInt => Some(NumericKind::BigInt),
            _ => None,
        }
    }

    /// Whether this is one of the boxed wrapper types.
    pub const fn is_boxed(&self) -> bool {
        matches!(
            self,
            TypeKind::BoxedBoolean
                | TypeKind::BoxedByte
                | TypeKind::BoxedShort
                | TypeKind::BoxedChar
                | TypeKind::BoxedInt
                | TypeKind::BoxedLong
                | TypeKind::BoxedFloat
                | TypeKind::BoxedDouble
                | TypeKind::BoxedBigInt
        )
    }

    /// Whether this is a primitive value type (never null).
    pub const fn is_primitive(&self) -> bool {
        matches!(
            self,
            TypeKind::Boolean
                | TypeKind::Byte
                | TypeKind::Short
                | TypeKind::Char
                | TypeKind::Int
                | TypeKind::Long
                | TypeKind::Float
                | TypeKind::Double
                | TypeKind::BigInt
        )
    }

    /// Whether the type is boolean, boxed or not.
    pub const fn is_boolean(&self) -> bool {
        matches!(self, TypeKind::Boolean | TypeKind::BoxedBoolean)
    }

    /// Whether the type is numeric, boxed or not.
    pub const fn is_numeric(&self) -> bool {
        self.numeric_kind().is_some()
    }

    /// Whether the type is an integral numeric type, boxed or not.
    pub const fn is_integral(&self) -> bool {
        match self.numeric_kind() {
            Some(kind) => kind.is_integral(),
            None => false,
        }
    }

    /// Whether the type is `float`/`double`, boxed or not.
    pub const fn is_floating(&self) -> bool {
        match self.numeric_kind() {
            Some(kind) => kind.is_floating(),
            None => false,
        }
    }

    /// Whether the type is the unlimited-width integer, boxed or not.
    pub const fn is_big_int(&self) -> bool {
        matches!(self, TypeKind::BigInt | TypeKind::BoxedBigInt)
    }

    /// Whether a value of this type is a heap reference.
    pub const fn is_reference(&self) -> bool {
        !self.is_primitive()
    }

    /// Whether the type can never hold a null reference.
    pub const fn is_statically_non_null(&self) -> bool {
        self.is_primitive()
    }

    /// The primitive counterpart of a boxed type; other types map to themselves.
    pub fn unboxed(&self) -> TypeKind {
        match self {
            TypeKind::BoxedBoolean => TypeKind::Boolean,
            other => match other.numeric_kind() {
                Some(kind) => kind.primitive(),
                None => other.clone(),
            },
        }
    }

    /// The boxed counterpart of a primitive type; other types map to themselves.
    pub fn boxed(&self) -> TypeKind {
        match self {
            TypeKind::Boolean => TypeKind::BoxedBoolean,
            other => match other.numeric_kind() {
                Some(kind) => kind.boxed(),
                None => other.clone(),
            },
        }
    }

    /// Field descriptor of the type on the target runtime.
    ///
    /// Class references erase to `java/lang/Object`; the registry owns the
    /// mapping from [`ClassId`] back to a qualified name.
    pub fn descriptor(&self) -> String {
        match self {
            TypeKind::Boolean => "Z".into(),
            TypeKind::Byte => "B".into(),
            TypeKind::Short => "S".into(),
            TypeKind::Char => "C".into(),
            TypeKind::Int => "I".into(),
            TypeKind::Long => "J".into(),
            TypeKind::Float => "F".into(),
            TypeKind::Double => "D".into(),
            TypeKind::BigInt | TypeKind::BoxedBigInt => "Ljava/math/BigInteger;".into(),
            TypeKind::BoxedBoolean => "Ljava/lang/Boolean;".into(),
            TypeKind::BoxedByte => "Ljava/lang/Byte;".into(),
            TypeKind::BoxedShort => "Ljava/lang/Short;".into(),
            TypeKind::BoxedChar => "Ljava/lang/Character;".into(),
            TypeKind::BoxedInt => "Ljava/lang/Integer;".into(),
            TypeKind::BoxedLong => "Ljava/lang/Long;".into(),
            TypeKind::BoxedFloat => "Ljava/lang/Float;".into(),
            TypeKind::BoxedDouble => "Ljava/lang/Double;".into(),
            TypeKind::String => "Ljava/lang/String;".into(),
            TypeKind::Null | TypeKind::Object | TypeKind::Reference(_) => {
                "Ljava/lang/Object;".into()
            }
            TypeKind::Array(element) => format!("[{}", element.descriptor()),
        }
    }

    /// Classification bits for rule matching.
    pub fn traits(&self) -> TypeTraits {
        let mut traits = TypeTraits::empty();
        if let Some(kind) = self.numeric_kind() {
            traits |= TypeTraits::NUMERIC;
            if kind.is_integral() {
                traits |= TypeTraits::INTEGRAL;
            } else {
                traits |= TypeTraits::FLOATING;
            }
            if !kind.is_fixed_width() {
                traits |= TypeTraits::UNLIMITED;
            }
        }
        if self.is_boolean() {
            traits |= TypeTraits::BOOLEAN;
        }
        if self.is_boxed() {
            traits |= TypeTraits::BOXED;
        }
        if self.is_reference() {
            traits |= TypeTraits::REFERENCE | TypeTraits::NULLABLE;
        }
        match self {
            TypeKind::String => traits |= TypeTraits::TEXT,
            TypeKind::Array(_) => traits |= TypeTraits::ARRAY,
            TypeKind::Null => traits |= TypeTraits::NULL,
            _ => {}
        }
        traits
    }
}

impl From<NumericKind> for TypeKind {
    fn from(kind: NumericKind) -> Self {
        kind.primitive()
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Boolean => f.write_str("boolean"),
            TypeKind::BoxedBoolean => f.write_str("Boolean"),
            TypeKind::BoxedByte => f.write_str("Byte"),
            TypeKind::BoxedShort => f.write_str("Short"),
            TypeKind::BoxedChar => f.write_str("Character"),
            TypeKind::BoxedInt => f.write_str("Integer"),
            TypeKind::BoxedLong => f.write_str("Long"),
            TypeKind::BoxedFloat => f.write_str("Float"),
            TypeKind::BoxedDouble => f.write_str("Double"),
            TypeKind::BoxedBigInt => f.write_str("BigInteger"),
            TypeKind::String => f.write_str("String"),
            TypeKind::Null => f.write_str("null"),
            TypeKind::Object => f.write_str("Object"),
            TypeKind::Reference(id) => write!(f, "class {}", id),
            TypeKind::Array(element) => write!(f, "{}[]", element),
            primitive => match primitive.numeric_kind() {
                Some(kind) => f.write_str(kind.name()),
                None => f.write_str("?"),
            },
        }
    }
}

//! Deterministic hash-based class identity.
//!
//! A [`ClassId`] is a 64-bit hash of a fully qualified class name. Because the
//! hash is computed from the name alone, the well-known runtime classes are
//! compile-time constants and the type-lookup oracle never needs a
//! registration order.

use std::fmt;

use xxhash_rust::const_xxh64::xxh64 as const_xxh64;

/// Domain marker mixed into every class hash.
const CLASS_DOMAIN: u64 = 0x2fac10b63a6cc57c;

/// Identity of a reference class known to the type oracle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ClassId(pub u64);

impl ClassId {
    /// Create a class id from a fully qualified class name.
    ///
    /// # Examples
    ///
    /// ```
    /// use tsbc_core::ClassId;
    ///
    /// assert_eq!(ClassId::from_name("java.util.List"), ClassId::LIST);
    /// assert_ne!(ClassId::from_name("java.util.Map"), ClassId::LIST);
    /// ```
    #[inline]
    pub const fn from_name(name: &str) -> Self {
        ClassId(CLASS_DOMAIN ^ const_xxh64(name.as_bytes(), 0))
    }

    /// `java.lang.Object`
    pub const OBJECT: ClassId = ClassId::from_name("java.lang.Object");
    /// `java.lang.CharSequence`
    pub const CHAR_SEQUENCE: ClassId = ClassId::from_name("java.lang.CharSequence");
    /// `java.util.Collection`
    pub const COLLECTION: ClassId = ClassId::from_name("java.util.Collection");
    /// `java.util.List`
    pub const LIST: ClassId = ClassId::from_name("java.util.List");
    /// `java.util.ArrayList`
    pub const ARRAY_LIST: ClassId = ClassId::from_name("java.util.ArrayList");
    /// `java.util.LinkedList`
    pub const LINKED_LIST: ClassId = ClassId::from_name("java.util.LinkedList");
    /// `java.util.Map`
    pub const MAP: ClassId = ClassId::from_name("java.util.Map");
    /// `java.util.HashMap`
    pub const HASH_MAP: ClassId = ClassId::from_name("java.util.HashMap");
    /// `java.util.LinkedHashMap`
    pub const LINKED_HASH_MAP: ClassId = ClassId::from_name("java.util.LinkedHashMap");
    /// `java.util.TreeMap`
    pub const TREE_MAP: ClassId = ClassId::from_name("java.util.TreeMap");
    /// `java.util.regex.Pattern`
    pub const PATTERN: ClassId = ClassId::from_name("java.util.regex.Pattern");
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({:#018x})", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

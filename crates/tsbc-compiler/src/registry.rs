//! ClassRegistry - class hierarchy oracle for reference types.
//!
//! The binary-expression engine only needs two answers about classes: whether
//! one is assignable to another (strict equality, context boundaries) and
//! which membership protocol a class supports (the `in` operator).

use rustc_hash::{FxHashMap, FxHashSet};
use tsbc_core::ClassId;

/// Membership protocol a class supports for `key in value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipProtocol {
    /// Index bounds check against the collection size.
    List,
    /// Key lookup using the text form of the probe.
    Map,
}

/// Type-lookup oracle consulted by the resolver.
pub trait ClassOracle {
    /// Whether a value of class `from` can be used where `to` is expected.
    fn is_assignable(&self, from: ClassId, to: ClassId) -> bool;

    /// The membership protocol of a class, if it has one.
    fn membership(&self, class: ClassId) -> Option<MembershipProtocol>;

    /// Qualified name of a class, when known.
    fn class_name(&self, class: ClassId) -> Option<&str>;
}

#[derive(Debug, Clone)]
struct ClassEntry {
    name: String,
    supertypes: Vec<ClassId>,
}

/// Registry of known classes and their direct supertypes.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: FxHashMap<ClassId, ClassEntry>,
}

impl ClassRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry preloaded with the runtime collection hierarchy.
    pub fn with_runtime_classes() -> Self {
        let mut registry = Self::new();
        registry.register("java.lang.Object", &[]);
        registry.register("java.lang.CharSequence", &["java.lang.Object"]);
        registry.register("java.util.regex.Pattern", &["java.lang.Object"]);
        registry.register("java.util.Collection", &["java.lang.Object"]);
        registry.register("java.util.List", &["java.util.Collection"]);
        registry.register("java.util.ArrayList", &["java.util.List"]);
        registry.register("java.util.LinkedList", &["java.util.List"]);
        registry.register("java.util.Map", &["java.lang.Object"]);
        registry.register("java.util.HashMap", &["java.util.Map"]);
        registry.register("java.util.LinkedHashMap", &["java.util.HashMap"]);
        registry.register("java.util.TreeMap", &["java.util.Map"]);
        registry
    }

    /// Register a class by qualified name with its direct supertypes.
    ///
    /// Re-registering a name replaces its supertypes.
    pub fn register(&mut self, name: &str, supertypes: &[&str]) -> ClassId {
        let id = ClassId::from_name(name);
        self.classes.insert(
            id,
            ClassEntry {
                name: name.to_string(),
                supertypes: supertypes.iter().map(|s| ClassId::from_name(s)).collect(),
            },
        );
        id
    }

    /// Look up a class by qualified name.
    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        let id = ClassId::from_name(name);
        self.classes.contains_key(&id).then_some(id)
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no class is registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassOracle for ClassRegistry {
    fn is_assignable(&self, from: ClassId, to: ClassId) -> bool {
        if from == to || to == ClassId::OBJECT {
            return true;
        }
        let mut visited = FxHashSet::default();
        let mut pending = vec![from];
        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(entry) = self.classes.get(&current) else {
                continue;
            };
            for &parent in &entry.supertypes {
                if parent == to {
                    return true;
                }
                pending.push(parent);
            }
        }
        false
    }

    fn membership(&self, class: ClassId) -> Option<MembershipProtocol> {
        if self.is_assignable(class, ClassId::LIST) {
            Some(MembershipProtocol::List)
        } else if self.is_assignable(class, ClassId::MAP) {
            Some(MembershipProtocol::Map)
        } else {
            None
        }
    }

    fn class_name(&self, class: ClassId) -> Option<&str> {
        self.classes.get(&class).map(|entry| entry.name.as_str())
    }
}

use std::collections::HashMap;

use crate::idl_type::IdlType;

/// The full typedef table for one compilation unit: a flat mapping from
/// typedef name to the replacement type.
///
/// [`IdlType::resolve_typedefs`] substitutes replacements as-is, one level
/// deep; it does not re-resolve a replacement that itself mentions another
/// typedef. The values stored here must therefore already be maximally
/// resolved. [`CompilationUnit::build`](crate::CompilationUnit::build)
/// guarantees that by expanding typedef bodies in dependency order and
/// rejecting cycles.
#[derive(Debug, Clone, Default)]
pub struct TypedefTable {
    typedefs: HashMap<String, IdlType>,
}

impl TypedefTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a replacement, returning the previous one if the name was
    /// already mapped.
    pub fn insert(&mut self, name: impl Into<String>, ty: IdlType) -> Option<IdlType> {
        self.typedefs.insert(name.into(), ty)
    }

    pub fn get(&self, name: &str) -> Option<&IdlType> {
        self.typedefs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.typedefs.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.typedefs.is_empty()
    }

    /// Convenience for [`IdlType::resolve_typedefs`].
    pub fn resolve(&self, ty: &IdlType) -> IdlType {
        ty.resolve_typedefs(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_substitutes_leaves_inside_composites() {
        let mut typedefs = TypedefTable::new();
        typedefs.insert("Distance", IdlType::basic("double"));

        let ty = IdlType::sequence(IdlType::basic("Distance"));
        let resolved = typedefs.resolve(&ty);
        assert_eq!(resolved.to_string(), "sequence<double>");
    }

    #[test]
    fn resolution_is_idempotent_for_single_level_mappings() {
        let mut typedefs = TypedefTable::new();
        typedefs.insert("Distance", IdlType::basic("double"));

        let ty = IdlType::sequence(IdlType::nullable(IdlType::basic("Distance")));
        let once = typedefs.resolve(&ty);
        let twice = typedefs.resolve(&once);
        assert_eq!(once.type_name(), twice.type_name());
        assert_eq!(once.to_string(), twice.to_string());
    }

    #[test]
    fn unmapped_leaves_are_left_untouched() {
        let mut typedefs = TypedefTable::new();
        typedefs.insert("Distance", IdlType::basic("double"));

        let ty = IdlType::sequence(IdlType::basic("long"));
        assert_eq!(typedefs.resolve(&ty), ty);
    }

    #[test]
    fn replacements_are_inserted_as_is() {
        // One-level substitution: the replacement is not itself resolved.
        let mut typedefs = TypedefTable::new();
        typedefs.insert("A", IdlType::basic("B"));
        typedefs.insert("B", IdlType::basic("long"));

        let resolved = typedefs.resolve(&IdlType::basic("A"));
        assert_eq!(resolved, IdlType::basic("B"));
    }
}

use std::collections::HashMap;

/// Answers reflexive-transitive "does interface A inherit from interface B"
/// queries against a precomputed ancestor map.
///
/// The table stores the full transitive closure per interface, nearest
/// ancestor first; [`CompilationUnit::build`](crate::CompilationUnit::build)
/// computes it from the parsed parent links before any query runs.
#[derive(Debug, Clone, Default)]
pub struct InheritanceTable {
    ancestors: HashMap<String, Vec<String>>,
}

impl InheritanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk merge; re-adding an interface overwrites its ancestor list.
    pub fn add_ancestors<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        self.ancestors.extend(entries);
    }

    /// The ancestors of `interface`, nearest first. Empty for unknown
    /// interfaces and for interfaces without a parent.
    pub fn ancestors(&self, interface: &str) -> &[String] {
        self.ancestors
            .get(interface)
            .map_or(&[], Vec::as_slice)
    }

    /// True when `interface == ancestor` or `ancestor` appears in the
    /// ancestor list of `interface`.
    pub fn inherits(&self, interface: &str, ancestor: &str) -> bool {
        interface == ancestor || self.ancestors(interface).iter().any(|a| a == ancestor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> InheritanceTable {
        let mut table = InheritanceTable::new();
        table.add_ancestors([("B".to_string(), vec!["A".to_string()])]);
        table
    }

    #[test]
    fn inherits_is_reflexive() {
        let table = table();
        assert!(table.inherits("A", "A"));
        assert!(table.inherits("Unknown", "Unknown"));
    }

    #[test]
    fn inherits_follows_the_ancestor_list_one_way() {
        let table = table();
        assert!(table.inherits("B", "A"));
        assert!(!table.inherits("A", "B"));
    }

    #[test]
    fn unknown_interfaces_have_no_ancestors() {
        assert!(table().ancestors("Unknown").is_empty());
    }
}

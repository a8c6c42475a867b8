use std::collections::{HashMap, HashSet};

use crate::builtins::STANDARD_CALLBACK_FUNCTIONS;

/// Central lookup for classifying bare type names within one compilation
/// unit: is this name a dictionary, an enumeration, a callback function or
/// a callback interface?
///
/// One registry belongs to one [`CompilationUnit`](crate::CompilationUnit);
/// it is populated fully (bulk adds) before any resolution pass reads it.
/// Names that match none of the categories classify as interface types by
/// default.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    callback_functions: HashSet<String>,
    callback_interfaces: HashSet<String>,
    dictionaries: HashSet<String>,
    enumerations: HashMap<String, Vec<String>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self {
            callback_functions: STANDARD_CALLBACK_FUNCTIONS
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            callback_interfaces: HashSet::new(),
            dictionaries: HashSet::new(),
            enumerations: HashMap::new(),
        }
    }
}

impl TypeRegistry {
    /// A fresh registry, seeded with the standard callback-function names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `enums` into the enumeration table. Re-adding a name
    /// overwrites its value list.
    pub fn add_enums<I>(&mut self, enums: I)
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        self.enumerations.extend(enums);
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enumerations.contains_key(name)
    }

    /// The ordered permitted values of an enumeration, `None` if `name` is
    /// not a known enumeration.
    pub fn enum_values(&self, name: &str) -> Option<&[String]> {
        self.enumerations.get(name).map(Vec::as_slice)
    }
}

macro_rules! impl_name_set {
    ($field:ident: $add:ident / $is:ident) => {
        impl TypeRegistry {
            /// Merges `names` into the set; adding a name twice is a no-op.
            pub fn $add<I>(&mut self, names: I)
            where
                I: IntoIterator,
                I::Item: Into<String>,
            {
                self.$field.extend(names.into_iter().map(Into::into));
            }

            pub fn $is(&self, name: &str) -> bool {
                self.$field.contains(name)
            }
        }
    };
}

impl_name_set!(callback_functions: add_callback_functions / is_callback_function);
impl_name_set!(callback_interfaces: add_callback_interfaces / is_callback_interface);
impl_name_set!(dictionaries: add_dictionaries / is_dictionary);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_with_standard_callback_functions() {
        let registry = TypeRegistry::new();
        assert!(registry.is_callback_function("EventHandler"));
        assert!(registry.is_callback_function("OnErrorEventHandler"));
        assert!(!registry.is_callback_function("Unknown"));
    }

    #[test]
    fn set_adds_are_idempotent() {
        let mut registry = TypeRegistry::new();
        registry.add_dictionaries(["Foo", "Bar"]);
        registry.add_dictionaries(["Foo"]);
        assert!(registry.is_dictionary("Foo"));
        assert!(registry.is_dictionary("Bar"));
        assert!(!registry.is_dictionary("Baz"));
    }

    #[test]
    fn re_adding_an_enum_overwrites_its_values() {
        let mut registry = TypeRegistry::new();
        registry.add_enums([("Mode".to_string(), vec!["a".to_string()])]);
        registry.add_enums([("Mode".to_string(), vec!["b".to_string()])]);
        assert_eq!(registry.enum_values("Mode"), Some(&["b".to_string()][..]));
        assert_eq!(registry.enum_values("Other"), None);
    }
}

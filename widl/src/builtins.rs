use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;

/// Callback functions defined by the platform itself rather than by any one
/// fragment; every [`TypeRegistry`](crate::TypeRegistry) starts out knowing
/// these.
pub const STANDARD_CALLBACK_FUNCTIONS: &[&str] = &["EventHandler", "OnErrorEventHandler"];

/// Primitive type names spelled with more than one word. Ordered longest
/// first so that greedy matching in the tokenizer picks up the full name.
pub const MULTI_WORD_TYPES: &[&str] = &[
    "unsigned long long",
    "unrestricted double",
    "unrestricted float",
    "unsigned short",
    "unsigned long",
    "long long",
];

lazy_static! {
    /// Integer types (Web IDL §3.10.5)
    pub static ref INTEGER_TYPES: HashSet<&'static str> = [
        "byte",
        "octet",
        "short",
        "unsigned short",
        "long",
        "unsigned long",
        "long long",
        "unsigned long long",
    ]
    .into_iter()
    .collect();

    /// Numeric types: the integer types plus the four floating point types
    /// (Web IDL §3.10.6)
    pub static ref NUMERIC_TYPES: HashSet<&'static str> = INTEGER_TYPES
        .iter()
        .copied()
        .chain([
            "float",
            "unrestricted float",
            "double",
            "unrestricted double",
        ])
        .collect();

    /// Primitive types: numeric types and `boolean` (Web IDL §3.10.4)
    pub static ref PRIMITIVE_TYPES: HashSet<&'static str> = NUMERIC_TYPES
        .iter()
        .copied()
        .chain(["boolean"])
        .collect();

    pub static ref STRING_TYPES: HashSet<&'static str> =
        ["DOMString", "ByteString", "USVString"].into_iter().collect();

    /// Everything a bare name can denote without consulting a registry.
    /// Note that `any` is deliberately absent; it is special-cased by the
    /// classification predicates.
    pub static ref BASIC_TYPES: HashSet<&'static str> = PRIMITIVE_TYPES
        .iter()
        .copied()
        .chain(STRING_TYPES.iter().copied())
        .chain(["Date", "object", "void"])
        .collect();

    /// How each built-in name is spelled inside a generated identifier.
    /// Names not listed here pass through unchanged.
    pub static ref TYPE_NAMES: HashMap<&'static str, &'static str> = [
        ("any", "Any"),
        ("boolean", "Boolean"),
        ("byte", "Byte"),
        ("octet", "Octet"),
        ("short", "Short"),
        ("unsigned short", "UnsignedShort"),
        ("long", "Long"),
        ("unsigned long", "UnsignedLong"),
        ("long long", "LongLong"),
        ("unsigned long long", "UnsignedLongLong"),
        ("float", "Float"),
        ("unrestricted float", "UnrestrictedFloat"),
        ("double", "Double"),
        ("unrestricted double", "UnrestrictedDouble"),
        ("DOMString", "String"),
        ("ByteString", "ByteString"),
        ("USVString", "USVString"),
        ("Date", "Date"),
        ("object", "Object"),
        ("void", "Void"),
    ]
    .into_iter()
    .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_tables_nest() {
        for name in INTEGER_TYPES.iter() {
            assert!(NUMERIC_TYPES.contains(name));
        }
        for name in NUMERIC_TYPES.iter() {
            assert!(PRIMITIVE_TYPES.contains(name));
        }
        for name in PRIMITIVE_TYPES.iter() {
            assert!(BASIC_TYPES.contains(name));
        }
    }

    #[test]
    fn any_is_not_basic() {
        assert!(!BASIC_TYPES.contains("any"));
        assert_eq!(TYPE_NAMES.get("any"), Some(&"Any"));
    }

    #[test]
    fn every_basic_type_has_a_spelling() {
        for name in BASIC_TYPES.iter() {
            assert!(TYPE_NAMES.contains_key(name), "missing spelling for {name}");
        }
    }
}

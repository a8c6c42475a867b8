use std::collections::{HashMap, HashSet};

use dt_widl::{CompilationUnit, IdlError, IdlType, TypeRegistry, UnionType};

/// Every type expression declared anywhere in the unit, in declaration
/// order.
pub(super) fn declared_types(unit: &CompilationUnit) -> impl Iterator<Item = &IdlType> {
    let interface_types = unit.interfaces().iter().flat_map(|interface| {
        interface
            .attributes
            .iter()
            .map(|attribute| &attribute.ty)
            .chain(interface.operations.iter().flat_map(|operation| {
                std::iter::once(&operation.return_type)
                    .chain(operation.arguments.iter().map(|argument| &argument.ty))
            }))
    });
    let dictionary_types = unit
        .dictionaries()
        .iter()
        .flat_map(|dictionary| dictionary.members.iter().map(|member| &member.ty));
    let callback_types = unit.callback_functions().iter().flat_map(|callback| {
        std::iter::once(&callback.return_type)
            .chain(callback.arguments.iter().map(|argument| &argument.ty))
    });
    let typedef_types = unit.typedefs().iter().map(|typedef| &typedef.ty);

    interface_types
        .chain(dictionary_types)
        .chain(callback_types)
        .chain(typedef_types)
}

/// Collects every distinct union referenced anywhere in the unit, in
/// first-appearance order. Distinctness follows the union's composite name,
/// so `(A or B)` mentioned in two places yields one entry.
pub(super) fn collect_union_types(unit: &CompilationUnit) -> Vec<&UnionType> {
    let mut seen = HashSet::new();
    let mut unions = Vec::new();
    for ty in declared_types(unit) {
        for node in ty.referenced_types() {
            if let IdlType::Union(union) = node {
                if seen.insert(union.name()) {
                    unions.push(union);
                }
            }
        }
    }
    unions
}

/// A generator must be able to tell the members of a union apart by the
/// shape of an incoming value. Two members classifying into the same
/// category make that impossible and abort the unit.
pub(super) fn check_union_distinguishable(
    union: &UnionType,
    registry: &TypeRegistry,
) -> Result<(), IdlError> {
    let mut seen: HashMap<&'static str, &IdlType> = HashMap::new();
    for member in union.member_types() {
        let category = member_category(member, registry);
        if let Some(first) = seen.insert(category, member) {
            return Err(IdlError::AmbiguousUnionMember {
                union: union.name(),
                category,
                first: first.to_string(),
                second: member.to_string(),
            });
        }
    }
    Ok(())
}

fn member_category(ty: &IdlType, registry: &TypeRegistry) -> &'static str {
    if ty.base_type() == Some("boolean") {
        "a boolean type"
    } else if ty.is_numeric_type() {
        "a numeric type"
    } else if ty.is_string_type() || ty.is_enum(registry) {
        "a string-like type"
    } else if ty.is_array_or_sequence_type() {
        "a sequence type"
    } else if ty.is_dictionary(registry) {
        "a dictionary type"
    } else if ty.is_callback_function(registry) {
        "a callback type"
    } else {
        "an object type"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_widl::compile_fragments;

    #[test]
    fn unions_are_collected_once_per_name() {
        let unit = compile_fragments([
            "interface I {
                 void f((DOMString or long) value);
                 (DOMString or long) g();
                 void h((long or boolean) other);
             };",
        ])
        .unwrap();

        let unions = collect_union_types(&unit);
        let names: Vec<_> = unions.iter().map(|u| u.name()).collect();
        assert_eq!(names, ["StringOrLong", "LongOrBoolean"]);
    }

    #[test]
    fn overlapping_members_are_ambiguous() {
        let unit = compile_fragments([
            "interface I { void f((DOMString or ByteString) value); };",
        ])
        .unwrap();
        let unions = collect_union_types(&unit);
        let result = check_union_distinguishable(unions[0], unit.registry());
        assert!(matches!(
            result,
            Err(IdlError::AmbiguousUnionMember { category, .. })
                if category == "a string-like type"
        ));
    }

    #[test]
    fn enums_count_as_string_like() {
        let unit = compile_fragments([
            "enum Mode { \"a\" };
             interface I { void f((Mode or DOMString) value); };",
        ])
        .unwrap();
        let unions = collect_union_types(&unit);
        assert!(check_union_distinguishable(unions[0], unit.registry()).is_err());
    }
}

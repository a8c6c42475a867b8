use std::collections::{HashMap, HashSet};

use crate::decl::{CallbackFunction, Dictionary, Enumeration, Fragment, Interface, Typedef};
use crate::error::IdlError;
use crate::idl_type::{IdlType, UnionType};
use crate::inheritance::InheritanceTable;
use crate::registry::TypeRegistry;
use crate::typedef::TypedefTable;

/// The merged, registry-populated, fully resolved form of one or more
/// [`Fragment`]s, the form a generator consumes.
///
/// All tables are owned here and populated before any declaration type is
/// resolved; there is no global state, so independent units can coexist in
/// one process.
pub struct CompilationUnit {
    registry: TypeRegistry,
    inheritance: InheritanceTable,
    typedef_table: TypedefTable,
    interfaces: Vec<Interface>,
    dictionaries: Vec<Dictionary>,
    enumerations: Vec<Enumeration>,
    callback_functions: Vec<CallbackFunction>,
    typedefs: Vec<Typedef>,
}

impl CompilationUnit {
    /// Merges the fragments into one unit: detects duplicate definitions,
    /// populates the registry, computes the inheritance closure, expands
    /// typedef-of-typedef chains, and resolves and re-validates every
    /// declared type. Any failure aborts the whole unit.
    pub fn build(fragments: impl IntoIterator<Item = Fragment>) -> Result<Self, IdlError> {
        let mut interfaces = Vec::new();
        let mut dictionaries = Vec::new();
        let mut enumerations = Vec::new();
        let mut callback_functions = Vec::new();
        let mut typedefs = Vec::new();
        for fragment in fragments {
            interfaces.extend(fragment.interfaces);
            dictionaries.extend(fragment.dictionaries);
            enumerations.extend(fragment.enumerations);
            callback_functions.extend(fragment.callback_functions);
            typedefs.extend(fragment.typedefs);
        }

        // All definitions share one name space.
        let mut seen = HashSet::new();
        let names = interfaces
            .iter()
            .map(|i| &i.name)
            .chain(dictionaries.iter().map(|d| &d.name))
            .chain(enumerations.iter().map(|e| &e.name))
            .chain(callback_functions.iter().map(|c| &c.name))
            .chain(typedefs.iter().map(|t| &t.name));
        for name in names {
            if !seen.insert(name.clone()) {
                return Err(IdlError::DuplicateDefinition { name: name.clone() });
            }
        }

        let mut registry = TypeRegistry::new();
        registry.add_callback_functions(callback_functions.iter().map(|c| c.name.clone()));
        registry.add_callback_interfaces(
            interfaces
                .iter()
                .filter(|i| i.is_callback)
                .map(|i| i.name.clone()),
        );
        registry.add_dictionaries(dictionaries.iter().map(|d| d.name.clone()));
        registry.add_enums(
            enumerations
                .iter()
                .map(|e| (e.name.clone(), e.values.clone())),
        );

        let mut inheritance = InheritanceTable::new();
        inheritance.add_ancestors(interface_ancestors(&interfaces)?);
        check_dictionary_parents(&dictionaries)?;

        let raw_typedefs: HashMap<String, IdlType> = typedefs
            .iter()
            .map(|t| (t.name.clone(), t.ty.clone()))
            .collect();
        let typedef_table = expand_typedefs(&raw_typedefs)?;
        for typedef in &mut typedefs {
            // The expanded form; `get` cannot miss since the table was
            // built from these very names.
            typedef.ty = typedef_table
                .get(&typedef.name)
                .cloned()
                .unwrap_or_else(|| typedef.ty.clone());
        }

        for interface in &mut interfaces {
            for attribute in &mut interface.attributes {
                resolve_and_check(&mut attribute.ty, &typedef_table, &registry)?;
            }
            for operation in &mut interface.operations {
                resolve_and_check(&mut operation.return_type, &typedef_table, &registry)?;
                for argument in &mut operation.arguments {
                    resolve_and_check(&mut argument.ty, &typedef_table, &registry)?;
                }
            }
        }
        for dictionary in &mut dictionaries {
            for member in &mut dictionary.members {
                resolve_and_check(&mut member.ty, &typedef_table, &registry)?;
            }
        }
        for callback in &mut callback_functions {
            resolve_and_check(&mut callback.return_type, &typedef_table, &registry)?;
            for argument in &mut callback.arguments {
                resolve_and_check(&mut argument.ty, &typedef_table, &registry)?;
            }
        }

        Ok(Self {
            registry,
            inheritance,
            typedef_table,
            interfaces,
            dictionaries,
            enumerations,
            callback_functions,
            typedefs,
        })
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn inheritance(&self) -> &InheritanceTable {
        &self.inheritance
    }

    pub fn typedef_table(&self) -> &TypedefTable {
        &self.typedef_table
    }

    /// Interfaces in declaration order, types resolved.
    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    pub fn dictionaries(&self) -> &[Dictionary] {
        &self.dictionaries
    }

    pub fn enumerations(&self) -> &[Enumeration] {
        &self.enumerations
    }

    pub fn callback_functions(&self) -> &[CallbackFunction] {
        &self.callback_functions
    }

    /// Typedefs with maximally expanded bodies.
    pub fn typedefs(&self) -> &[Typedef] {
        &self.typedefs
    }

    /// Resolves an externally constructed type expression against this
    /// unit's typedef table.
    pub fn resolve_type(&self, ty: &IdlType) -> IdlType {
        self.typedef_table.resolve(ty)
    }
}

fn resolve_and_check(
    ty: &mut IdlType,
    typedefs: &TypedefTable,
    registry: &TypeRegistry,
) -> Result<(), IdlError> {
    *ty = typedefs.resolve(ty);
    for node in ty.referenced_types() {
        if let IdlType::Union(union) = node {
            union.validate(registry)?;
        }
    }
    Ok(())
}

/// Computes the transitive ancestor list per interface, nearest first.
fn interface_ancestors(
    interfaces: &[Interface],
) -> Result<Vec<(String, Vec<String>)>, IdlError> {
    let parents: HashMap<&str, Option<&str>> = interfaces
        .iter()
        .map(|i| (i.name.as_str(), i.parent.as_deref()))
        .collect();

    let mut entries = Vec::new();
    for interface in interfaces {
        let mut ancestors: Vec<String> = Vec::new();
        let mut current = interface.parent.as_deref();
        while let Some(parent) = current {
            if parent == interface.name || ancestors.iter().any(|a| a == parent) {
                return Err(IdlError::InheritanceCycle {
                    name: interface.name.clone(),
                });
            }
            let Some(next) = parents.get(parent) else {
                return Err(IdlError::UnknownInterface {
                    name: interface.name.clone(),
                    parent: parent.to_string(),
                });
            };
            ancestors.push(parent.to_string());
            current = *next;
        }
        if !ancestors.is_empty() {
            entries.push((interface.name.clone(), ancestors));
        }
    }
    Ok(entries)
}

fn check_dictionary_parents(dictionaries: &[Dictionary]) -> Result<(), IdlError> {
    let parents: HashMap<&str, Option<&str>> = dictionaries
        .iter()
        .map(|d| (d.name.as_str(), d.parent.as_deref()))
        .collect();

    for dictionary in dictionaries {
        let mut seen = vec![dictionary.name.as_str()];
        let mut current = dictionary.parent.as_deref();
        while let Some(parent) = current {
            if seen.contains(&parent) {
                return Err(IdlError::InheritanceCycle {
                    name: dictionary.name.clone(),
                });
            }
            let Some(next) = parents.get(parent) else {
                return Err(IdlError::UnknownDictionary {
                    name: dictionary.name.clone(),
                    parent: parent.to_string(),
                });
            };
            seen.push(parent);
            current = *next;
        }
    }
    Ok(())
}

/// Expands every typedef body so that the resulting table's values contain
/// no typedef names, satisfying the one-level-substitution contract of
/// [`TypedefTable`]. Cycles are fatal.
fn expand_typedefs(raw: &HashMap<String, IdlType>) -> Result<TypedefTable, IdlError> {
    let mut table = TypedefTable::new();
    let mut done = HashMap::new();
    for name in raw.keys() {
        let expanded = expand_name(name, raw, &mut done, &mut Vec::new())?;
        table.insert(name.clone(), expanded);
    }
    Ok(table)
}

fn expand_name(
    name: &str,
    raw: &HashMap<String, IdlType>,
    done: &mut HashMap<String, IdlType>,
    in_progress: &mut Vec<String>,
) -> Result<IdlType, IdlError> {
    if let Some(expanded) = done.get(name) {
        return Ok(expanded.clone());
    }
    if in_progress.iter().any(|n| n == name) {
        return Err(IdlError::TypedefCycle {
            name: name.to_string(),
        });
    }
    in_progress.push(name.to_string());
    let expanded = expand_type(&raw[name], raw, done, in_progress)?;
    in_progress.pop();
    done.insert(name.to_string(), expanded.clone());
    Ok(expanded)
}

fn expand_type(
    ty: &IdlType,
    raw: &HashMap<String, IdlType>,
    done: &mut HashMap<String, IdlType>,
    in_progress: &mut Vec<String>,
) -> Result<IdlType, IdlError> {
    match ty {
        IdlType::Basic(name) if raw.contains_key(name) => {
            expand_name(name, raw, done, in_progress)
        }
        IdlType::Basic(_) => Ok(ty.clone()),
        IdlType::Union(union) => {
            let member_types = union
                .member_types()
                .iter()
                .map(|member| expand_type(member, raw, done, in_progress))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(IdlType::Union(UnionType::rebuilt(member_types)))
        }
        IdlType::Array(element) => Ok(IdlType::array(expand_type(
            element,
            raw,
            done,
            in_progress,
        )?)),
        IdlType::Sequence(element) => Ok(IdlType::sequence(expand_type(
            element,
            raw,
            done,
            in_progress,
        )?)),
        IdlType::Nullable(inner) => Ok(IdlType::nullable(expand_type(
            inner,
            raw,
            done,
            in_progress,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(source: &str) -> Result<CompilationUnit, IdlError> {
        CompilationUnit::build([Fragment::parse(source).unwrap()])
    }

    #[test]
    fn typedef_chains_resolve_fully() {
        let unit = unit(
            "typedef double Distance;
             typedef Distance Length;
             interface Shape {
                 attribute sequence<Length> outline;
             };",
        )
        .unwrap();

        let outline = &unit.interfaces()[0].attributes[0];
        assert_eq!(outline.ty.to_string(), "sequence<double>");
        assert_eq!(
            unit.typedef_table().get("Length"),
            Some(&IdlType::basic("double"))
        );
    }

    #[test]
    fn typedef_cycles_are_fatal() {
        let result = unit("typedef B A; typedef A B;");
        assert!(matches!(result, Err(IdlError::TypedefCycle { .. })));
    }

    #[test]
    fn inheritance_closure_reaches_grandparents() {
        let unit = unit(
            "interface A {};
             interface B : A {};
             interface C : B {};",
        )
        .unwrap();

        let inheritance = unit.inheritance();
        assert!(inheritance.inherits("C", "A"));
        assert!(inheritance.inherits("C", "B"));
        assert!(inheritance.inherits("C", "C"));
        assert!(!inheritance.inherits("A", "C"));
        assert_eq!(inheritance.ancestors("C"), ["B", "A"]);
    }

    #[test]
    fn unknown_parents_are_fatal() {
        assert!(matches!(
            unit("interface B : Missing {};"),
            Err(IdlError::UnknownInterface { .. })
        ));
        assert!(matches!(
            unit("dictionary D : Missing {};"),
            Err(IdlError::UnknownDictionary { .. })
        ));
    }

    #[test]
    fn inheritance_cycles_are_fatal() {
        let result = unit("interface A : B {}; interface B : A {};");
        assert!(matches!(result, Err(IdlError::InheritanceCycle { .. })));
    }

    #[test]
    fn duplicate_definitions_are_fatal() {
        let result = unit("interface Foo {}; dictionary Foo {};");
        assert!(matches!(
            result,
            Err(IdlError::DuplicateDefinition { name }) if name == "Foo"
        ));
    }

    #[test]
    fn registry_is_populated_from_declarations() {
        let unit = unit(
            "dictionary Options {};
             enum Mode { \"a\" };
             callback Done = void ();
             callback interface Observer {};",
        )
        .unwrap();

        let registry = unit.registry();
        assert!(registry.is_dictionary("Options"));
        assert!(registry.is_enum("Mode"));
        assert!(registry.is_callback_function("Done"));
        assert!(registry.is_callback_interface("Observer"));
    }

    #[test]
    fn resolved_unions_are_revalidated() {
        // The nullable member only appears after typedef substitution.
        let result = unit(
            "typedef long? MaybeLong;
             dictionary Options {};
             interface I {
                 void f((Options or MaybeLong) value);
             };",
        );
        assert!(matches!(
            result,
            Err(IdlError::DictionaryWithNullableMember { .. })
        ));
    }

    #[test]
    fn multiple_fragments_merge_into_one_unit() {
        let first = Fragment::parse("typedef double Distance;").unwrap();
        let second =
            Fragment::parse("interface Shape { attribute Distance width; };").unwrap();
        let unit = CompilationUnit::build([first, second]).unwrap();
        assert_eq!(
            unit.interfaces()[0].attributes[0].ty,
            IdlType::basic("double")
        );
    }
}

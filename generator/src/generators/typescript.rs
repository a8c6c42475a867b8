use std::fmt::Write;

use dt_widl::{Argument, CompilationUnit, IdlError, IdlType, Interface};

use super::common::{check_union_distinguishable, collect_union_types};

/// The TypeScript spelling of a resolved IDL type. Unions and nullables
/// are structural in TypeScript, so they need no named declaration.
fn ts_type(ty: &IdlType) -> String {
    match ty {
        IdlType::Nullable(inner) => format!("{} | null", ts_type(inner)),
        IdlType::Array(element) | IdlType::Sequence(element) => {
            let element = ts_type(element);
            if element.contains('|') {
                format!("({element})[]")
            } else {
                format!("{element}[]")
            }
        }
        IdlType::Union(union) => union
            .member_types()
            .iter()
            .map(ts_type)
            .collect::<Vec<_>>()
            .join(" | "),
        IdlType::Basic(name) => {
            if ty.is_numeric_type() {
                "number".to_string()
            } else if ty.is_string_type() {
                "string".to_string()
            } else {
                // boolean, any, object, void and Date spell the same in
                // TypeScript; all other names refer to generated
                // declarations.
                name.clone()
            }
        }
    }
}

fn write_signature(output: &mut String, name: &str, arguments: &[Argument], return_type: &IdlType) {
    let arguments = arguments
        .iter()
        .map(|argument| {
            let marker = if argument.optional { "?" } else { "" };
            format!("{}{}: {}", argument.name, marker, ts_type(&argument.ty))
        })
        .collect::<Vec<_>>()
        .join(", ");
    let _ = write!(output, "{name}({arguments}): {}", ts_type(return_type));
}

fn write_interface(output: &mut String, interface: &Interface) {
    let extends = interface
        .parent
        .as_ref()
        .map_or_else(String::new, |parent| format!(" extends {parent}"));
    let _ = writeln!(output, "export interface {}{} {{", interface.name, extends);
    for attribute in &interface.attributes {
        let readonly = if attribute.readonly { "readonly " } else { "" };
        let _ = writeln!(
            output,
            "    {}{}: {};",
            readonly,
            attribute.name,
            ts_type(&attribute.ty)
        );
    }
    for operation in &interface.operations {
        let _ = write!(output, "    ");
        write_signature(
            output,
            &operation.name,
            &operation.arguments,
            &operation.return_type,
        );
        let _ = writeln!(output, ";");
    }
    let _ = writeln!(output, "}}");
}

pub(super) fn generate(unit: &CompilationUnit) -> Result<String, IdlError> {
    // Distinguishability is a model invariant, checked regardless of
    // whether the target language could express the overlap.
    for union in collect_union_types(unit) {
        check_union_distinguishable(union, unit.registry())?;
    }

    let mut output = String::new();
    let _ = writeln!(
        output,
        "// Generated by {} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    for typedef in unit.typedefs() {
        let _ = writeln!(
            output,
            "export type {} = {};",
            typedef.name,
            ts_type(&typedef.ty)
        );
    }
    for enumeration in unit.enumerations() {
        let values = enumeration
            .values
            .iter()
            .map(|value| format!("{value:?}"))
            .collect::<Vec<_>>()
            .join(" | ");
        let _ = writeln!(output, "export type {} = {};", enumeration.name, values);
    }
    for callback in unit.callback_functions() {
        let arguments = callback
            .arguments
            .iter()
            .map(|argument| {
                let marker = if argument.optional { "?" } else { "" };
                format!("{}{}: {}", argument.name, marker, ts_type(&argument.ty))
            })
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            output,
            "export type {} = ({}) => {};",
            callback.name,
            arguments,
            ts_type(&callback.return_type)
        );
    }
    for dictionary in unit.dictionaries() {
        let extends = dictionary
            .parent
            .as_ref()
            .map_or_else(String::new, |parent| format!(" extends {parent}"));
        let _ = writeln!(output, "export interface {}{} {{", dictionary.name, extends);
        for member in &dictionary.members {
            let marker = if member.required { "" } else { "?" };
            let _ = writeln!(
                output,
                "    {}{}: {};",
                member.name,
                marker,
                ts_type(&member.ty)
            );
        }
        let _ = writeln!(output, "}}");
    }
    for interface in unit.interfaces() {
        write_interface(&mut output, interface);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_widl::compile_fragments;

    fn generate_from(idl: &str) -> String {
        let unit = compile_fragments([idl]).unwrap();
        generate(&unit).unwrap()
    }

    #[test]
    fn dictionary_members_mark_optionality() {
        let output = generate_from(
            "dictionary Options {
                 required long count;
                 DOMString label;
             };",
        );
        assert!(output.contains("export interface Options {"));
        assert!(output.contains("    count: number;"));
        assert!(output.contains("    label?: string;"));
    }

    #[test]
    fn enumerations_become_literal_unions() {
        let output = generate_from("enum Mode { \"open\", \"closed\" };");
        assert!(output.contains("export type Mode = \"open\" | \"closed\";"));
    }

    #[test]
    fn unions_and_nullables_are_structural() {
        let output = generate_from(
            "interface I {
                 attribute (DOMString or long)? value;
                 attribute sequence<long?> items;
             };",
        );
        assert!(output.contains("value: string | number | null;"));
        assert!(output.contains("items: (number | null)[];"));
    }

    #[test]
    fn interfaces_extend_their_parent() {
        let output = generate_from(
            "interface A {};
             interface B : A {
                 readonly attribute DOMString name;
                 void run(optional boolean fast);
             };",
        );
        assert!(output.contains("export interface B extends A {"));
        assert!(output.contains("    readonly name: string;"));
        assert!(output.contains("    run(fast?: boolean): void;"));
    }

    #[test]
    fn ambiguous_unions_abort_generation_here_too() {
        let unit = compile_fragments([
            "interface I { void f((long or double) value); };",
        ])
        .unwrap();
        assert!(matches!(
            generate(&unit),
            Err(IdlError::AmbiguousUnionMember { .. })
        ));
    }
}

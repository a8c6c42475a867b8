use syn::{parse_quote, Ident, Item, LitStr, __private::Span};

use dt_widl::{
    CallbackFunction, CompilationUnit, Dictionary, Enumeration, IdlError, IdlType, Interface,
    Typedef, TypeRegistry, UnionType,
};

use super::common::{check_union_distinguishable, collect_union_types};

use check_keyword::CheckKeyword;
use heck::{ToPascalCase, ToSnakeCase};

struct RustEmitter<'a> {
    unit: &'a CompilationUnit,
    output_items: Vec<Item>,
}

fn name_to_ident(name: &str) -> Ident {
    if ["crate", "self", "super", "Self"].contains(&name) {
        // These are keywords that are not allowed as raw identifiers
        Ident::new(&format!("{}_", name), Span::call_site())
    } else if name.is_keyword() {
        Ident::new_raw(name, Span::call_site())
    } else {
        Ident::new(name, Span::call_site())
    }
}

fn enum_variant_ident(value: &str) -> Ident {
    let name = value.to_pascal_case();
    if name.is_empty() {
        // Web IDL permits "" as an enumeration value.
        Ident::new("Empty", Span::call_site())
    } else {
        name_to_ident(&name)
    }
}

/// Maps a resolved IDL type to the Rust type generated bindings use for it.
/// Interface-typed positions become trait objects; `any`, `object` and
/// `Date` come from the helper crate.
fn rust_type(ty: &IdlType, registry: &TypeRegistry) -> syn::Type {
    match ty {
        IdlType::Nullable(inner) => {
            let inner = rust_type(inner, registry);
            parse_quote!(Option<#inner>)
        }
        IdlType::Array(element) | IdlType::Sequence(element) => {
            let element = rust_type(element, registry);
            parse_quote!(Vec<#element>)
        }
        IdlType::Union(union) => {
            let name = name_to_ident(&union.name());
            parse_quote!(#name)
        }
        IdlType::Basic(name) => basic_rust_type(name, registry),
    }
}

fn basic_rust_type(name: &str, registry: &TypeRegistry) -> syn::Type {
    match name {
        "boolean" => parse_quote!(bool),
        "byte" => parse_quote!(i8),
        "octet" => parse_quote!(u8),
        "short" => parse_quote!(i16),
        "unsigned short" => parse_quote!(u16),
        "long" => parse_quote!(i32),
        "unsigned long" => parse_quote!(u32),
        "long long" => parse_quote!(i64),
        "unsigned long long" => parse_quote!(u64),
        "float" | "unrestricted float" => parse_quote!(f32),
        "double" | "unrestricted double" => parse_quote!(f64),
        "DOMString" | "ByteString" | "USVString" => parse_quote!(String),
        "void" => parse_quote!(()),
        "any" => parse_quote!(builtins::Any),
        "object" => parse_quote!(builtins::Object),
        "Date" => parse_quote!(builtins::Date),
        _ => {
            let ident = name_to_ident(&name.to_pascal_case());
            if registry.is_dictionary(name)
                || registry.is_enum(name)
                || registry.is_callback_function(name)
            {
                parse_quote!(#ident)
            } else {
                // Interface types (including callback interfaces) are
                // generated as traits, so positions typed with them take a
                // trait object.
                parse_quote!(Box<dyn #ident>)
            }
        }
    }
}

impl<'a> RustEmitter<'a> {
    fn new(unit: &'a CompilationUnit) -> Self {
        Self {
            unit,
            output_items: Vec::new(),
        }
    }

    fn registry(&self) -> &TypeRegistry {
        self.unit.registry()
    }

    fn emit_typedef(&mut self, typedef: &Typedef) {
        let name = name_to_ident(&typedef.name.to_pascal_case());
        let ty = rust_type(&typedef.ty, self.registry());
        self.output_items.push(parse_quote! {
            pub type #name = #ty;
        });
    }

    fn emit_enumeration(&mut self, enumeration: &Enumeration) {
        let name = name_to_ident(&enumeration.name.to_pascal_case());
        let variants: Vec<Ident> = enumeration
            .values
            .iter()
            .map(|value| enum_variant_ident(value))
            .collect();
        let values: Vec<LitStr> = enumeration
            .values
            .iter()
            .map(|value| LitStr::new(value, Span::call_site()))
            .collect();

        self.output_items.push(parse_quote! {
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub enum #name {
                #(#variants),*
            }
        });
        self.output_items.push(parse_quote! {
            impl #name {
                pub fn as_str(&self) -> &'static str {
                    match *self {
                        #(Self::#variants => #values),*
                    }
                }

                pub fn from_literal(value: &str) -> Result<Self, meta::Error> {
                    match value {
                        #(#values => Ok(Self::#variants),)*
                        _ => Err(meta::Error::ValueNotInEnumeration(value.to_string())),
                    }
                }
            }
        });
    }

    fn emit_union(&mut self, union: &UnionType) -> Result<(), IdlError> {
        check_union_distinguishable(union, self.registry())?;

        let name = name_to_ident(&union.name());
        let mut variant_idents = Vec::new();
        let mut variant_types = Vec::new();
        for member in union.member_types() {
            variant_idents.push(name_to_ident(&member.type_name().to_pascal_case()));
            variant_types.push(rust_type(member, self.registry()));
        }

        self.output_items.push(parse_quote! {
            #[derive(Debug)]
            pub enum #name {
                #(#variant_idents(#variant_types)),*
            }
        });
        Ok(())
    }

    fn emit_dictionary(&mut self, dictionary: &Dictionary) {
        let name = name_to_ident(&dictionary.name.to_pascal_case());
        let mut field_names = Vec::new();
        let mut field_types: Vec<syn::Type> = Vec::new();

        // An inherited dictionary carries its parent's members by
        // composition.
        if let Some(parent) = &dictionary.parent {
            field_names.push(name_to_ident(&parent.to_snake_case()));
            let parent_ty = name_to_ident(&parent.to_pascal_case());
            field_types.push(parse_quote!(#parent_ty));
        }
        for member in &dictionary.members {
            field_names.push(name_to_ident(&member.name.to_snake_case()));
            let ty = rust_type(&member.ty, self.registry());
            field_types.push(if member.required {
                ty
            } else {
                parse_quote!(Option<#ty>)
            });
        }

        self.output_items.push(parse_quote! {
            #[derive(Debug)]
            pub struct #name {
                #(pub #field_names: #field_types),*
            }
        });
    }

    fn emit_interface(&mut self, interface: &Interface) {
        let name = name_to_ident(&interface.name.to_pascal_case());
        let supertrait: syn::Path = match &interface.parent {
            Some(parent) => {
                let parent = name_to_ident(&parent.to_pascal_case());
                parse_quote!(#parent)
            }
            // Generated containers derive Debug, so trait objects must be
            // Debug as well.
            None => parse_quote!(::std::fmt::Debug),
        };

        let mut methods: Vec<syn::TraitItem> = Vec::new();
        for attribute in &interface.attributes {
            let getter = name_to_ident(&attribute.name.to_snake_case());
            let ty = rust_type(&attribute.ty, self.registry());
            methods.push(parse_quote! {
                fn #getter(&self) -> #ty;
            });
            if !attribute.readonly {
                let setter = name_to_ident(&format!("set_{}", attribute.name.to_snake_case()));
                methods.push(parse_quote! {
                    fn #setter(&mut self, value: #ty);
                });
            }
        }
        for operation in &interface.operations {
            let method = name_to_ident(&operation.name.to_snake_case());
            let arguments: Vec<syn::FnArg> = operation
                .arguments
                .iter()
                .map(|argument| {
                    let name = name_to_ident(&argument.name.to_snake_case());
                    let ty = rust_type(&argument.ty, self.registry());
                    let ty: syn::Type = if argument.optional {
                        parse_quote!(Option<#ty>)
                    } else {
                        ty
                    };
                    parse_quote!(#name: #ty)
                })
                .collect();
            let item: syn::TraitItem = if operation.return_type.base_type() == Some("void") {
                parse_quote! {
                    fn #method(&mut self #(, #arguments)*);
                }
            } else {
                let return_type = rust_type(&operation.return_type, self.registry());
                parse_quote! {
                    fn #method(&mut self #(, #arguments)*) -> #return_type;
                }
            };
            methods.push(item);
        }

        self.output_items.push(parse_quote! {
            pub trait #name: #supertrait {
                #(#methods)*
            }
        });
    }

    fn emit_callback(&mut self, callback: &CallbackFunction) {
        let name = name_to_ident(&callback.name.to_pascal_case());
        let argument_types: Vec<syn::Type> = callback
            .arguments
            .iter()
            .map(|argument| {
                let ty = rust_type(&argument.ty, self.registry());
                if argument.optional {
                    parse_quote!(Option<#ty>)
                } else {
                    ty
                }
            })
            .collect();

        let item: Item = if callback.return_type.base_type() == Some("void") {
            parse_quote! {
                pub type #name = Box<dyn FnMut(#(#argument_types),*)>;
            }
        } else {
            let return_type = rust_type(&callback.return_type, self.registry());
            parse_quote! {
                pub type #name = Box<dyn FnMut(#(#argument_types),*) -> #return_type>;
            }
        };
        self.output_items.push(item);
    }
}

pub(super) fn generate(unit: &CompilationUnit) -> Result<String, IdlError> {
    let mut emitter = RustEmitter::new(unit);

    emitter.output_items.push(Item::Use(parse_quote!(
        use dt_widl_builtins as builtins;
    )));
    emitter.output_items.push(Item::Use(parse_quote!(
        use builtins::meta;
    )));

    for typedef in unit.typedefs() {
        emitter.emit_typedef(typedef);
    }
    for enumeration in unit.enumerations() {
        emitter.emit_enumeration(enumeration);
    }
    for union in collect_union_types(unit) {
        emitter.emit_union(union)?;
    }
    for dictionary in unit.dictionaries() {
        emitter.emit_dictionary(dictionary);
    }
    for interface in unit.interfaces() {
        emitter.emit_interface(interface);
    }
    for callback in unit.callback_functions() {
        emitter.emit_callback(callback);
    }

    let doc_comment = concat!(
        "Generated by ",
        env!("CARGO_PKG_NAME"),
        " ",
        env!("CARGO_PKG_VERSION")
    );
    let root = syn::File {
        shebang: None,
        attrs: vec![
            parse_quote!(#![doc = #doc_comment]),
            parse_quote!(#![allow(dead_code, unused_imports)]),
        ],
        items: emitter.output_items,
    };
    Ok(prettyplease::unparse(&root))
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
    fn dictionary_lowers_to_struct() {
        let output = generate_from(
            "dictionary Options {
                 required long count;
                 DOMString label;
             };",
        );
        assert!(output.contains("pub struct Options"));
        assert!(output.contains("pub count: i32"));
        assert!(output.contains("pub label: Option<String>"));
    }

    #[test]
    fn dictionary_parent_becomes_a_field() {
        let output = generate_from(
            "dictionary Base { long a; };
             dictionary Derived : Base { long b; };",
        );
        assert!(output.contains("pub base: Base"));
    }

    #[test]
    fn enumeration_lowers_with_literal_mapping() {
        let output = generate_from("enum Mode { \"open\", \"closed\" };");
        assert!(output.contains("pub enum Mode"));
        assert!(output.contains("Self::Open => \"open\""));
        assert!(output.contains("\"closed\" => Ok(Self::Closed)"));
        assert!(output.contains("meta::Error::ValueNotInEnumeration"));
    }

    #[test]
    fn distinguishable_union_lowers_to_enum() {
        let output = generate_from(
            "interface I {
                 void f((DOMString or long) value);
             };",
        );
        assert!(output.contains("pub enum StringOrLong"));
        assert!(output.contains("String(String)"));
        assert!(output.contains("Long(i32)"));
    }

    #[test]
    fn ambiguous_union_aborts_generation() {
        let unit = compile_fragments([
            "interface I {
                 void f((DOMString or ByteString) value);
             };",
        ])
        .unwrap();
        assert!(matches!(
            generate(&unit),
            Err(IdlError::AmbiguousUnionMember { .. })
        ));
    }

    #[test]
    fn interface_lowers_to_trait_with_supertrait() {
        let output = generate_from(
            "interface EventTarget {};
             interface Widget : EventTarget {
                 readonly attribute DOMString name;
                 attribute double width;
                 void resize(double width, optional boolean animate);
             };",
        );
        assert!(output.contains("pub trait EventTarget: ::std::fmt::Debug"));
        assert!(output.contains("pub trait Widget: EventTarget"));
        assert!(output.contains("fn name(&self) -> String;"));
        assert!(output.contains("fn set_width(&mut self, value: f64);"));
        assert!(output.contains("fn resize(&mut self, width: f64, animate: Option<bool>);"));
    }

    #[test]
    fn callback_lowers_to_boxed_closure() {
        let output = generate_from("callback Comparator = short (long a, long b);");
        assert!(output.contains("pub type Comparator = Box<dyn FnMut(i32, i32) -> i16>;"));
    }

    #[test]
    fn typedefs_lower_to_aliases() {
        let output = generate_from("typedef sequence<double> Points;");
        assert!(output.contains("pub type Points = Vec<f64>;"));
    }

    #[test]
    fn resolved_typedefs_flow_into_signatures() {
        let output = generate_from(
            "typedef double Distance;
             interface Shape {
                 attribute sequence<Distance> outline;
             };",
        );
        assert!(output.contains("fn outline(&self) -> Vec<f64>;"));
    }
}

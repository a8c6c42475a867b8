//! Model and type resolution for Web IDL fragments.
//!
//! A fragment is read into a declaration model, merged with its sibling
//! fragments into a [`CompilationUnit`], and every type expression in it is
//! classified and resolved against per-unit tables. Generators then walk
//! the resolved unit to emit binding code.

pub mod builtins;
pub mod decl;
pub mod error;
pub mod idl_type;
pub mod inheritance;
pub mod registry;
pub mod typedef;
pub mod unit;

mod parser;
mod syntax;

pub use decl::{
    Argument, Attribute, CallbackFunction, DefaultValue, Dictionary, DictionaryMember,
    Enumeration, Fragment, Interface, Operation, Typedef,
};
pub use error::IdlError;
pub use idl_type::{IdlType, ReferencedTypes, UnionType};
pub use inheritance::InheritanceTable;
pub use registry::TypeRegistry;
pub use typedef::TypedefTable;
pub use unit::CompilationUnit;

/// Parses each source as a [`Fragment`] and builds the merged, resolved
/// [`CompilationUnit`] for them.
pub fn compile_fragments<'a>(
    sources: impl IntoIterator<Item = &'a str>,
) -> Result<CompilationUnit, IdlError> {
    let fragments = sources
        .into_iter()
        .map(Fragment::parse)
        .collect::<Result<Vec<_>, _>>()?;
    CompilationUnit::build(fragments)
}

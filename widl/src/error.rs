use thiserror::Error;

/// Errors produced while reading or resolving a compilation unit.
///
/// There is no partial-success mode: any of these aborts generation for the
/// whole unit.
#[derive(Debug, Error)]
pub enum IdlError {
    #[error("union type needs at least two member types")]
    TooFewUnionMembers,

    #[error("union type {union} contains a nested union member")]
    NestedUnion { union: String },

    #[error("union type {union} has more than one nullable member")]
    MultipleNullableMembers { union: String },

    #[error("union type {union} mixes a dictionary member with a nullable member")]
    DictionaryWithNullableMember { union: String },

    #[error(
        "ambiguous member classification in union type {union}: \
         {first} and {second} are both {category}"
    )]
    AmbiguousUnionMember {
        union: String,
        category: &'static str,
        first: String,
        second: String,
    },

    #[error("unexpected end of input while reading {context}")]
    UnexpectedEnd { context: &'static str },

    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: &'static str, found: String },

    #[error("duplicate definition of {name}")]
    DuplicateDefinition { name: String },

    #[error("{name} inherits from unknown interface {parent}")]
    UnknownInterface { name: String, parent: String },

    #[error("dictionary {name} inherits from unknown dictionary {parent}")]
    UnknownDictionary { name: String, parent: String },

    #[error("inheritance cycle through interface {name}")]
    InheritanceCycle { name: String },

    #[error("typedef cycle through {name}")]
    TypedefCycle { name: String },
}

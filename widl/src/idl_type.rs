use std::fmt;
use std::hash::{Hash, Hasher};

use crate::builtins::{
    BASIC_TYPES, INTEGER_TYPES, NUMERIC_TYPES, PRIMITIVE_TYPES, STRING_TYPES, TYPE_NAMES,
};
use crate::error::IdlError;
use crate::registry::TypeRegistry;
use crate::typedef::TypedefTable;

/// A Web IDL type expression (§3.10), represented as a tree.
///
/// Every operation defined on this type is total over the five variants:
/// asking a question that does not apply to a variant yields `false` or
/// `None` rather than an error, so callers can probe any property on any
/// node without checking its shape first.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IdlType {
    /// A bare type name: a primitive, string or object type from the fixed
    /// tables in [`builtins`](crate::builtins), or the name of an
    /// interface, dictionary, enumeration or callback known to the
    /// [`TypeRegistry`].
    Basic(String),
    Union(UnionType),
    Array(Box<IdlType>),
    Sequence(Box<IdlType>),
    /// Transparent decoration marking the inner type as permitting `null`.
    /// Classification queries forward to the inner type; only
    /// `is_nullable`, `type_name` and stringification see the wrapper.
    Nullable(Box<IdlType>),
}

impl IdlType {
    pub fn basic(name: impl Into<String>) -> Self {
        Self::Basic(name.into())
    }

    pub fn array(element_type: IdlType) -> Self {
        Self::Array(Box::new(element_type))
    }

    pub fn sequence(element_type: IdlType) -> Self {
        Self::Sequence(Box::new(element_type))
    }

    pub fn nullable(inner_type: IdlType) -> Self {
        Self::Nullable(Box::new(inner_type))
    }

    /// Shorthand for [`UnionType::new`].
    pub fn union(
        member_types: Vec<IdlType>,
        registry: &TypeRegistry,
    ) -> Result<Self, IdlError> {
        UnionType::new(member_types, registry).map(Self::Union)
    }

    /// The bare name this node classifies under, looking through nullable
    /// wrappers. `None` for unions, arrays and sequences.
    pub fn base_type(&self) -> Option<&str> {
        match self {
            Self::Basic(name) => Some(name),
            Self::Nullable(inner) => inner.base_type(),
            Self::Union(_) | Self::Array(_) | Self::Sequence(_) => None,
        }
    }

    pub fn is_basic_type(&self) -> bool {
        self.base_type().is_some_and(|name| BASIC_TYPES.contains(name))
    }

    pub fn is_integer_type(&self) -> bool {
        self.base_type().is_some_and(|name| INTEGER_TYPES.contains(name))
    }

    pub fn is_numeric_type(&self) -> bool {
        self.base_type().is_some_and(|name| NUMERIC_TYPES.contains(name))
    }

    pub fn is_primitive_type(&self) -> bool {
        self.base_type().is_some_and(|name| PRIMITIVE_TYPES.contains(name))
    }

    pub fn is_string_type(&self) -> bool {
        self.base_type().is_some_and(|name| STRING_TYPES.contains(name))
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    pub fn is_union_type(&self) -> bool {
        match self {
            Self::Union(_) => true,
            Self::Nullable(inner) => inner.is_union_type(),
            _ => false,
        }
    }

    pub fn is_array_or_sequence_type(&self) -> bool {
        match self {
            Self::Array(_) | Self::Sequence(_) => true,
            Self::Nullable(inner) => inner.is_array_or_sequence_type(),
            _ => false,
        }
    }

    /// The element type for arrays and sequences, `None` otherwise.
    pub fn element_type(&self) -> Option<&IdlType> {
        match self {
            Self::Array(element) | Self::Sequence(element) => Some(element),
            Self::Nullable(inner) => inner.element_type(),
            _ => None,
        }
    }

    /// The wrapped type for nullables, `None` otherwise.
    pub fn inner_type(&self) -> Option<&IdlType> {
        match self {
            Self::Nullable(inner) => Some(inner),
            _ => None,
        }
    }

    /// The union value for unions (also through a nullable wrapper),
    /// `None` otherwise.
    pub fn as_union(&self) -> Option<&UnionType> {
        match self {
            Self::Union(union) => Some(union),
            Self::Nullable(inner) => inner.as_union(),
            _ => None,
        }
    }

    pub fn is_enum(&self, registry: &TypeRegistry) -> bool {
        self.base_type().is_some_and(|name| registry.is_enum(name))
    }

    /// The permitted string values if this type names an enumeration,
    /// `None` otherwise.
    pub fn enum_values<'r>(&self, registry: &'r TypeRegistry) -> Option<&'r [String]> {
        self.base_type().and_then(|name| registry.enum_values(name))
    }

    pub fn is_dictionary(&self, registry: &TypeRegistry) -> bool {
        self.base_type()
            .is_some_and(|name| registry.is_dictionary(name))
    }

    pub fn is_callback_function(&self, registry: &TypeRegistry) -> bool {
        self.base_type()
            .is_some_and(|name| registry.is_callback_function(name))
    }

    pub fn is_callback_interface(&self, registry: &TypeRegistry) -> bool {
        self.base_type()
            .is_some_and(|name| registry.is_callback_interface(name))
    }

    /// Anything that is none of the other categories names an interface
    /// (Web IDL §3.2). Unknown bare names therefore classify as interface
    /// types; see DESIGN.md on why this fallback is silent.
    pub fn is_interface_type(&self, registry: &TypeRegistry) -> bool {
        let Some(name) = self.base_type() else {
            return false;
        };
        !(self.is_basic_type()
            || self.is_callback_function(registry)
            || self.is_dictionary(registry)
            || self.is_enum(registry)
            || name == "any"
            || name == "object"
            || name == "Promise")
    }

    /// Produces a code-generation-safe identifier, distinct per distinct
    /// structure: built-in names are respelled via
    /// [`TYPE_NAMES`](crate::builtins::TYPE_NAMES), composites append a
    /// fixed suffix per kind, unions `Or`-join their member names.
    pub fn type_name(&self) -> String {
        match self {
            Self::Basic(name) => TYPE_NAMES
                .get(name.as_str())
                .map_or_else(|| name.clone(), |spelling| (*spelling).to_string()),
            Self::Union(union) => union.name(),
            Self::Array(element) => element.type_name() + "Array",
            Self::Sequence(element) => element.type_name() + "Sequence",
            Self::Nullable(inner) => inner.type_name() + "OrNull",
        }
    }

    /// Returns a new tree with every leaf whose name is mapped by
    /// `typedefs` replaced by the mapped node. The replacement is inserted
    /// as-is and not itself re-resolved, so the mapping's values must
    /// already be maximally resolved (the unit driver guarantees this).
    pub fn resolve_typedefs(&self, typedefs: &TypedefTable) -> IdlType {
        match self {
            Self::Basic(name) => typedefs
                .get(name)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            Self::Union(union) => Self::Union(UnionType::rebuilt(
                union
                    .member_types()
                    .iter()
                    .map(|member| member.resolve_typedefs(typedefs))
                    .collect(),
            )),
            Self::Array(element) => Self::array(element.resolve_typedefs(typedefs)),
            Self::Sequence(element) => Self::sequence(element.resolve_typedefs(typedefs)),
            Self::Nullable(inner) => Self::nullable(inner.resolve_typedefs(typedefs)),
        }
    }

    /// Pre-order traversal of the type expression: the node itself first,
    /// then containers before the nodes they wrap. Finite and restartable;
    /// callers use this to collect the dependencies of an entire
    /// expression.
    pub fn referenced_types(&self) -> ReferencedTypes<'_> {
        ReferencedTypes { stack: vec![self] }
    }
}

impl fmt::Display for IdlType {
    /// Canonical IDL syntax for the node. The nullable marker is not
    /// rendered; the distinction survives in [`IdlType::type_name`] only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(name) => f.write_str(name),
            Self::Union(union) => union.fmt(f),
            Self::Array(element) => write!(f, "{element}[]"),
            Self::Sequence(element) => write!(f, "sequence<{element}>"),
            Self::Nullable(inner) => inner.fmt(f),
        }
    }
}

/// An ordered list of two or more member types, any combination except
/// nested unions (§3.10.26).
///
/// Equality and hashing follow the computed composite [`name`](Self::name)
/// rather than the member list, so unions can serve as mapping keys and set
/// members keyed by the identifier they generate.
#[derive(Clone, Debug)]
pub struct UnionType {
    member_types: Vec<IdlType>,
}

impl UnionType {
    /// Constructs a validated union. Structural invariants (member count,
    /// no nested unions, at most one nullable member) and the
    /// registry-dependent invariant (no dictionary member alongside a
    /// nullable member) are both checked here.
    pub fn new(
        member_types: Vec<IdlType>,
        registry: &TypeRegistry,
    ) -> Result<Self, IdlError> {
        let union = Self::parsed(member_types)?;
        union.validate(registry)?;
        Ok(union)
    }

    /// Structural checks only; used by the fragment reader, which runs
    /// before the registry is populated. The unit driver calls
    /// [`validate`](Self::validate) once it is.
    pub(crate) fn parsed(member_types: Vec<IdlType>) -> Result<Self, IdlError> {
        if member_types.len() < 2 {
            return Err(IdlError::TooFewUnionMembers);
        }
        let union = Self { member_types };
        if union.member_types.iter().any(IdlType::is_union_type) {
            return Err(IdlError::NestedUnion { union: union.name() });
        }
        if union.nullable_member_count() > 1 {
            return Err(IdlError::MultipleNullableMembers { union: union.name() });
        }
        Ok(union)
    }

    /// No checks at all; only for rebuilding during typedef resolution,
    /// where the members come from an already-validated union.
    pub(crate) fn rebuilt(member_types: Vec<IdlType>) -> Self {
        Self { member_types }
    }

    /// Re-checks the member invariants against a populated registry: at
    /// most one nullable member, and no dictionary member alongside a
    /// nullable member. Typedef substitution can introduce nullable
    /// members, so the unit driver runs this again on resolved unions.
    pub fn validate(&self, registry: &TypeRegistry) -> Result<(), IdlError> {
        if self.nullable_member_count() > 1 {
            return Err(IdlError::MultipleNullableMembers { union: self.name() });
        }
        let has_dictionary = self
            .member_types
            .iter()
            .any(|member| member.is_dictionary(registry));
        if has_dictionary && self.nullable_member_count() > 0 {
            return Err(IdlError::DictionaryWithNullableMember { union: self.name() });
        }
        Ok(())
    }

    pub fn member_types(&self) -> &[IdlType] {
        &self.member_types
    }

    /// The composite name, `Or`-joined in declaration order: `(A or B)`
    /// yields `AOrB` and `(B or A)` yields `BOrA`; see DESIGN.md.
    pub fn name(&self) -> String {
        self.member_types
            .iter()
            .map(IdlType::type_name)
            .collect::<Vec<_>>()
            .join("Or")
    }

    fn nullable_member_count(&self) -> usize {
        self.member_types
            .iter()
            .filter(|member| member.is_nullable())
            .count()
    }
}

impl fmt::Display for UnionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (index, member) in self.member_types.iter().enumerate() {
            if index > 0 {
                write!(f, " or ")?;
            }
            member.fmt(f)?;
        }
        write!(f, ")")
    }
}

impl PartialEq for UnionType {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for UnionType {}

impl Hash for UnionType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

/// Iterator behind [`IdlType::referenced_types`].
pub struct ReferencedTypes<'a> {
    stack: Vec<&'a IdlType>,
}

impl<'a> Iterator for ReferencedTypes<'a> {
    type Item = &'a IdlType;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        match next {
            IdlType::Basic(_) => {}
            IdlType::Union(union) => {
                // Reversed so the first member is yielded first.
                self.stack.extend(union.member_types().iter().rev());
            }
            IdlType::Array(element) | IdlType::Sequence(element) => self.stack.push(element),
            IdlType::Nullable(inner) => self.stack.push(inner),
        }
        Some(next)
    }
}

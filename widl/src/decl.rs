use crate::idl_type::IdlType;

/// One parsed Web IDL source file. Declarations keep their source order;
/// nothing is classified or resolved yet at this stage.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub interfaces: Vec<Interface>,
    pub dictionaries: Vec<Dictionary>,
    pub enumerations: Vec<Enumeration>,
    pub callback_functions: Vec<CallbackFunction>,
    pub typedefs: Vec<Typedef>,
}

/// An `interface` or `callback interface` declaration.
#[derive(Debug, Clone)]
pub struct Interface {
    pub name: String,
    /// Direct parent from the inheritance clause; the transitive closure
    /// lives in the [`InheritanceTable`](crate::InheritanceTable).
    pub parent: Option<String>,
    pub is_callback: bool,
    pub attributes: Vec<Attribute>,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub ty: IdlType,
    pub readonly: bool,
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub name: String,
    pub return_type: IdlType,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone)]
pub struct Argument {
    pub name: String,
    pub ty: IdlType,
    pub optional: bool,
    pub default: Option<DefaultValue>,
}

#[derive(Debug, Clone)]
pub struct Dictionary {
    pub name: String,
    pub parent: Option<String>,
    pub members: Vec<DictionaryMember>,
}

#[derive(Debug, Clone)]
pub struct DictionaryMember {
    pub name: String,
    pub ty: IdlType,
    pub required: bool,
    pub default: Option<DefaultValue>,
}

/// A default value for a dictionary member or an optional argument.
#[derive(Debug, Clone)]
pub enum DefaultValue {
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Null,
    EmptySequence,
}

#[derive(Debug, Clone)]
pub struct Enumeration {
    pub name: String,
    /// The permitted string values, in declaration order.
    pub values: Vec<String>,
}

/// A `callback` function declaration, e.g.
/// `callback Comparator = short (long a, long b);`
#[derive(Debug, Clone)]
pub struct CallbackFunction {
    pub name: String,
    pub return_type: IdlType,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone)]
pub struct Typedef {
    pub name: String,
    pub ty: IdlType,
}

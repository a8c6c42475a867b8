use std::fmt;

/// Error type used by generated conversion helpers.
#[derive(Debug)]
pub enum Error {
    ValueNotInEnumeration(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::ValueNotInEnumeration(ref value) => {
                write!(f, "Value {value:?} is not in enumeration")
            }
        }
    }
}

impl std::error::Error for Error {}

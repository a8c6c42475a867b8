mod common;

#[cfg(feature = "generator-rust")]
mod rust;
#[cfg(feature = "generator-typescript")]
mod typescript;

#[cfg(not(any(feature = "generator-rust", feature = "generator-typescript")))]
compile_error!("At least one generator must be enabled");

use clap::ValueEnum;
use dt_widl::{CompilationUnit, IdlError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Generator {
    #[cfg(feature = "generator-rust")]
    Rust,
    #[cfg(feature = "generator-typescript")]
    Typescript,
}

impl Generator {
    pub fn generate(&self, unit: &CompilationUnit) -> Result<String, IdlError> {
        match *self {
            #[cfg(feature = "generator-rust")]
            Self::Rust => rust::generate(unit),
            #[cfg(feature = "generator-typescript")]
            Self::Typescript => typescript::generate(unit),
        }
    }
}

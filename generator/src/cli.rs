use std::path::PathBuf;

use clap::Parser;

use crate::generators::Generator;

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
    #[clap(required = true, help = "The Web IDL source files of one compilation unit")]
    pub inputs: Vec<PathBuf>,

    #[clap(long, value_enum, default_value = "rust", help = "Which generator to run")]
    pub emit: Generator,
}

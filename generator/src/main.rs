mod cli;
mod generators;

use clap::Parser;

use dt_widl as widl;

fn main() {
    let cli = cli::Cli::parse();

    let sources: Vec<String> = cli
        .inputs
        .iter()
        .map(|path| std::fs::read_to_string(path).unwrap())
        .collect();

    let unit = match widl::compile_fragments(sources.iter().map(String::as_str)) {
        Ok(unit) => unit,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    };

    match cli.emit.generate(&unit) {
        Ok(output) => print!("{output}"),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    }
}

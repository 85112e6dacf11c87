use anyhow::{Context, Result};
use clap::{App, Arg};
use std::fs;
use std::path::{Path, PathBuf};

mod diagnostics;
mod generator;
mod parser;
mod transpiler;

#[cfg(test)]
mod tests;

use diagnostics::{Diagnostic, Diagnostics};

fn main() -> Result<()> {
    env_logger::init();

    let matches = App::new("sol2ink")
        .version("0.1.0")
        .about("Converts Solidity smart contracts to ink!")
        .arg(
            Arg::with_name("INPUT")
                .help("Input Solidity file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("DIR")
                .help("Output directory for the generated contract")
                .takes_value(true),
        )
        .get_matches();

    let input_file = matches.value_of("INPUT").unwrap();

    // Read input file
    let source = fs::read_to_string(input_file)
        .with_context(|| format!("Failed to read input file: {}", input_file))?;

    // Run the translation pipeline
    let (contract, report) = transpile(&source)
        .with_context(|| format!("Failed to translate {}", input_file))?;

    // Report every recorded anomaly, in source order
    for diagnostic in &report {
        println!("{}", diagnostic);
    }

    let output_file = output_path(input_file, matches.value_of("output"));
    fs::write(&output_file, contract)
        .with_context(|| format!("Failed to write output file: {}", output_file.display()))?;

    println!(
        "Successfully converted {} to {}",
        input_file,
        output_file.display()
    );

    Ok(())
}

/// Runs the whole pipeline on one source file's text: parse into IR,
/// assemble the ink! contract, return the output text plus the ordered
/// diagnostics report. The single failure mode is a source file with no
/// contract or interface definition, in which case no output exists.
pub fn transpile(source: &str) -> Result<(String, Vec<Diagnostic>), parser::ParseError> {
    let mut diagnostics = Diagnostics::new();
    let (unit, symbols) = parser::parse(source, &mut diagnostics)?;
    let contract = generator::assemble(&unit, &symbols, &mut diagnostics);
    Ok((contract, diagnostics.into_report()))
}

/// `<stem>.rs` next to the input, or inside the requested directory.
fn output_path(input_file: &str, output_dir: Option<&str>) -> PathBuf {
    let input = Path::new(input_file);
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("output"));
    match output_dir {
        Some(dir) => Path::new(dir).join(format!("{}.rs", stem)),
        None => input.with_file_name(format!("{}.rs", stem)),
    }
}

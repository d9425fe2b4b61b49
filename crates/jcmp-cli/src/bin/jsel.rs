//! `jsel`: print every element a path selects from a document.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use jcmp_cli::{exit_with, init_logging, load_document, write_output, InputSource};
use jcmp_core::{JsonPath, OptionsError, DEFAULT_MAX_DEPTH};

#[derive(Debug, Parser)]
#[command(name = "jsel", version, about = "Select elements of a JSON or YAML document by path.")]
struct Cli {
    /// Document to read; `-` reads STDIN.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Path expression to evaluate.
    #[arg(value_name = "SELECTOR")]
    selector: JsonPath,

    /// Read YAML instead of JSON.
    #[arg(long = "yaml")]
    yaml: bool,

    /// Recursion limit for extraction.
    #[arg(long = "max-depth", value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log debug events to STDERR.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() {
    exit_with(|| try_main(Cli::parse()));
}

fn try_main(cli: Cli) -> Result<i32> {
    init_logging(cli.verbose);
    if cli.max_depth == 0 {
        return Err(OptionsError::ZeroMaxDepth.into());
    }
    let source = if cli.file.as_os_str() == "-" {
        InputSource::Stdin
    } else {
        InputSource::File(cli.file.clone())
    };
    let document = load_document(&source, cli.yaml)?;

    let mut output = String::new();
    for element in cli.selector.extract_with_limit(&document, cli.max_depth)? {
        output.push_str(&element.to_string());
        output.push_str("\n\n");
    }
    write_output(None, &output)?;
    Ok(0)
}

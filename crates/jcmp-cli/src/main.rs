//! `jcmp`: compare two JSON or YAML documents under path selectors,
//! array mapping rules and ignore rules.
//!
//! Exits with 0 when no differences were found, 1 when differences were
//! reported and 2 on errors. Correlation warnings alone do not change the
//! exit status.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use jcmp_cli::{exit_with, init_logging, load_document, write_output, InputSource};
use jcmp_core::{DiffOptions, IgnoreRule, JsonPath, MappingRule, DEFAULT_MAX_DEPTH};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    /// `-path sep old` / `+path sep new` lines.
    #[default]
    Native,
    /// JSON array of report entries.
    Raw,
}

#[derive(Debug, Parser)]
#[command(name = "jcmp", version, about = "Compare JSON or YAML documents by path.")]
struct Cli {
    /// Old document.
    #[arg(value_name = "FILE1")]
    old: PathBuf,

    /// New document; read from STDIN when omitted.
    #[arg(value_name = "FILE2")]
    new: Option<PathBuf>,

    /// Path selecting the elements to compare (default: `$`). Repeatable.
    #[arg(short = 's', long = "selector", value_name = "PATH")]
    selectors: Vec<JsonPath>,

    /// Correlate array objects by a key field. Repeatable.
    #[arg(short = 'm', long = "mapping", value_name = "PATH=KEY")]
    mappings: Vec<MappingRule>,

    /// Ignore differences at a path, optionally only when `{>}` or `{<}` holds. Repeatable.
    #[arg(short = 'i', long = "ignore", value_name = "PATH[{OP}]")]
    ignores: Vec<IgnoreRule>,

    /// Read YAML instead of JSON.
    #[arg(long = "yaml")]
    yaml: bool,

    /// Report format.
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Native)]
    format: OutputFormat,

    /// Write the report to FILE instead of STDOUT.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Recursion limit for extraction and comparison.
    #[arg(long = "max-depth", value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log debug events to STDERR.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

impl Cli {
    fn diff_options(&self) -> Result<DiffOptions> {
        let mut options = DiffOptions::default().with_max_depth(self.max_depth)?;
        for selector in &self.selectors {
            options = options.with_selector(selector.clone());
        }
        for mapping in &self.mappings {
            options = options.with_mapping(mapping.clone());
        }
        for ignore in &self.ignores {
            options = options.with_ignore(ignore.clone());
        }
        Ok(options)
    }
}

fn main() {
    exit_with(|| try_main(Cli::parse()));
}

fn try_main(cli: Cli) -> Result<i32> {
    init_logging(cli.verbose);
    let options = cli.diff_options()?;

    let old = load_document(&InputSource::File(cli.old.clone()), cli.yaml)?;
    let new = load_document(&InputSource::from_arg(cli.new.clone()), cli.yaml)?;
    tracing::debug!(
        selectors = options.selectors().len(),
        mappings = options.mappings().count(),
        ignores = options.ignores().count(),
        "comparing documents"
    );

    let report = old.diff(&new, &options)?;
    let rendered = match cli.format {
        OutputFormat::Native => report.render(),
        OutputFormat::Raw => {
            let raw = report.render_raw().context("failed to serialize report")?;
            format!("{raw}\n")
        }
    };
    write_output(cli.output.as_deref(), &rendered)?;

    Ok(i32::from(report.has_differences()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("jcmp").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn rules_are_parsed_at_the_command_line() {
        let cli = parse(&["-s", "$..a", "-m", "$.items=id", "-i", "$.n{<}", "a.json", "b.json"]);
        assert_eq!(cli.selectors[0].to_string(), "$..a");
        assert_eq!(cli.mappings[0].key(), "id");
        assert_eq!(cli.ignores[0].to_string(), "$.n{<}");
        assert_eq!(cli.new, Some(PathBuf::from("b.json")));
        assert_eq!(cli.format, OutputFormat::Native);
    }

    #[test]
    fn invalid_rules_are_usage_errors() {
        let args = ["jcmp", "-i", "$.n{>=}", "a.json"];
        let err = Cli::try_parse_from(args).unwrap_err();
        assert!(err.to_string().contains("the evaluation operator >= is not implemented"));
        assert!(Cli::try_parse_from(["jcmp", "-s", "a.b", "a.json"]).is_err());
    }

    #[test]
    fn repeated_selectors_are_deduplicated() {
        let cli = parse(&["-s", "$.a", "-s", "$[\"a\"]", "a.json"]);
        let options = cli.diff_options().unwrap();
        assert_eq!(options.selectors().len(), 1);
        assert_eq!(cli.new, None);
    }

    #[test]
    fn zero_max_depth_is_rejected() {
        let cli = parse(&["--max-depth", "0", "a.json"]);
        assert!(cli.diff_options().is_err());
    }
}

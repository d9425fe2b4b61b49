//! Input loading and logging shared by the `jcmp` and `jsel` binaries.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jcmp_core::Node;
use tracing_subscriber::EnvFilter;

/// Exit status for usage, input and configuration errors.
pub const EXIT_ERROR: i32 = 2;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "JCMP_LOG";

/// Where a document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A file on disk.
    File(PathBuf),
    /// Standard input.
    Stdin,
}

impl InputSource {
    /// Uses the given path, or standard input when there is none.
    #[must_use]
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdin, Self::File)
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdin => f.write_str("<stdin>"),
        }
    }
}

/// Reads the whole source into a string.
pub fn read_input(source: &InputSource) -> Result<String> {
    match source {
        InputSource::File(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("failed to read <stdin>")?;
            Ok(buffer)
        }
    }
}

/// Parses document text as JSON, or as YAML when `yaml` is set.
pub fn parse_node(input: &str, yaml: bool) -> Result<Node> {
    let node = if yaml { Node::from_yaml_str(input)? } else { Node::from_json_str(input)? };
    Ok(node)
}

/// Reads and parses one document.
pub fn load_document(source: &InputSource, yaml: bool) -> Result<Node> {
    let text = read_input(source)?;
    parse_node(&text, yaml).with_context(|| format!("failed to parse {source}"))
}

/// Installs the stderr log subscriber.
///
/// `JCMP_LOG` takes precedence; otherwise logging is off, or at `debug`
/// when `verbose` is set.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "off" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Writes `text` to `path`, or to standard output when there is none.
pub fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, text.as_bytes())
            .with_context(|| format!("failed to write output to {}", path.display()))?;
    } else {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes()).context("failed to write to stdout")?;
        stdout.flush().ok();
    }
    Ok(())
}

/// Runs `body` and exits with its status, printing any error to stderr.
pub fn exit_with<F>(body: F) -> !
where
    F: FnOnce() -> Result<i32>,
{
    match body() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let _ = writeln!(io::stderr(), "{err:#}");
            std::process::exit(EXIT_ERROR);
        }
    }
}

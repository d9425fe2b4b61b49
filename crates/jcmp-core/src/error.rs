use thiserror::Error;

use crate::JsonPath;

/// Errors that can occur while canonicalizing external data into [`Node`](crate::Node).
#[derive(Debug, Error)]
pub enum CanonicalizeError {
    /// The provided JSON input was invalid.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The provided YAML input was invalid.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Encountered a number that cannot be represented as an IEEE-754 f64.
    #[error("number {value} cannot be represented as f64")]
    NumberOutOfRange {
        /// The textual representation of the offending number.
        value: String,
    },
    /// YAML maps may only contain string keys.
    #[error("unsupported YAML key type: {found}")]
    NonStringYamlKey {
        /// A description of the key that triggered the error.
        found: String,
    },
    /// YAML tags have no counterpart in the JSON data model.
    #[error("unsupported YAML tag: {tag}")]
    UnsupportedYamlTag {
        /// The tag identifier encountered in the document.
        tag: String,
    },
    /// Attempted to construct a [`Number`](crate::Number) that is not finite.
    #[error("non-finite number encountered: {value}")]
    NotFinite {
        /// The offending numeric value.
        value: f64,
    },
}

/// Errors raised while parsing a path expression.
#[derive(Debug, Error)]
pub enum PathError {
    /// The expression does not follow the path grammar.
    #[error("invalid path syntax: {path} (at offset {offset}: {reason})")]
    Syntax {
        /// The full expression as supplied.
        path: String,
        /// Byte offset of the first character that could not be parsed.
        offset: usize,
        /// Short description of what the parser expected.
        reason: &'static str,
    },
    /// A `[r"..."]` segment holds a pattern the regex engine rejects.
    #[error("invalid regular expression: {pattern}")]
    InvalidRegex {
        /// The pattern source, as written between the quotes.
        pattern: String,
        /// The underlying compilation failure.
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while parsing mapping and ignore rules.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A mapping rule is not of the form `<path>=<keyid>`.
    #[error("invalid mapping syntax: {rule}")]
    InvalidMapping {
        /// The rule text as supplied.
        rule: String,
    },
    /// The path part of a rule failed to parse.
    #[error(transparent)]
    Path(#[from] PathError),
    /// An ignore rule names a comparator other than `>` or `<`.
    #[error("the evaluation operator {op} is not implemented")]
    UnsupportedComparator {
        /// The operator text found between the braces.
        op: String,
    },
}

/// Errors emitted when constructing [`DiffOptions`](crate::DiffOptions).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    /// The recursion limit must allow at least the root level.
    #[error("max depth must be greater than zero")]
    ZeroMaxDepth,
}

/// Raised when extraction or comparison descends past the configured depth.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("max depth {limit} exceeded at {path}")]
pub struct DepthLimitError {
    /// The limit that was in force.
    pub limit: usize,
    /// The location where traversal stopped.
    pub path: JsonPath,
}

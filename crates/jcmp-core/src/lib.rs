//! Path queries and structural comparison for JSON-like documents.
//!
//! `jcmp-core` parses path expressions (`$.store..book[*]["title"]`),
//! evaluates them against a [`Node`] tree, decides whether one expression
//! covers another, and compares two documents under selectors, array
//! mapping rules and ignore rules.
//!
//! ```
//! use jcmp_core::{DiffOptions, JsonPath, Node};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let old = Node::from_json_str(r#"{"items":[{"id":1,"qty":2},{"id":2,"qty":5}]}"#)?;
//!     let new = Node::from_json_str(r#"{"items":[{"id":2,"qty":5},{"id":1,"qty":3}]}"#)?;
//!
//!     let path: JsonPath = "$..qty".parse()?;
//!     assert_eq!(path.extract(&old)?.len(), 2);
//!
//!     let options = DiffOptions::default().with_mapping("$.items=id".parse()?);
//!     let report = old.diff(&new, &options)?;
//!     assert_eq!(report.render(), "-$.items[0].qty = 2\n+$.items[0].qty = 3\n\n");
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod diff;
mod error;
mod node;
mod number;
mod options;
pub mod path;
mod rules;
mod select;

pub use diff::{Difference, DifferenceKind, Entry, Report, Warning};
pub use error::{CanonicalizeError, DepthLimitError, OptionsError, PathError, RuleError};
pub use node::{Node, NodeKind};
pub use number::Number;
pub use options::DiffOptions;
pub use path::{Connector, JsonPath, KeyPattern, Segment, Selector};
pub use rules::{Comparator, IgnoreRule, MappingRule};
pub use select::{Element, DEFAULT_MAX_DEPTH};

/// Returns the semantic version of the `jcmp-core` crate.
///
/// ```
/// assert!(!jcmp_core::version().is_empty());
/// ```
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

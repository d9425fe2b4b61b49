//! Path expressions: grammar, canonical text, navigation and pattern matching.
//!
//! A path starts at the root `$` and is followed by segments. Each segment
//! pairs a [`Connector`] (`.`, `..` or `...`) with a [`Selector`] (key, index,
//! wildcard index or regex key):
//!
//! ```
//! use jcmp_core::{Connector, JsonPath, Selector};
//!
//! let path: JsonPath = "$..items[*][\"odd key\"][r\"^v[0-9]+$\"]".parse()?;
//! assert_eq!(path.segments().len(), 4);
//! assert_eq!(path.segments()[0].connector(), Connector::Search);
//! assert!(matches!(path.segments()[1].selector(), Selector::AnyIndex));
//! assert_eq!(path.to_string(), "$..items[*][\"odd key\"][r\"^v[0-9]+$\"]");
//! # Ok::<(), jcmp_core::PathError>(())
//! ```

mod matching;
mod parser;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PathError;

pub(crate) const ROOT_SYMBOL: char = '$';

/// Controls how far a segment may reach below the current location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Connector {
    /// `.`: direct child only.
    #[default]
    Child,
    /// `..`: direct child, or the nearest descendants when no child matches.
    Search,
    /// `...`: direct child and every matching descendant.
    DeepSearch,
}

impl Connector {
    fn prefix(self) -> &'static str {
        match self {
            Self::Child => "",
            Self::Search => "..",
            Self::DeepSearch => "...",
        }
    }
}

/// A compiled key pattern from a `[r"..."]` segment.
///
/// Equality and hashing use the source text only.
#[derive(Clone)]
pub struct KeyPattern {
    source: String,
    regex: Regex,
}

impl KeyPattern {
    /// Compiles a pattern that must match a whole key.
    ///
    /// ```
    /// # use jcmp_core::KeyPattern;
    /// let pattern = KeyPattern::new("ab+")?;
    /// assert!(pattern.is_full_match("abbb"));
    /// assert!(!pattern.is_full_match("xabb"));
    /// # Ok::<(), jcmp_core::PathError>(())
    /// ```
    pub fn new(source: impl Into<String>) -> Result<Self, PathError> {
        let source = source.into();
        // The source must stand alone, or an unbalanced group could escape the anchors.
        let anchored = Regex::new(&source)
            .and_then(|_| Regex::new(&format!("^(?:{source})$")));
        match anchored {
            Ok(regex) => Ok(Self { source, regex }),
            Err(err) => Err(PathError::InvalidRegex { pattern: source, source: err }),
        }
    }

    /// Returns the pattern as written.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Tests whether the pattern matches the entire key.
    #[must_use]
    pub fn is_full_match(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

impl PartialEq for KeyPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for KeyPattern {}

impl Hash for KeyPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl fmt::Debug for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeyPattern").field(&self.source).finish()
    }
}

/// What a segment selects at its level.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Object member by exact key.
    Key(String),
    /// Array element by position.
    Index(usize),
    /// Every array element (`[*]` or `[]`).
    AnyIndex,
    /// Every object member whose key fully matches the pattern.
    Regex(KeyPattern),
}

impl Selector {
    /// Creates a key selector.
    #[must_use]
    pub fn key<S>(value: S) -> Self
    where
        S: Into<String>,
    {
        Self::Key(value.into())
    }

    /// Creates an index selector; negative values stand for any index.
    ///
    /// ```
    /// # use jcmp_core::Selector;
    /// assert_eq!(Selector::index(3), Selector::Index(3));
    /// assert_eq!(Selector::index(-1), Selector::AnyIndex);
    /// ```
    #[must_use]
    pub fn index(value: i64) -> Self {
        usize::try_from(value).map_or(Self::AnyIndex, Self::Index)
    }
}

/// One step of a path: a connector followed by a selector.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Segment {
    connector: Connector,
    selector: Selector,
}

impl Segment {
    /// Creates a segment.
    #[must_use]
    pub fn new(connector: Connector, selector: Selector) -> Self {
        Self { connector, selector }
    }

    /// Creates a direct-child segment.
    #[must_use]
    pub fn child(selector: Selector) -> Self {
        Self::new(Connector::Child, selector)
    }

    /// Returns the connector.
    #[must_use]
    pub fn connector(&self) -> Connector {
        self.connector
    }

    /// Returns the selector.
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Indicates whether the segment names exactly one location.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        self.connector == Connector::Child
            && matches!(self.selector, Selector::Key(_) | Selector::Index(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.connector.prefix();
        match &self.selector {
            Selector::Key(key) if is_simple_key(key) => {
                let prefix = if prefix.is_empty() { "." } else { prefix };
                write!(f, "{prefix}{key}")
            }
            Selector::Key(key) => {
                let quoted = serde_json::to_string(key).map_err(|_| fmt::Error)?;
                write!(f, "{prefix}[{quoted}]")
            }
            Selector::Index(index) => write!(f, "{prefix}[{index}]"),
            Selector::AnyIndex => write!(f, "{prefix}[*]"),
            Selector::Regex(pattern) => {
                write!(f, "{prefix}[r\"{}\"]", escape_bare_quotes(pattern.source()))
            }
        }
    }
}

/// A validated path expression.
///
/// Paths compare and hash by their canonical text, so they can key rule
/// tables and element maps directly.
///
/// ```
/// # use jcmp_core::JsonPath;
/// let path: JsonPath = "$.store[\"book\"][]".parse()?;
/// assert_eq!(path.to_string(), "$.store.book[*]");
/// assert_eq!(path.parent().unwrap().to_string(), "$.store.book");
/// # Ok::<(), jcmp_core::PathError>(())
/// ```
#[derive(Clone, Debug)]
pub struct JsonPath {
    text: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Returns the root path `$`.
    #[must_use]
    pub fn root() -> Self {
        Self { text: ROOT_SYMBOL.to_string(), segments: Vec::new() }
    }

    /// Parses and validates a path expression.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let segments = parser::PathParser::parse(input)?;
        Ok(Self::from_segments(segments))
    }

    /// Builds a path from already validated segments.
    #[must_use]
    pub fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator<Item = Segment>,
    {
        segments.into_iter().fold(Self::root(), Self::join)
    }

    /// Returns the canonical text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the segments after the root, left to right.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Indicates whether this is the bare root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Indicates whether every segment names exactly one location.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        self.segments.iter().all(Segment::is_concrete)
    }

    /// Appends one segment.
    #[must_use]
    pub fn join(mut self, segment: Segment) -> Self {
        use fmt::Write;
        // Writing into a String cannot fail.
        let _ = write!(self.text, "{segment}");
        self.segments.push(segment);
        self
    }

    /// Returns a copy extended by a direct child key.
    ///
    /// ```
    /// # use jcmp_core::JsonPath;
    /// let path = JsonPath::root().child_key("a").child_key("b c").child_index(2);
    /// assert_eq!(path.to_string(), "$.a[\"b c\"][2]");
    /// ```
    #[must_use]
    pub fn child_key(&self, key: &str) -> Self {
        self.clone().join(Segment::child(Selector::key(key)))
    }

    /// Returns a copy extended by a direct array index.
    #[must_use]
    pub fn child_index(&self, index: usize) -> Self {
        self.clone().join(Segment::child(Selector::Index(index)))
    }

    /// Splits off the last segment, or returns `None` for the root.
    #[must_use]
    pub fn split_last(&self) -> Option<(Self, &Segment)> {
        let (last, init) = self.segments.split_last()?;
        Some((Self::from_segments(init.iter().cloned()), last))
    }

    /// Returns the path without its last segment, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.split_last().map(|(parent, _)| parent)
    }

    /// Returns the last segment, or `None` for the root.
    #[must_use]
    pub fn current(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Decides whether this pattern is compatible with `other`.
    ///
    /// The relation is not symmetric: a search connector on this side absorbs
    /// any depth on the other side, but not the reverse.
    ///
    /// ```
    /// # use jcmp_core::JsonPath;
    /// let search: JsonPath = "$..a".parse()?;
    /// let concrete: JsonPath = "$.b.a".parse()?;
    /// assert!(search.matches(&concrete));
    /// assert!(!concrete.matches(&search));
    /// # Ok::<(), jcmp_core::PathError>(())
    /// ```
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        matching::segments_match(&self.segments, &other.segments)
    }
}

impl Default for JsonPath {
    fn default() -> Self {
        Self::root()
    }
}

impl PartialEq for JsonPath {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for JsonPath {}

impl Hash for JsonPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for JsonPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for JsonPath {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl Serialize for JsonPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for JsonPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn is_simple_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Escapes each `"` that is not already preceded by an odd run of backslashes.
fn escape_bare_quotes(source: &str) -> String {
    let mut escaped = String::with_capacity(source.len());
    let mut backslashes = 0usize;
    for ch in source.chars() {
        if ch == '"' && backslashes % 2 == 0 {
            escaped.push('\\');
        }
        backslashes = if ch == '\\' { backslashes + 1 } else { 0 };
        escaped.push(ch);
    }
    escaped
}

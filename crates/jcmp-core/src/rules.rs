//! Mapping and ignore rules, addressed by path pattern.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::{JsonPath, Node, RuleError};

/// Correlates the object elements of arrays found at `path` by the value of
/// one key field, instead of by position.
///
/// ```
/// # use jcmp_core::MappingRule;
/// let rule: MappingRule = "$.items=id".parse()?;
/// assert_eq!(rule.path().to_string(), "$.items");
/// assert_eq!(rule.key(), "id");
/// # Ok::<(), jcmp_core::RuleError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappingRule {
    path: JsonPath,
    key: String,
}

impl MappingRule {
    /// Creates a rule from its parts.
    #[must_use]
    pub fn new(path: JsonPath, key: impl Into<String>) -> Self {
        Self { path, key: key.into() }
    }

    /// Returns the array path pattern.
    #[must_use]
    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    /// Returns the key field name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl FromStr for MappingRule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('=') {
            Some((path, key)) if !path.is_empty() && !key.is_empty() => {
                Ok(Self::new(path.parse()?, key))
            }
            _ => Err(RuleError::InvalidMapping { rule: s.to_owned() }),
        }
    }
}

impl fmt::Display for MappingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.path, self.key)
    }
}

/// Relational condition attached to an ignore rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparator {
    /// `>`: suppress when the old value is greater than the new one.
    Greater,
    /// `<`: suppress when the old value is less than the new one.
    Less,
}

impl Comparator {
    /// Returns the operator symbol.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Greater => ">",
            Self::Less => "<",
        }
    }

    /// Evaluates `old <op> new` for two scalars of the same kind.
    ///
    /// ```
    /// # use jcmp_core::{Comparator, Node};
    /// let five = Node::from_json_str("5")?;
    /// let three = Node::from_json_str("3")?;
    /// assert!(Comparator::Greater.holds(&five, &three));
    /// assert!(!Comparator::Less.holds(&five, &three));
    /// # Ok::<(), jcmp_core::CanonicalizeError>(())
    /// ```
    #[must_use]
    pub fn holds(self, old: &Node, new: &Node) -> bool {
        let wanted = match self {
            Self::Greater => Ordering::Greater,
            Self::Less => Ordering::Less,
        };
        old.scalar_cmp(new) == Some(wanted)
    }
}

impl FromStr for Comparator {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(Self::Greater),
            "<" => Ok(Self::Less),
            other => Err(RuleError::UnsupportedComparator { op: other.to_owned() }),
        }
    }
}

/// Suppresses differences at paths matching `path`, either always or only
/// when the comparator holds for the old and new scalar values.
///
/// ```
/// # use jcmp_core::{Comparator, IgnoreRule};
/// let always: IgnoreRule = "$..updated_at".parse()?;
/// assert_eq!(always.comparator(), None);
/// let growth: IgnoreRule = "$.count{<}".parse()?;
/// assert_eq!(growth.comparator(), Some(Comparator::Less));
/// assert!("$.count{=}".parse::<IgnoreRule>().is_err());
/// # Ok::<(), jcmp_core::RuleError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IgnoreRule {
    path: JsonPath,
    comparator: Option<Comparator>,
}

impl IgnoreRule {
    /// Creates an unconditional rule.
    #[must_use]
    pub fn always(path: JsonPath) -> Self {
        Self { path, comparator: None }
    }

    /// Creates a rule that applies only when `comparator` holds.
    #[must_use]
    pub fn when(path: JsonPath, comparator: Comparator) -> Self {
        Self { path, comparator: Some(comparator) }
    }

    /// Returns the path pattern.
    #[must_use]
    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    /// Returns the optional comparator.
    #[must_use]
    pub fn comparator(&self) -> Option<Comparator> {
        self.comparator
    }
}

impl FromStr for IgnoreRule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(body) = s.strip_suffix('}') {
            if let Some((path, op)) = body.rsplit_once('{') {
                if !path.is_empty() && !op.is_empty() {
                    return Ok(Self::when(path.parse()?, op.parse()?));
                }
            }
        }
        Ok(Self::always(s.parse()?))
    }
}

impl fmt::Display for IgnoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.comparator {
            Some(op) => write!(f, "{}{{{}}}", self.path, op.symbol()),
            None => write!(f, "{}", self.path),
        }
    }
}

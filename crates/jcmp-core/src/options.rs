use indexmap::IndexMap;

use crate::{Comparator, IgnoreRule, JsonPath, MappingRule, Node, OptionsError, DEFAULT_MAX_DEPTH};

/// Configuration passed to [`Node::diff`](crate::Node::diff): selectors,
/// array mapping rules, ignore rules and the recursion limit.
///
/// Rules are consulted in insertion order. Adding a rule whose path is
/// already present replaces the earlier rule without moving it.
#[derive(Clone, Debug)]
pub struct DiffOptions {
    selectors: Vec<JsonPath>,
    mappings: IndexMap<JsonPath, String>,
    ignores: IndexMap<JsonPath, Option<Comparator>>,
    max_depth: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            selectors: Vec::new(),
            mappings: IndexMap::new(),
            ignores: IndexMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DiffOptions {
    /// Returns the selectors; an empty list compares whole documents.
    ///
    /// ```
    /// # use jcmp_core::DiffOptions;
    /// let opts = DiffOptions::default()
    ///     .with_selector("$.a".parse()?)
    ///     .with_selector("$.a".parse()?);
    /// assert_eq!(opts.selectors().len(), 1);
    /// # Ok::<(), jcmp_core::PathError>(())
    /// ```
    #[must_use]
    pub fn selectors(&self) -> &[JsonPath] {
        &self.selectors
    }

    /// Returns the recursion limit.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the mapping rules in lookup order.
    pub fn mappings(&self) -> impl Iterator<Item = MappingRule> + '_ {
        self.mappings.iter().map(|(path, key)| MappingRule::new(path.clone(), key.as_str()))
    }

    /// Returns the ignore rules in lookup order.
    pub fn ignores(&self) -> impl Iterator<Item = IgnoreRule> + '_ {
        self.ignores.iter().map(|(path, comparator)| match comparator {
            Some(op) => IgnoreRule::when(path.clone(), *op),
            None => IgnoreRule::always(path.clone()),
        })
    }

    /// Adds a selector. Selectors already present are skipped.
    #[must_use]
    pub fn with_selector(mut self, selector: JsonPath) -> Self {
        if !self.selectors.contains(&selector) {
            self.selectors.push(selector);
        }
        self
    }

    /// Adds an array mapping rule.
    ///
    /// ```
    /// # use jcmp_core::DiffOptions;
    /// let opts = DiffOptions::default()
    ///     .with_mapping("$.items=id".parse()?)
    ///     .with_mapping("$.items=uuid".parse()?);
    /// assert_eq!(opts.mapping_for(&"$.items".parse()?), Some("uuid"));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn with_mapping(mut self, rule: MappingRule) -> Self {
        self.mappings.insert(rule.path().clone(), rule.key().to_owned());
        self
    }

    /// Adds an ignore rule.
    #[must_use]
    pub fn with_ignore(mut self, rule: IgnoreRule) -> Self {
        self.ignores.insert(rule.path().clone(), rule.comparator());
        self
    }

    /// Sets the recursion limit used by extraction and comparison.
    ///
    /// ```
    /// # use jcmp_core::{DiffOptions, OptionsError};
    /// let opts = DiffOptions::default().with_max_depth(8)?;
    /// assert_eq!(opts.max_depth(), 8);
    /// assert_eq!(DiffOptions::default().with_max_depth(0).unwrap_err(), OptionsError::ZeroMaxDepth);
    /// # Ok::<(), OptionsError>(())
    /// ```
    pub fn with_max_depth(mut self, max_depth: usize) -> Result<Self, OptionsError> {
        if max_depth == 0 {
            return Err(OptionsError::ZeroMaxDepth);
        }
        self.max_depth = max_depth;
        Ok(self)
    }

    /// Finds the key field of the first mapping rule whose pattern matches
    /// the concrete array path.
    #[must_use]
    pub fn mapping_for(&self, path: &JsonPath) -> Option<&str> {
        self.mappings
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, key)| key.as_str())
    }

    /// Indicates whether an unconditional ignore rule covers `path`.
    pub(crate) fn ignores_path(&self, path: &JsonPath) -> bool {
        self.ignores
            .iter()
            .any(|(pattern, comparator)| comparator.is_none() && pattern.matches(path))
    }

    /// Decides whether a change from `old` to `new` at `path` is suppressed.
    ///
    /// The first matching rule decides.
    pub(crate) fn ignores_change(&self, path: &JsonPath, old: &Node, new: &Node) -> bool {
        self.ignores
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .is_some_and(|(_, comparator)| comparator.is_none_or(|op| op.holds(old, new)))
    }
}

//! Structural comparison of two documents.
//!
//! The comparison walks the elements picked by the configured selectors and
//! produces a [`Report`]: an ordered list of differences and correlation
//! warnings. Reports render to the native line format with
//! [`Report::render`] or to JSON with [`Report::render_raw`].
//!
//! Arrays are compared forward only: elements of the old array that have no
//! counterpart in the new one are reported, elements that only exist in the
//! new array are not.

mod list;
mod object;
mod primitives;

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{DepthLimitError, DiffOptions, JsonPath, Node, NodeKind};

const NULL_PLACEHOLDER: &str = "<null>";

/// How two values at the same path disagree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceKind {
    /// The kinds differ, or one side is absent.
    Type,
    /// Both sides are scalars of the same kind with different values.
    Value,
}

impl DifferenceKind {
    /// Returns the separator used in the native format.
    #[must_use]
    pub fn separator(self) -> char {
        match self {
            Self::Type => ':',
            Self::Value => '=',
        }
    }
}

/// A reported difference at one concrete path.
///
/// `old` and `new` hold the rendered sides: `[kind]` or `<null>` for type
/// differences, JSON literals for value differences.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Difference {
    /// Location of the difference.
    pub path: JsonPath,
    /// Type or value difference.
    pub kind: DifferenceKind,
    /// Rendering of the old side.
    pub old: String,
    /// Rendering of the new side.
    pub new: String,
}

impl Difference {
    /// Builds a type difference; `None` stands for an absent side.
    #[must_use]
    pub fn of_kinds(path: JsonPath, old: Option<NodeKind>, new: Option<NodeKind>) -> Self {
        let render = |kind: Option<NodeKind>| {
            kind.map_or_else(|| NULL_PLACEHOLDER.to_owned(), |kind| format!("[{kind}]"))
        };
        Self { path, kind: DifferenceKind::Type, old: render(old), new: render(new) }
    }

    /// Builds a value difference between two scalars.
    #[must_use]
    pub fn of_values(path: JsonPath, old: &Node, new: &Node) -> Self {
        Self {
            path,
            kind: DifferenceKind::Value,
            old: old.to_json_string(),
            new: new.to_json_string(),
        }
    }

    /// Builds the difference for an old array element missing from the new array.
    #[must_use]
    pub fn missing_element(path: JsonPath, old: &Node) -> Self {
        Self {
            path,
            kind: DifferenceKind::Value,
            old: old.to_json_string(),
            new: NULL_PLACEHOLDER.to_owned(),
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = self.kind.separator();
        writeln!(f, "-{} {separator} {}", self.path, self.old)?;
        write!(f, "+{} {separator} {}", self.path, self.new)
    }
}

/// A non-fatal condition met while correlating array elements. The element
/// concerned is skipped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum Warning {
    /// An array of objects has no mapping rule.
    MissingMapping {
        /// The array path.
        path: JsonPath,
    },
    /// An old array object lacks the mapping key field.
    OldKeyMissing {
        /// The array path.
        path: JsonPath,
        /// The key field name.
        key: String,
    },
    /// A new array object lacks the mapping key field.
    NewKeyMissing {
        /// The array path.
        path: JsonPath,
        /// The key field name.
        key: String,
    },
    /// An array element is itself an array.
    NestedArray {
        /// The array path.
        path: JsonPath,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMapping { path } => write!(f, "Mapping is missing for: {path} (skipping)"),
            Self::OldKeyMissing { path, key } => {
                write!(f, "Mapping error on left: {path}={key} (skipping)")
            }
            Self::NewKeyMissing { path, key } => {
                write!(f, "Mapping error on right: {path}={key} (skipping)")
            }
            Self::NestedArray { path } => {
                write!(f, "Multidimensional arrays are not supported: {path} (skipping)")
            }
        }
    }
}

/// One report line group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entry {
    /// A reported difference.
    Difference(Difference),
    /// A correlation warning.
    Warning(Warning),
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Difference(difference) => difference.fmt(f),
            Self::Warning(warning) => write!(f, "[WARNING] {warning}"),
        }
    }
}

/// Ordered outcome of a comparison.
///
/// ```
/// # use jcmp_core::{DiffOptions, Node};
/// let lhs = Node::from_json_str("{\"n\":1,\"s\":\"x\"}")?;
/// let rhs = Node::from_json_str("{\"n\":\"1\",\"s\":\"x\"}")?;
/// let report = lhs.diff(&rhs, &DiffOptions::default())?;
/// assert!(report.has_differences());
/// assert_eq!(report.render(), "-$.n : [number]\n+$.n : [string]\n\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    entries: Vec<Entry>,
}

impl Report {
    /// Builds a report from entries.
    #[must_use]
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Indicates whether nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entries in discovery order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterates over the differences only.
    pub fn differences(&self) -> impl Iterator<Item = &Difference> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Difference(difference) => Some(difference),
            Entry::Warning(_) => None,
        })
    }

    /// Iterates over the warnings only.
    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Warning(warning) => Some(warning),
            Entry::Difference(_) => None,
        })
    }

    /// Indicates whether at least one difference was reported. Warnings do
    /// not count.
    #[must_use]
    pub fn has_differences(&self) -> bool {
        self.differences().next().is_some()
    }

    /// Renders the report in the native line format: every entry followed
    /// by a blank line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut output = String::new();
        for entry in &self.entries {
            output.push_str(&entry.to_string());
            output.push_str("\n\n");
        }
        output
    }

    /// Serializes the entries as JSON.
    ///
    /// ```
    /// # use jcmp_core::{DiffOptions, Node};
    /// let lhs = Node::from_json_str("{\"v\":1}")?;
    /// let rhs = Node::from_json_str("{\"v\":2}")?;
    /// let raw = lhs.diff(&rhs, &DiffOptions::default())?.render_raw()?;
    /// assert_eq!(
    ///     raw,
    ///     "[{\"difference\":{\"path\":\"$.v\",\"kind\":\"value\",\"old\":\"1\",\"new\":\"2\"}}]"
    /// );
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn render_raw(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    fn single(difference: Difference) -> Self {
        Self { entries: vec![Entry::Difference(difference)] }
    }

    fn push_difference(&mut self, difference: Difference) {
        self.entries.push(Entry::Difference(difference));
    }

    fn push_warning(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        self.entries.push(Entry::Warning(warning));
    }

    fn extend(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }
}

impl IntoIterator for Report {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

pub(crate) fn diff_documents(
    lhs: &Node,
    rhs: &Node,
    options: &DiffOptions,
) -> Result<Report, DepthLimitError> {
    let left = collect_elements(lhs, options)?;
    let right = collect_elements(rhs, options)?;

    let mut report = Report::default();
    for (path, value) in &left {
        let depth = path.segments().len();
        report.extend(diff_impl(Some(*value), right.get(path).copied(), path, depth, options)?);
    }
    for (path, value) in right.iter().filter(|(path, _)| !left.contains_key(*path)) {
        let depth = path.segments().len();
        report.extend(diff_impl(None, Some(*value), path, depth, options)?);
    }
    Ok(report)
}

/// Maps each selected concrete path to its value. A later match for the
/// same path replaces the value in place.
fn collect_elements<'a>(
    node: &'a Node,
    options: &DiffOptions,
) -> Result<IndexMap<JsonPath, &'a Node>, DepthLimitError> {
    let mut elements = IndexMap::new();
    if options.selectors().is_empty() {
        elements.insert(JsonPath::root(), node);
        return Ok(elements);
    }
    for selector in options.selectors() {
        for element in selector.extract_with_limit(node, options.max_depth())? {
            let (value, path) = element.into_parts();
            elements.insert(path, value);
        }
    }
    tracing::debug!(
        selectors = options.selectors().len(),
        elements = elements.len(),
        "collected elements"
    );
    Ok(elements)
}

/// Compares two optional values at `path`. `None` and `null` are the same.
pub(super) fn diff_impl(
    lhs: Option<&Node>,
    rhs: Option<&Node>,
    path: &JsonPath,
    depth: usize,
    options: &DiffOptions,
) -> Result<Report, DepthLimitError> {
    if depth > options.max_depth() {
        return Err(DepthLimitError { limit: options.max_depth(), path: path.clone() });
    }
    let lhs = lhs.filter(|node| !node.is_null());
    let rhs = rhs.filter(|node| !node.is_null());
    if options.ignores_path(path) {
        return Ok(Report::default());
    }

    let report = match (lhs, rhs) {
        (None, None) => Report::default(),
        (None, Some(rhs)) => {
            Report::single(Difference::of_kinds(path.clone(), None, Some(rhs.kind())))
        }
        (Some(lhs), None) => {
            Report::single(Difference::of_kinds(path.clone(), Some(lhs.kind()), None))
        }
        (Some(Node::Object(lhs)), Some(Node::Object(rhs))) => {
            object::diff_objects(lhs, rhs, path, depth, options)?
        }
        (Some(Node::Array(lhs)), Some(Node::Array(rhs))) => {
            list::diff_lists(lhs, rhs, path, depth, options)?
        }
        (Some(lhs), Some(rhs)) if lhs.kind() != rhs.kind() => Report::single(
            Difference::of_kinds(path.clone(), Some(lhs.kind()), Some(rhs.kind())),
        ),
        (Some(lhs), Some(rhs)) => primitives::diff_primitives(lhs, rhs, path, options),
    };
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn doc(json: &str) -> Node {
        Node::from_json_str(json).unwrap()
    }

    fn render(lhs: &str, rhs: &str, options: &DiffOptions) -> String {
        doc(lhs).diff(&doc(rhs), options).unwrap().render()
    }

    fn defaults() -> DiffOptions {
        DiffOptions::default()
    }

    #[test]
    fn equal_documents_report_nothing() {
        let options = defaults().with_mapping("$.a=b".parse().unwrap());
        let node = doc("{\"a\":[1,{\"b\":null}]}");
        let report = node.diff(&node.clone(), &options).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.render(), "");
    }

    #[test]
    fn kind_mismatch_is_a_type_difference() {
        assert_eq!(
            render("{\"n\":1}", "{\"n\":\"1\"}", &defaults()),
            "-$.n : [number]\n+$.n : [string]\n\n"
        );
        assert_eq!(
            render("{\"n\":true}", "{\"n\":{}}", &defaults()),
            "-$.n : [boolean]\n+$.n : [object]\n\n"
        );
    }

    #[test]
    fn scalar_change_is_a_value_difference() {
        assert_eq!(render("{\"v\":1}", "{\"v\":2}", &defaults()), "-$.v = 1\n+$.v = 2\n\n");
        assert_eq!(
            render("{\"s\":\"a\\\"b\"}", "{\"s\":\"c\"}", &defaults()),
            "-$.s = \"a\\\"b\"\n+$.s = \"c\"\n\n"
        );
    }

    #[test]
    fn integers_beyond_f64_precision_are_compared_exactly() {
        assert_eq!(
            render("{\"id\":9007199254740993}", "{\"id\":9007199254740992}", &defaults()),
            "-$.id = 9007199254740993\n+$.id = 9007199254740992\n\n"
        );

        let options = defaults().with_mapping("$.items=id".parse().unwrap());
        let lhs = "{\"items\":[{\"id\":9007199254740993,\"x\":1}]}";
        let rhs = "{\"items\":[{\"id\":9007199254740992,\"x\":2}]}";
        assert_eq!(render(lhs, rhs, &options), "");
    }

    #[test]
    fn null_and_absent_are_equivalent() {
        assert_eq!(render("{\"a\":null}", "{}", &defaults()), "");
        assert_eq!(
            render("{\"a\":null}", "{\"a\":3}", &defaults()),
            "-$.a : <null>\n+$.a : [number]\n\n"
        );
        assert_eq!(render("{\"a\":[]}", "{}", &defaults()), "-$.a : [array]\n+$.a : <null>\n\n");
    }

    #[test]
    fn object_keys_follow_old_then_new_only_order() {
        assert_eq!(
            render("{\"b\":1,\"a\":1}", "{\"c\":1,\"a\":2,\"b\":2}", &defaults()),
            "-$.b = 1\n+$.b = 2\n\n-$.a = 1\n+$.a = 2\n\n-$.c : <null>\n+$.c : [number]\n\n"
        );
    }

    #[test]
    fn mapped_array_objects_are_correlated_by_key() {
        let options = defaults().with_mapping("$.items=id".parse().unwrap());
        let lhs = "{\"items\":[{\"id\":1,\"x\":\"a\"},{\"id\":2,\"x\":\"b\"}]}";
        let rhs = "{\"items\":[{\"id\":2,\"x\":\"b\"},{\"id\":1,\"x\":\"c\"}]}";
        assert_eq!(render(lhs, rhs, &options), "-$.items[0].x = \"a\"\n+$.items[0].x = \"c\"\n\n");
    }

    #[test]
    fn unmatched_old_objects_are_silently_skipped() {
        let options = defaults().with_mapping("$.items=id".parse().unwrap());
        let lhs = "{\"items\":[{\"id\":1}]}";
        let rhs = "{\"items\":[{\"id\":2},{\"id\":3}]}";
        assert_eq!(render(lhs, rhs, &options), "");
    }

    #[test]
    fn every_correlated_new_object_is_compared() {
        let options = defaults().with_mapping("$.items=id".parse().unwrap());
        let lhs = "{\"items\":[{\"id\":1,\"v\":0}]}";
        let rhs = "{\"items\":[{\"id\":1,\"v\":1},{\"id\":1,\"v\":2}]}";
        assert_eq!(
            render(lhs, rhs, &options),
            "-$.items[0].v = 0\n+$.items[0].v = 1\n\n-$.items[0].v = 0\n+$.items[0].v = 2\n\n"
        );
    }

    #[test]
    fn correlation_problems_become_warnings() {
        let lhs = doc("{\"items\":[{\"id\":1},{\"name\":\"x\"}],\"grid\":[[1]]}");
        let rhs = doc("{\"items\":[{\"name\":\"y\"},{\"id\":1}],\"grid\":[[2]]}");

        let report = lhs.diff(&rhs, &defaults()).unwrap();
        assert_eq!(
            report.render(),
            "[WARNING] Mapping is missing for: $.items (skipping)\n\n\
             [WARNING] Mapping is missing for: $.items (skipping)\n\n\
             [WARNING] Multidimensional arrays are not supported: $.grid (skipping)\n\n"
        );
        assert!(!report.has_differences());

        let options = defaults().with_mapping("$.items=id".parse().unwrap());
        let report = lhs.diff(&rhs, &options).unwrap();
        let warnings: Vec<_> = report.warnings().map(ToString::to_string).collect();
        assert_eq!(
            warnings,
            [
                "Mapping error on right: $.items=id (skipping)",
                "Mapping error on left: $.items=id (skipping)",
                "Multidimensional arrays are not supported: $.grid (skipping)",
            ]
        );
    }

    #[test]
    fn missing_scalars_are_reported_forward_only() {
        assert_eq!(
            render("{\"t\":[\"a\",\"b\",null]}", "{\"t\":[\"b\",\"c\"]}", &defaults()),
            "-$.t[0] = \"a\"\n+$.t[0] = <null>\n\n-$.t[2] = null\n+$.t[2] = <null>\n\n"
        );
        assert_eq!(render("{\"t\":[1]}", "{\"t\":[2,1]}", &defaults()), "");
    }

    #[test]
    fn unconditional_ignore_suppresses_subtrees() {
        let options = defaults()
            .with_ignore("$..meta".parse().unwrap())
            .with_ignore("$.u".parse().unwrap());
        let lhs = "{\"meta\":{\"a\":1},\"u\":[1],\"x\":{\"meta\":2}}";
        let rhs = "{\"meta\":\"gone\",\"u\":[2],\"x\":{}}";
        assert_eq!(render(lhs, rhs, &options), "");
    }

    #[test]
    fn slot_ignore_does_not_hide_missing_scalars() {
        let options = defaults().with_ignore("$.t[*]".parse().unwrap());
        assert_eq!(
            render("{\"t\":[1]}", "{\"t\":[2]}", &options),
            "-$.t[0] = 1\n+$.t[0] = <null>\n\n"
        );
    }

    #[test]
    fn ignored_path_suppresses_type_differences() {
        let options = defaults().with_ignore("$.a".parse().unwrap());
        assert_eq!(render("{\"a\":1}", "{\"a\":\"x\"}", &options), "");
    }

    #[test]
    fn comparator_ignore_holds_only_in_one_direction() {
        let less = defaults().with_ignore("$.n{<}".parse().unwrap());
        assert_eq!(render("{\"n\":5}", "{\"n\":3}", &less), "-$.n = 5\n+$.n = 3\n\n");
        assert_eq!(render("{\"n\":3}", "{\"n\":5}", &less), "");

        let greater = defaults().with_ignore("$.n{>}".parse().unwrap());
        assert_eq!(render("{\"n\":5}", "{\"n\":3}", &greater), "");
    }

    #[test]
    fn comparator_ignore_does_not_hide_type_differences() {
        let options = defaults().with_ignore("$.n{>}".parse().unwrap());
        assert_eq!(render("{\"n\":5}", "{}", &options), "-$.n : [number]\n+$.n : <null>\n\n");
    }

    #[test]
    fn selectors_restrict_the_comparison() {
        let options = defaults().with_selector("$..price".parse().unwrap());
        let lhs = "{\"a\":{\"price\":1},\"name\":\"x\"}";
        let rhs = "{\"a\":{\"price\":2},\"name\":\"y\",\"b\":{\"price\":3}}";
        assert_eq!(
            render(lhs, rhs, &options),
            "-$.a.price = 1\n+$.a.price = 2\n\n-$.b.price : <null>\n+$.b.price : [number]\n\n"
        );
    }

    #[test]
    fn overlapping_selectors_compare_each_path_once() {
        let options = defaults()
            .with_selector("$.a".parse().unwrap())
            .with_selector("$[\"a\"]".parse().unwrap())
            .with_selector("$..a".parse().unwrap());
        assert_eq!(render("{\"a\":1}", "{\"a\":2}", &options), "-$.a = 1\n+$.a = 2\n\n");
    }

    #[test]
    fn depth_limit_aborts_the_comparison() {
        let options = defaults().with_max_depth(2).unwrap();
        let err = doc("{\"a\":{\"b\":{\"c\":1}}}")
            .diff(&doc("{\"a\":{\"b\":{\"c\":2}}}"), &options)
            .unwrap_err();
        assert_eq!(err.path.to_string(), "$.a.b.c");
        assert_eq!(err.to_string(), "max depth 2 exceeded at $.a.b.c");
    }

    #[test]
    fn raw_render_tags_entries() {
        let lhs = doc("{\"g\":[[1]],\"n\":1}");
        let report = lhs.diff(&doc("{\"g\":[],\"n\":null}"), &defaults()).unwrap();
        assert_eq!(
            report.render_raw().unwrap(),
            "[{\"warning\":{\"warning\":\"nested_array\",\"path\":\"$.g\"}},\
             {\"difference\":{\"path\":\"$.n\",\"kind\":\"type\",\"old\":\"[number]\",\"new\":\"<null>\"}}]"
        );
    }

    fn arb_doc() -> impl Strategy<Value = Node> {
        let leaf = prop_oneof![
            Just(Node::Null),
            any::<bool>().prop_map(Node::Bool),
            any::<i16>().prop_map(|i| Node::Number(i64::from(i).into())),
            "[a-c]{0,2}".prop_map(Node::String),
        ];
        leaf.prop_recursive(4, 24, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(Node::Array),
                proptest::collection::vec(("[abc]", inner), 0..4)
                    .prop_map(|pairs| Node::Object(pairs.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn a_document_never_differs_from_itself(node in arb_doc()) {
            let report = node.diff(&node, &defaults()).unwrap();
            // Warnings still appear for unmapped object arrays and nested arrays.
            prop_assert!(!report.has_differences(), "{}", report.render());
        }

        #[test]
        fn comparison_is_deterministic(lhs in arb_doc(), rhs in arb_doc()) {
            let first = lhs.diff(&rhs, &defaults()).unwrap();
            let second = lhs.diff(&rhs, &defaults()).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}

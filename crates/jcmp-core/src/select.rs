//! Evaluation of path expressions against documents.

use std::fmt;

use crate::{Connector, DepthLimitError, JsonPath, Node, Segment, Selector};

/// Default recursion limit for extraction and comparison.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// A located value: a node borrowed from a document together with the
/// concrete path that leads to it.
///
/// ```
/// # use jcmp_core::{JsonPath, Node};
/// let doc = Node::from_json_str("{\"a\":[10,20]}")?;
/// let path: JsonPath = "$.a[1]".parse()?;
/// let elements = path.extract(&doc)?;
/// assert_eq!(elements[0].to_string(), "$.a[1]\n20");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Element<'a> {
    value: &'a Node,
    path: JsonPath,
}

impl<'a> Element<'a> {
    /// Pairs a value with its location.
    #[must_use]
    pub fn new(value: &'a Node, path: JsonPath) -> Self {
        Self { value, path }
    }

    /// Wraps a whole document, located at `$`.
    #[must_use]
    pub fn root(value: &'a Node) -> Self {
        Self::new(value, JsonPath::root())
    }

    /// Returns the located value.
    #[must_use]
    pub fn value(&self) -> &'a Node {
        self.value
    }

    /// Returns the concrete path of the value.
    #[must_use]
    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    /// Returns the last segment of the path, or `None` at the root.
    #[must_use]
    pub fn key(&self) -> Option<&Segment> {
        self.path.current()
    }

    /// Splits the element into its value and path.
    #[must_use]
    pub fn into_parts(self) -> (&'a Node, JsonPath) {
        (self.value, self.path)
    }

    /// Evaluates `path` starting at this element.
    ///
    /// The returned paths continue from this element's own path.
    ///
    /// ```
    /// # use jcmp_core::{JsonPath, Node};
    /// let doc = Node::from_json_str("{\"a\":{\"b\":{\"c\":1}}}")?;
    /// let outer = doc.select(&"$.a".parse()?)?;
    /// let inner = outer[0].extract(&"$.b.c".parse()?)?;
    /// assert_eq!(inner[0].path().to_string(), "$.a.b.c");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn extract(&self, path: &JsonPath) -> Result<Vec<Element<'a>>, DepthLimitError> {
        extract_from(self.value, self.path.clone(), path.segments(), DEFAULT_MAX_DEPTH)
    }
}

impl fmt::Display for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.path, self.value.to_pretty_string())
    }
}

impl JsonPath {
    /// Evaluates the path against `node` and returns every match in
    /// traversal order.
    ///
    /// A `..` segment descends into children only when the current level has
    /// no direct match; a `...` segment always descends as well.
    ///
    /// ```
    /// # use jcmp_core::{JsonPath, Node};
    /// let doc = Node::from_json_str("{\"a\":{\"a\":1}}")?;
    /// let search: JsonPath = "$..a".parse()?;
    /// let deep: JsonPath = "$...a".parse()?;
    /// assert_eq!(search.extract(&doc)?.len(), 1);
    /// assert_eq!(deep.extract(&doc)?.len(), 2);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn extract<'a>(&self, node: &'a Node) -> Result<Vec<Element<'a>>, DepthLimitError> {
        self.extract_with_limit(node, DEFAULT_MAX_DEPTH)
    }

    /// Same as [`JsonPath::extract`] with an explicit recursion limit.
    pub fn extract_with_limit<'a>(
        &self,
        node: &'a Node,
        max_depth: usize,
    ) -> Result<Vec<Element<'a>>, DepthLimitError> {
        let found = extract_from(node, JsonPath::root(), self.segments(), max_depth)?;
        tracing::debug!(path = %self, matches = found.len(), "extracted elements");
        Ok(found)
    }
}

fn extract_from<'a>(
    node: &'a Node,
    origin: JsonPath,
    segments: &[Segment],
    limit: usize,
) -> Result<Vec<Element<'a>>, DepthLimitError> {
    let mut extractor = Extractor { limit, found: Vec::new() };
    extractor.visit(node, segments, origin, 0)?;
    Ok(extractor.found)
}

struct Extractor<'a> {
    limit: usize,
    found: Vec<Element<'a>>,
}

impl<'a> Extractor<'a> {
    fn visit(
        &mut self,
        node: &'a Node,
        segments: &[Segment],
        tracker: JsonPath,
        depth: usize,
    ) -> Result<(), DepthLimitError> {
        if depth > self.limit {
            return Err(DepthLimitError { limit: self.limit, path: tracker });
        }
        let Some((head, rest)) = segments.split_first() else {
            self.found.push(Element::new(node, tracker));
            return Ok(());
        };

        let before = self.found.len();
        match (head.selector(), node) {
            (Selector::Index(index), Node::Array(items)) => {
                if let Some(item) = items.get(*index) {
                    self.visit(item, rest, tracker.child_index(*index), depth + 1)?;
                }
            }
            (Selector::AnyIndex, Node::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    self.visit(item, rest, tracker.child_index(index), depth + 1)?;
                }
            }
            (Selector::Key(key), Node::Object(map)) => {
                if let Some(value) = map.get(key) {
                    self.visit(value, rest, tracker.child_key(key), depth + 1)?;
                }
            }
            (Selector::Regex(pattern), Node::Object(map)) => {
                for (key, value) in map {
                    if pattern.is_full_match(key) {
                        self.visit(value, rest, tracker.child_key(key), depth + 1)?;
                    }
                }
            }
            _ => {}
        }

        let descend = match head.connector() {
            Connector::Child => false,
            Connector::Search => self.found.len() == before,
            Connector::DeepSearch => true,
        };
        if descend {
            match node {
                Node::Array(items) => {
                    for (index, item) in items.iter().enumerate() {
                        self.visit(item, segments, tracker.child_index(index), depth + 1)?;
                    }
                }
                Node::Object(map) => {
                    for (key, value) in map {
                        self.visit(value, segments, tracker.child_key(key), depth + 1)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn doc(json: &str) -> Node {
        Node::from_json_str(json).unwrap()
    }

    fn paths(json: &str, path: &str) -> Vec<String> {
        let node = doc(json);
        let path: JsonPath = path.parse().unwrap();
        path.extract(&node).unwrap().iter().map(|e| e.path().to_string()).collect()
    }

    #[test]
    fn root_yields_the_document() {
        assert_eq!(paths("{\"a\":1}", "$"), ["$"]);
    }

    #[test]
    fn search_stops_at_the_first_level_with_a_match() {
        assert_eq!(paths("{\"a\":{\"a\":1}}", "$..a"), ["$.a"]);
    }

    #[test]
    fn deep_search_always_recurses() {
        assert_eq!(paths("{\"a\":{\"a\":1}}", "$...a"), ["$.a", "$.a.a"]);
    }

    #[test]
    fn search_falls_back_to_children_in_order() {
        let json = "{\"x\":{\"id\":1},\"y\":[{\"id\":2},{\"z\":{\"id\":3}}]}";
        assert_eq!(paths(json, "$..id"), ["$.x.id", "$.y[0].id", "$.y[1].z.id"]);
    }

    #[test]
    fn search_in_sibling_branches_is_independent() {
        // A match under `x` does not stop the fallback from exploring `y`.
        let json = "{\"x\":{\"id\":1},\"y\":{\"deeper\":{\"id\":2}}}";
        assert_eq!(paths(json, "$..id"), ["$.x.id", "$.y.deeper.id"]);
    }

    #[test]
    fn wildcard_index_visits_every_position() {
        assert_eq!(paths("[1,2,3]", "$[*]"), ["$[0]", "$[1]", "$[2]"]);
        assert_eq!(paths("[1,2,3]", "$[]"), ["$[0]", "$[1]", "$[2]"]);
    }

    #[test]
    fn index_out_of_range_yields_nothing() {
        assert!(paths("[1,2,3]", "$[3]").is_empty());
        assert_eq!(paths("[1,2,3]", "$[2]"), ["$[2]"]);
    }

    #[test]
    fn type_mismatch_yields_nothing() {
        assert!(paths("{\"0\":1}", "$[0]").is_empty());
        assert!(paths("[1]", "$.a").is_empty());
        assert!(paths("\"text\"", "$[*]").is_empty());
    }

    #[test]
    fn regex_keys_use_full_match_in_document_order() {
        let json = "{\"v10\":1,\"x\":2,\"v2\":3,\"v2x\":4}";
        assert_eq!(paths(json, "$[r\"v[0-9]+\"]"), ["$.v10", "$.v2"]);
    }

    #[test]
    fn quoted_keys_reach_non_identifier_members() {
        let json = "{\"a b\":{\"1\":true}}";
        assert_eq!(paths(json, "$[\"a b\"][\"1\"]"), ["$[\"a b\"][\"1\"]"]);
    }

    #[test]
    fn deep_search_below_a_wildcard() {
        let json = "{\"items\":[{\"tags\":[{\"n\":1}]},{\"n\":2}]}";
        assert_eq!(paths(json, "$.items[*]...n"), ["$.items[0].tags[0].n", "$.items[1].n"]);
    }

    #[test]
    fn search_with_trailing_child() {
        let json = "{\"a\":{\"b\":{\"c\":1}},\"d\":{\"b\":{\"c\":2}}}";
        assert_eq!(paths(json, "$..b.c"), ["$.a.b.c", "$.d.b.c"]);
    }

    #[test]
    fn values_are_borrowed_from_the_document() {
        let node = doc("{\"a\":[true]}");
        let path: JsonPath = "$.a[0]".parse().unwrap();
        let found = path.extract(&node).unwrap();
        assert_eq!(found[0].value(), &Node::Bool(true));
        assert_eq!(found[0].key().unwrap().selector(), &Selector::Index(0));
    }

    #[test]
    fn element_display_pretty_prints_with_path_header() {
        let node = doc("{\"a\":{\"b\":[1,2]}}");
        let path: JsonPath = "$.a".parse().unwrap();
        let found = path.extract(&node).unwrap();
        assert_eq!(
            found[0].to_string(),
            "$.a\n{\n    \"b\": [\n        1,\n        2\n    ]\n}"
        );
    }

    #[test]
    fn depth_limit_is_enforced() {
        let node = doc("{\"a\":{\"a\":{\"a\":{\"a\":1}}}}");
        let path: JsonPath = "$...a".parse().unwrap();
        let err = path.extract_with_limit(&node, 2).unwrap_err();
        assert_eq!(err.limit, 2);
        assert_eq!(err.path.to_string(), "$.a.a.a");
        assert_eq!(path.extract_with_limit(&node, 4).unwrap().len(), 4);
    }

    fn arb_doc() -> impl Strategy<Value = Node> {
        let leaf = prop_oneof![
            Just(Node::Null),
            any::<bool>().prop_map(Node::Bool),
            any::<i16>().prop_map(|i| Node::Number(i64::from(i).into())),
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
        fn extraction_is_deterministic(node in arb_doc(), pattern in "\\$(\\.{1,3}[abc]|\\[\\*\\]){0,3}") {
            let path: JsonPath = pattern.parse().unwrap();
            let first = path.extract(&node).unwrap();
            let second = path.extract(&node).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn deep_search_finds_at_least_what_search_finds(node in arb_doc(), key in "[abc]") {
            let search: JsonPath = format!("$..{key}").parse().unwrap();
            let deep: JsonPath = format!("$...{key}").parse().unwrap();
            let found = search.extract(&node).unwrap();
            let deep_found = deep.extract(&node).unwrap();
            prop_assert!(deep_found.len() >= found.len());
            for element in &found {
                prop_assert!(deep_found.contains(element));
            }
        }

        #[test]
        fn extracted_paths_are_concrete(node in arb_doc(), pattern in "\\$(\\.{1,3}[abc]|\\[\\*\\]){0,3}") {
            let path: JsonPath = pattern.parse().unwrap();
            for element in path.extract(&node).unwrap() {
                prop_assert!(element.path().is_concrete());
            }
        }
    }
}

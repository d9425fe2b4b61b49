//! Synthetic corpora shared by the `jcmp` criterion benchmarks.
//!
//! Each corpus is generated deterministically as JSON text, so benchmarks
//! measure parsing separately from extraction and comparison.
//!
//! # Examples
//!
//! ```
//! let corpora = jcmp_benches::available_corpora();
//! let dataset = corpora[0].load()?;
//! let report = dataset.diff()?;
//! assert!(report.has_differences());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use jcmp_core::{CanonicalizeError, DepthLimitError, DiffOptions, Node, Report};
use serde_json::{json, Value};

const ORDER_COUNT: u64 = 250;
const NESTING: usize = 64;

/// A named pair of generated documents with the rules that fit them.
#[derive(Clone, Debug)]
pub struct Corpus {
    name: &'static str,
    before: String,
    after: String,
    selectors: &'static [&'static str],
    mappings: &'static [&'static str],
    ignores: &'static [&'static str],
}

impl Corpus {
    /// Returns the corpus identifier.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the combined size of both documents in bytes.
    #[must_use]
    pub fn fixture_bytes(&self) -> usize {
        self.before.len() + self.after.len()
    }

    /// Returns the first path expression of the corpus, used for extraction benchmarks.
    #[must_use]
    pub fn probe(&self) -> &'static str {
        self.selectors.first().copied().unwrap_or("$")
    }

    /// Parses both documents and builds the comparison options.
    pub fn load(&self) -> Result<Dataset, Box<dyn std::error::Error>> {
        let mut options = DiffOptions::default();
        for selector in self.selectors {
            options = options.with_selector(selector.parse()?);
        }
        for mapping in self.mappings {
            options = options.with_mapping(mapping.parse()?);
        }
        for ignore in self.ignores {
            options = options.with_ignore(ignore.parse()?);
        }
        Ok(Dataset {
            before: parse(&self.before)?,
            after: parse(&self.after)?,
            options,
        })
    }
}

fn parse(text: &str) -> Result<Node, CanonicalizeError> {
    Node::from_json_str(text)
}

/// Parsed documents ready for comparison.
#[derive(Clone, Debug)]
pub struct Dataset {
    before: Node,
    after: Node,
    options: DiffOptions,
}

impl Dataset {
    /// Returns the old document.
    #[must_use]
    pub fn before(&self) -> &Node {
        &self.before
    }

    /// Returns the new document.
    #[must_use]
    pub fn after(&self) -> &Node {
        &self.after
    }

    /// Returns the comparison options of the corpus.
    #[must_use]
    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Compares the documents under the corpus options.
    pub fn diff(&self) -> Result<Report, DepthLimitError> {
        self.before.diff(&self.after, &self.options)
    }
}

/// Returns every registered corpus.
#[must_use]
pub fn available_corpora() -> Vec<Corpus> {
    vec![orders_corpus(), nested_corpus()]
}

fn orders_corpus() -> Corpus {
    let order = |id: u64, revised: bool| {
        let total = if revised && id % 7 == 0 { id * 3 + 1 } else { id * 3 };
        let tier = if revised && id % 11 == 0 { 9 } else { id % 3 };
        let lines: Vec<Value> =
            (0..4).map(|n| json!({ "sku": format!("sku-{n}"), "qty": (id + n) % 5 })).collect();
        json!({
            "id": id,
            "customer": { "name": format!("customer-{}", id % 17), "tier": tier },
            "lines": lines,
            "tags": ["new", if id % 2 == 0 { "even" } else { "odd" }],
            "total": total,
            "updated_at": if revised { "2024-02-01" } else { "2024-01-01" },
        })
    };
    let before: Vec<Value> = (0..ORDER_COUNT).map(|id| order(id, false)).collect();
    let after: Vec<Value> = (0..ORDER_COUNT).rev().map(|id| order(id, true)).collect();
    Corpus {
        name: "orders",
        before: json!({ "orders": before }).to_string(),
        after: json!({ "orders": after }).to_string(),
        selectors: &["$.orders"],
        mappings: &["$.orders=id", "$.orders[*].lines=sku"],
        ignores: &["$..updated_at", "$..total{<}"],
    }
}

fn nested_corpus() -> Corpus {
    let build = |leaf: u64| {
        (0..NESTING).fold(json!({ "leaf": leaf, "values": [1, 2, 3] }), |inner, level| {
            json!({ (format!("level{level}")): inner, "meta": { "level": level } })
        })
    };
    Corpus {
        name: "nested",
        before: build(1).to_string(),
        after: build(2).to_string(),
        selectors: &["$...leaf"],
        mappings: &[],
        ignores: &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpora_load_and_differ() {
        for corpus in available_corpora() {
            let dataset = corpus.load().unwrap();
            let report = dataset.diff().unwrap();
            assert!(report.has_differences(), "{}", corpus.name());
            assert!(corpus.fixture_bytes() > 0);
        }
    }

    #[test]
    fn orders_report_only_tier_changes() {
        let corpus = orders_corpus();
        let report = corpus.load().unwrap().diff().unwrap();
        assert_eq!(report.warnings().count(), 0);
        // Totals only grow, and `{<}` hides increases.
        assert_eq!(report.differences().count(), 23);
        assert!(report.differences().all(|d| d.path.to_string().ends_with(".customer.tier")));
    }
}

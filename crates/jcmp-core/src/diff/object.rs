use indexmap::IndexMap;

use super::{diff_impl, Report};
use crate::{DepthLimitError, DiffOptions, JsonPath, Node};

/// Walks the old keys in order, then the keys only the new object has.
pub(super) fn diff_objects(
    lhs: &IndexMap<String, Node>,
    rhs: &IndexMap<String, Node>,
    path: &JsonPath,
    depth: usize,
    options: &DiffOptions,
) -> Result<Report, DepthLimitError> {
    let mut report = Report::default();

    for (key, value) in lhs {
        let sub_path = path.child_key(key);
        report.extend(diff_impl(Some(value), rhs.get(key), &sub_path, depth + 1, options)?);
    }

    for (key, value) in rhs.iter().filter(|(key, _)| !lhs.contains_key(*key)) {
        let sub_path = path.child_key(key);
        report.extend(diff_impl(None, Some(value), &sub_path, depth + 1, options)?);
    }

    Ok(report)
}

use super::{diff_impl, Difference, Report, Warning};
use crate::{DepthLimitError, DiffOptions, JsonPath, Node};

/// Compares arrays element by element from the old side.
///
/// Objects are paired with new objects through the mapping rule for `path`,
/// scalars are looked up by value anywhere in the new array, and nested
/// arrays are skipped with a warning.
pub(super) fn diff_lists(
    lhs: &[Node],
    rhs: &[Node],
    path: &JsonPath,
    depth: usize,
    options: &DiffOptions,
) -> Result<Report, DepthLimitError> {
    let mut report = Report::default();

    for (index, item) in lhs.iter().enumerate() {
        match item {
            Node::Object(_) => {
                let Some(key) = options.mapping_for(path) else {
                    report.push_warning(Warning::MissingMapping { path: path.clone() });
                    continue;
                };
                report.extend(diff_mapped(item, index, key, rhs, path, depth, options)?);
            }
            Node::Array(_) => {
                report.push_warning(Warning::NestedArray { path: path.clone() });
            }
            scalar => {
                if rhs.contains(scalar) {
                    continue;
                }
                // Ignore rules apply to the array path, not to its slots.
                report.push_difference(Difference::missing_element(path.child_index(index), scalar));
            }
        }
    }

    Ok(report)
}

/// Compares one old object with every new object sharing its key value.
fn diff_mapped(
    item: &Node,
    index: usize,
    key: &str,
    rhs: &[Node],
    path: &JsonPath,
    depth: usize,
    options: &DiffOptions,
) -> Result<Report, DepthLimitError> {
    let mut report = Report::default();
    let Node::Object(fields) = item else {
        return Ok(report);
    };
    let Some(id) = fields.get(key) else {
        report.push_warning(Warning::OldKeyMissing { path: path.clone(), key: key.to_owned() });
        return Ok(report);
    };

    let item_path = path.child_index(index);
    for candidate in rhs {
        let Node::Object(other) = candidate else {
            continue;
        };
        match other.get(key) {
            Some(other_id) if other_id == id => {
                report.extend(diff_impl(Some(item), Some(candidate), &item_path, depth + 1, options)?);
            }
            Some(_) => {}
            None => {
                report.push_warning(Warning::NewKeyMissing {
                    path: path.clone(),
                    key: key.to_owned(),
                });
            }
        }
    }

    Ok(report)
}

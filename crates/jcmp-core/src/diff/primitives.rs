use super::{Difference, Report};
use crate::{DiffOptions, JsonPath, Node};

/// Compares two scalars of the same kind, honoring comparator ignore rules.
pub(super) fn diff_primitives(
    lhs: &Node,
    rhs: &Node,
    path: &JsonPath,
    options: &DiffOptions,
) -> Report {
    if lhs == rhs || options.ignores_change(path, lhs, rhs) {
        return Report::default();
    }
    Report::single(Difference::of_values(path.clone(), lhs, rhs))
}

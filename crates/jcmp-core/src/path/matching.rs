use super::{Connector, Segment, Selector};

/// Compares `pattern` against `target` segment by segment.
///
/// When the head segments do not agree, a `..` head on the pattern side may
/// skip one level of `target` and try again; a `...` head does so whenever
/// the direct attempt did not succeed.
pub(super) fn segments_match(pattern: &[Segment], target: &[Segment]) -> bool {
    let (Some((head, rest)), Some((target_head, target_rest))) =
        (pattern.split_first(), target.split_first())
    else {
        return pattern.is_empty() && target.is_empty();
    };

    let direct = selector_accepts(head.selector(), target_head.selector())
        .then(|| segments_match(rest, target_rest));

    let retry = match head.connector() {
        Connector::Child => false,
        Connector::Search => direct.is_none(),
        Connector::DeepSearch => direct != Some(true),
    };
    if retry {
        segments_match(pattern, target_rest)
    } else {
        direct.unwrap_or(false)
    }
}

fn selector_accepts(pattern: &Selector, target: &Selector) -> bool {
    match (pattern, target) {
        (Selector::Index(a), Selector::Index(b)) => a == b,
        (Selector::AnyIndex, Selector::Index(_) | Selector::AnyIndex) => true,
        (Selector::Key(a), Selector::Key(b)) => a == b,
        (Selector::Regex(pattern), Selector::Key(key)) => pattern.is_full_match(key),
        (Selector::Regex(a), Selector::Regex(b)) => a.source() == b.source(),
        _ => false,
    }
}

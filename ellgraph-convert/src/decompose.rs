//! Decomposition of elided spans into constituent spans.

use std::collections::BTreeSet;

/// Find a minimum partition of `target` into candidate spans.
///
/// `candidates` are `(node, span)` pairs in source order. Only partitions
/// with at least two and fewer than `max_parts` parts are considered. The
/// search deepens the number of parts one at a time and always covers the
/// leftmost uncovered terminal next, trying candidates in source order, so
/// the first partition found is minimal and ties are broken by source
/// order. With `c` candidates the search visits at most `c^(max_parts - 1)`
/// partial partitions.
///
/// Returns the nodes of the partition in source order.
pub(crate) fn min_partition(
    target: &BTreeSet<usize>,
    candidates: &[(usize, &BTreeSet<usize>)],
    max_parts: usize,
) -> Option<Vec<usize>> {
    // Spans that are not strictly contained in the target can never be part
    // of a partition, and of equal spans only the first needs to be tried.
    let mut usable: Vec<(usize, &BTreeSet<usize>)> = Vec::new();
    for &(node, span) in candidates {
        if span.is_empty() || span.len() >= target.len() || !span.is_subset(target) {
            continue;
        }

        if usable.iter().all(|(_, seen)| *seen != span) {
            usable.push((node, span));
        }
    }

    for n_parts in 2..max_parts {
        let mut parts = Vec::with_capacity(n_parts);
        if cover(target.clone(), &usable, n_parts, &mut parts) {
            parts.sort_unstable();
            return Some(parts);
        }
    }

    None
}

fn cover(
    remaining: BTreeSet<usize>,
    candidates: &[(usize, &BTreeSet<usize>)],
    n_parts: usize,
    parts: &mut Vec<usize>,
) -> bool {
    let first = match remaining.iter().next() {
        Some(&first) => first,
        None => return true,
    };

    if parts.len() == n_parts {
        return false;
    }

    for &(node, span) in candidates {
        if !span.contains(&first) || !span.is_subset(&remaining) {
            continue;
        }

        parts.push(node);
        if cover(&remaining - span, candidates, n_parts, parts) {
            return true;
        }
        parts.pop();
    }

    false
}

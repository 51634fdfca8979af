//! List splitting for free-text code fields.
//!
//! Source fields mix `,` and `;` as list separators, sometimes nested inside
//! each other. Splitting runs over an explicit work list instead of
//! recursion, and every segment is visited at most once, so malformed input
//! cannot make it loop or grow the stack.

use std::collections::HashSet;

/// Separators shared by every code kind.
pub const LIST_SEPARATORS: &[&str] = &[",", ";"];

/// Split `raw` on any of `separators` until no segment contains one.
///
/// Returns trimmed, non-empty leaf segments in input order. Repeated
/// segments are returned once.
pub fn split_segments(raw: &str, separators: &[&str]) -> Vec<String> {
    let mut pending = vec![raw.to_string()];
    let mut visited: HashSet<String> = HashSet::new();
    let mut leaves = Vec::new();

    while let Some(segment) = pending.pop() {
        let segment = segment.trim();
        if segment.is_empty() || !visited.insert(segment.to_string()) {
            continue;
        }
        match separators
            .iter()
            .find(|separator| !separator.is_empty() && segment.contains(*separator))
        {
            Some(separator) => {
                // Reversed so the stack pops parts in their original order.
                let parts: Vec<&str> = segment.split(*separator).collect();
                pending.extend(parts.into_iter().rev().map(str::to_string));
            }
            None => leaves.push(segment.to_string()),
        }
    }
    leaves
}

//! Comma-joined multi-valued cells.
//!
//! Multi-valued textual fields are persisted as sorted, unique tokens joined
//! by `,` so that repeated merges never duplicate a value and diffs between
//! runs stay reproducible.

use std::collections::BTreeSet;

/// Split a comma-joined cell into its unique, trimmed, non-empty tokens.
pub fn split_tokens(cell: &str) -> BTreeSet<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join tokens into a sorted, unique, comma-joined cell.
pub fn join_tokens<I, S>(tokens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique: BTreeSet<String> = tokens
        .into_iter()
        .map(|token| token.as_ref().trim().to_string())
        .filter(|token| !token.is_empty())
        .collect();
    unique.into_iter().collect::<Vec<_>>().join(",")
}

/// Union an existing comma-joined cell with new tokens.
pub fn union_tokens<I, S>(cell: &str, additions: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tokens = split_tokens(cell);
    for token in additions {
        let token = token.as_ref().trim();
        if !token.is_empty() {
            tokens.insert(token.to_string());
        }
    }
    join_tokens(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_does_not_duplicate() {
        assert_eq!(union_tokens("A,B", ["B"]), "A,B");
    }

    #[test]
    fn union_keeps_sorted_order() {
        assert_eq!(union_tokens("A,B", ["C"]), "A,B,C");
        assert_eq!(union_tokens("C,A", ["B"]), "A,B,C");
    }

    #[test]
    fn blank_cells_and_tokens_are_dropped() {
        assert_eq!(union_tokens("", ["", " X "]), "X");
        assert!(split_tokens(" , ,").is_empty());
    }
}

//! Deduplicated identifier sets.

use std::collections::BTreeSet;

/// Set of content identifiers in canonical (lexicographic) order
pub type ReferenceSet = BTreeSet<String>;

/// Deduplicate identifiers into canonical order
pub fn dedup_ids<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ids.into_iter()
        .map(Into::into)
        .collect::<ReferenceSet>()
        .into_iter()
        .collect()
}

//! Provider interleaving and coordinate deduplication.
//!
//! Results are taken alternately, one from the primary provider then one
//! from the secondary, each dropped if its ~100 m cell has already been
//! emitted. The primary goes first in every round, so at a shared location
//! the primary's entry is the one kept.

use std::collections::HashSet;

use crate::types::SearchResult;

/// Interleave two ranked lists, deduplicate by [`crate::types::DedupKey`],
/// and stop at `cap` entries.
pub fn merge_interleaved(
    primary: &[SearchResult],
    secondary: &[SearchResult],
    cap: usize,
) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(cap.min(primary.len() + secondary.len()));
    let mut a = primary.iter();
    let mut b = secondary.iter();

    while merged.len() < cap && (a.len() > 0 || b.len() > 0) {
        if let Some(result) = a.next() {
            if seen.insert(result.dedup_key()) {
                merged.push(result.clone());
            }
        }
        if merged.len() < cap {
            if let Some(result) = b.next() {
                if seen.insert(result.dedup_key()) {
                    merged.push(result.clone());
                }
            }
        }
    }

    merged
}

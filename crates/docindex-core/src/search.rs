//! Top-k ranking over stored index entries.
//!
//! Brute-force cosine similarity against every stored vector. Results are
//! ordered by descending similarity; equal scores keep insertion order
//! (smaller `seq` first), so repeated queries over an unchanged index
//! return identical lists.

use std::cmp::Ordering;

use crate::embedding::cosine_similarity;
use crate::models::{IndexEntry, QueryHit};

/// Score every entry against `query_vec` and keep the best `k`.
///
/// Returns all entries when fewer than `k` exist, and nothing for `k == 0`.
pub fn rank_entries(query_vec: &[f32], entries: &[IndexEntry], k: usize) -> Vec<QueryHit> {
    if k == 0 {
        return Vec::new();
    }

    let mut hits: Vec<QueryHit> = entries
        .iter()
        .map(|e| QueryHit {
            seq: e.seq,
            text: e.text.clone(),
            provenance: e.provenance.clone(),
            score: cosine_similarity(query_vec, &e.vector),
        })
        .collect();

    hits.sort_by(compare_hits);
    hits.truncate(k);
    hits
}

fn compare_hits(a: &QueryHit, b: &QueryHit) -> Ordering {
    b.score.total_cmp(&a.score).then(a.seq.cmp(&b.seq))
}

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::info;

use crate::constants::oracle::{LEXICAL_DIMENSIONS, TOKEN_HASH_SEED};
use crate::corpus::Corpus;
use crate::data::Award;
use crate::hash::stable_hash_str;
use crate::oracle::{Neighbor, OracleOutcome, SimilarityOracle};
use crate::types::ProjectId;
use crate::utils::tokens;

/// Sparse L2-normalized term-frequency vector, sorted by dimension.
type SparseVector = Vec<(u32, f32)>;

/// Indexed entry: record handle, label, and its vector.
struct LexicalEntry {
    id: ProjectId,
    award: Award,
    vector: SparseVector,
}

/// In-process oracle ranking descriptions by cosine similarity of hashed
/// term frequencies.
///
/// The index contains every corpus record, including whatever record a query
/// text came from, so callers see their own anchor as the top hit.
pub struct LexicalOracle {
    entries: Vec<LexicalEntry>,
}

impl LexicalOracle {
    /// Index every record of `corpus`.
    pub fn build(corpus: &Corpus) -> Self {
        let entries: Vec<LexicalEntry> = corpus
            .records()
            .iter()
            .map(|record| LexicalEntry {
                id: record.id.clone(),
                award: record.award,
                vector: embed(&record.description),
            })
            .collect();
        info!(
            "[triplets:oracle] lexical index built over {} record(s)",
            entries.len()
        );
        Self { entries }
    }

    /// Indexed records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SimilarityOracle for LexicalOracle {
    fn query(&self, text: &str, k: usize, label: Award) -> OracleOutcome {
        let query = embed(text);
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.award == label)
            .map(|(idx, entry)| (idx, dot(&query, &entry.vector)))
            .collect();
        // Stable sort keeps corpus order among equal scores.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        OracleOutcome::Found(
            scored
                .into_iter()
                .map(|(idx, score)| Neighbor {
                    id: self.entries[idx].id.clone(),
                    score,
                })
                .collect(),
        )
    }
}

fn embed(text: &str) -> SparseVector {
    let mut counts: BTreeMap<u32, f32> = BTreeMap::new();
    for token in tokens(text) {
        let dim = (stable_hash_str(TOKEN_HASH_SEED, &token) % LEXICAL_DIMENSIONS as u64) as u32;
        *counts.entry(dim).or_insert(0.0) += 1.0;
    }
    let norm = counts.values().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return Vec::new();
    }
    counts.into_iter().map(|(dim, v)| (dim, v / norm)).collect()
}

/// Dot product of two sorted sparse vectors (cosine, since both are unit length).
fn dot(a: &[(u32, f32)], b: &[(u32, f32)]) -> f32 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

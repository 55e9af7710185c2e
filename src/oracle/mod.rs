//! Similarity oracle interfaces.
//!
//! Ownership model:
//! - `SimilarityOracle` is the sampler-facing k-NN interface; it is always a
//!   constructor argument, never ambient state.
//! - `CachedOracle` wraps any oracle with an explicit bounded `QueryCache`.
//! - `LexicalOracle` is an in-process reference implementation over a corpus.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::Award;
use crate::types::ProjectId;

/// Bounded query cache and caching oracle wrapper.
pub mod cache;
/// Hashed term-frequency cosine oracle.
pub mod lexical;

pub use cache::{CacheStats, CachedOracle, QueryCache};
pub use lexical::LexicalOracle;

/// One oracle hit: a record handle and its similarity score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Handle resolved through `Corpus::get`.
    pub id: ProjectId,
    /// Similarity score; higher is closer.
    pub score: f32,
}

/// Result of a single oracle query.
#[derive(Clone, Debug, PartialEq)]
pub enum OracleOutcome {
    /// Hits ranked by descending similarity; may be empty.
    Found(Vec<Neighbor>),
    /// The oracle could not answer (network, timeout, service error).
    Unavailable(String),
}

impl OracleOutcome {
    /// Hits, or an empty slice when the oracle was unavailable.
    pub fn neighbors(&self) -> &[Neighbor] {
        match self {
            OracleOutcome::Found(neighbors) => neighbors,
            OracleOutcome::Unavailable(_) => &[],
        }
    }
}

/// Black-box nearest-neighbor search over project descriptions.
///
/// Implementations return at most `k` hits restricted to records whose award
/// equals `label`, ranked by descending similarity to `text`. For fixed
/// inputs the outcome should be deterministic.
pub trait SimilarityOracle: Send + Sync {
    /// Up to `k` records labeled `label` most similar to `text`.
    fn query(&self, text: &str, k: usize, label: Award) -> OracleOutcome;
}

impl<O: SimilarityOracle + ?Sized> SimilarityOracle for Arc<O> {
    fn query(&self, text: &str, k: usize, label: Award) -> OracleOutcome {
        (**self).query(text, k, label)
    }
}

impl<O: SimilarityOracle + ?Sized> SimilarityOracle for Box<O> {
    fn query(&self, text: &str, k: usize, label: Award) -> OracleOutcome {
        (**self).query(text, k, label)
    }
}

/// Oracle that never finds anything, forcing uniform fallback draws.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullOracle;

impl SimilarityOracle for NullOracle {
    fn query(&self, _text: &str, _k: usize, _label: Award) -> OracleOutcome {
        OracleOutcome::Found(Vec::new())
    }
}

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::DatasetConfig;
use crate::corpus::Corpus;
use crate::data::Triplet;
use crate::errors::SamplerError;
use crate::metrics::category_shares;
use crate::oracle::{CacheStats, SimilarityOracle};
use crate::sampler::TripletSampler;

/// Logical dataset partitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitLabel {
    /// Training split.
    Train,
    /// Validation split.
    Validation,
    /// Test split.
    Test,
}

impl SplitLabel {
    /// Canonical generation and persistence order.
    pub const ALL: [SplitLabel; 3] = [SplitLabel::Train, SplitLabel::Validation, SplitLabel::Test];

    /// Lowercase name, also the output file stem.
    pub fn as_str(self) -> &'static str {
        match self {
            SplitLabel::Train => "train",
            SplitLabel::Validation => "validation",
            SplitLabel::Test => "test",
        }
    }
}

/// Generated triplets for all three splits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DatasetSplits {
    /// Training triplets.
    pub train: Vec<Triplet>,
    /// Validation triplets.
    pub validation: Vec<Triplet>,
    /// Test triplets.
    pub test: Vec<Triplet>,
}

impl DatasetSplits {
    /// Triplets of one split.
    pub fn get(&self, label: SplitLabel) -> &[Triplet] {
        match label {
            SplitLabel::Train => &self.train,
            SplitLabel::Validation => &self.validation,
            SplitLabel::Test => &self.test,
        }
    }

    fn set(&mut self, label: SplitLabel, triplets: Vec<Triplet>) {
        match label {
            SplitLabel::Train => self.train = triplets,
            SplitLabel::Validation => self.validation = triplets,
            SplitLabel::Test => self.test = triplets,
        }
    }

    /// Total triplets across splits.
    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    /// True when no split holds a triplet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Persistence backend for finished datasets.
pub trait DatasetWriter {
    /// Persist all splits. Implementations must not leave partial output on error.
    fn write(&self, splits: &DatasetSplits) -> Result<(), SamplerError>;
}

/// How splits are generated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GenerationMode {
    /// One seeded RNG stream shared by all splits, in `SplitLabel::ALL` order.
    #[default]
    Sequential,
    /// Per-triplet RNG streams on a rayon pool.
    Parallel,
}

/// Result of `build_dataset`.
#[derive(Clone, Debug)]
pub struct DatasetBuild {
    /// Generated triplets.
    pub splits: DatasetSplits,
    /// Oracle query-cache counters after all splits were generated.
    pub cache: CacheStats,
}

/// Generate train, validation, and test triplets with one sampler.
///
/// The configuration and corpus are validated before any triplet is drawn;
/// a failure in any split aborts the whole dataset.
pub fn build_dataset(
    corpus: Arc<Corpus>,
    oracle: Arc<dyn SimilarityOracle>,
    config: &DatasetConfig,
    mode: GenerationMode,
) -> Result<DatasetBuild, SamplerError> {
    config.validate()?;
    let sampler = TripletSampler::new(corpus, oracle, config.sampler.clone())?;
    let mut splits = DatasetSplits::default();
    for label in SplitLabel::ALL {
        let count = config.count_for(label);
        info!(
            "[triplets:splits] generating {count} {} triplet(s) ({mode:?})",
            label.as_str()
        );
        let triplets = match mode {
            GenerationMode::Sequential => sampler.generate(count)?,
            GenerationMode::Parallel => sampler.generate_parallel(label.as_str(), count)?,
        };
        if let Some(shares) = category_shares(&triplets) {
            info!("[triplets:splits] {} categories: {shares}", label.as_str());
        }
        splits.set(label, triplets);
    }
    Ok(DatasetBuild {
        splits,
        cache: sampler.cache_stats(),
    })
}

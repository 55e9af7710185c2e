#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runners backing the bundled binaries.
pub mod apps;
/// Sampling and dataset configuration types.
pub mod config;
/// Centralized constants used across sampler, splits, and sources.
pub mod constants;
/// Award-partitioned project corpus.
pub mod corpus;
/// Project records, award labels, and triplets.
pub mod data;
mod hash;
/// Anchor-category distribution helpers.
pub mod metrics;
/// Similarity oracles and the query cache.
pub mod oracle;
/// Triplet sampler.
pub mod sampler;
/// Corpus loaders and award classification.
pub mod source;
/// Dataset splits, generation, and persistence traits.
pub mod splits;
/// Input and output transports (filesystem today).
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Text normalization helpers.
pub mod utils;

mod errors;

pub use config::{DatasetConfig, SamplerConfig};
pub use corpus::Corpus;
pub use data::{Award, Category, ProjectRecord, Triplet};
pub use errors::SamplerError;
pub use metrics::{CategoryShares, category_shares};
pub use oracle::{
    CacheStats, CachedOracle, LexicalOracle, Neighbor, NullOracle, OracleOutcome, QueryCache,
    SimilarityOracle,
};
pub use sampler::TripletSampler;
pub use source::{AwardMapping, InMemorySource, JsonlSource, ProjectSource, load_corpus};
pub use splits::{
    DatasetBuild, DatasetSplits, DatasetWriter, GenerationMode, SplitLabel, build_dataset,
};
pub use transport::fs::{FileStream, JsonlDatasetWriter, read_split};
pub use types::{Description, PrizeName, ProjectId, ProjectUrl};

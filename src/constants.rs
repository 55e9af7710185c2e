use crate::data::Category;

/// Constants used by sampler runtime behavior.
pub mod sampler {
    use super::Category;

    /// Anchor category weights, drawn once per triplet.
    pub const CATEGORY_WEIGHTS: [(Category, f64); 3] = [
        (Category::Winning, 0.34),
        (Category::Partial, 0.33),
        (Category::Losing, 0.33),
    ];
    /// Probability of the first entry of `Category::others` on a negative coin.
    pub const NEGATIVE_COIN_P: f64 = 0.5;
    /// Minimum distinct descriptions a partition needs for anchor-excluding draws.
    pub const MIN_PARTITION_RECORDS: usize = 2;
    /// Emit a progress line every this many generated triplets.
    pub const PROGRESS_LOG_EVERY: usize = 1000;
    /// Default RNG seed.
    pub const DEFAULT_SEED: u64 = 42;
    /// Default probability of taking the oracle branch.
    pub const DEFAULT_SIMILAR_RATIO: f64 = 0.7;
    /// Default neighbor count per oracle query.
    pub const DEFAULT_TOP_K: usize = 10;
    /// Default query-cache capacity (entries).
    pub const DEFAULT_CACHE_CAPACITY: usize = 100_000;
}

/// Constants used by dataset splits and persistence.
pub mod splits {
    /// Default training triplet count.
    pub const DEFAULT_NUM_TRAIN: usize = 15_000;
    /// Default validation triplet count.
    pub const DEFAULT_NUM_VAL: usize = 500;
    /// Default test triplet count.
    pub const DEFAULT_NUM_TEST: usize = 500;
    /// Extension of per-split output files.
    pub const SPLIT_FILE_EXTENSION: &str = "jsonl";
    /// Suffix for in-progress split files before they are renamed into place.
    pub const TEMP_FILE_SUFFIX: &str = "tmp";
}

/// Constants used by corpus loading.
pub mod source {
    /// Extension of corpus files picked up when loading a directory.
    pub const CORPUS_FILE_EXTENSION: &str = "jsonl";
    /// Award-mapping value for headline prizes.
    pub const BIG_WIN_LABEL: &str = "Big Win";
    /// Award-mapping value for track and sponsor prizes.
    pub const SMALL_WIN_LABEL: &str = "Small Win";
    /// Prefix for ids derived from description hashes.
    pub const DERIVED_ID_PREFIX: &str = "desc-";
}

/// Constants used by the in-process lexical oracle.
pub mod oracle {
    /// Width of hashed term-frequency vectors.
    pub const LEXICAL_DIMENSIONS: usize = 1 << 12;
    /// Tokens shorter than this are ignored.
    pub const MIN_TOKEN_CHARS: usize = 2;
    /// Seed for token hashing.
    pub const TOKEN_HASH_SEED: u64 = 0x7E57_0A11;
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::SamplerConfig;
use crate::constants::sampler::{CATEGORY_WEIGHTS, NEGATIVE_COIN_P, PROGRESS_LOG_EVERY};
use crate::corpus::Corpus;
use crate::data::{Award, Category, ProjectRecord, Triplet};
use crate::errors::SamplerError;
use crate::hash::stable_hash_indexed;
use crate::oracle::{CacheStats, CachedOracle, OracleOutcome, QueryCache, SimilarityOracle};

#[derive(Debug, Clone)]
/// Small deterministic RNG used for reproducible sampler behavior.
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64_internal(&mut self) -> u64 {
        let mut z = self.state.wrapping_add(0x9E3779B97F4A7C15);
        self.state = z;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }
}

impl RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64_internal() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u64_internal()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut offset = 0;
        while offset < dest.len() {
            let value = self.next_u64_internal();
            let bytes = value.to_le_bytes();
            let remaining = dest.len() - offset;
            let copy_len = remaining.min(bytes.len());
            dest[offset..offset + copy_len].copy_from_slice(&bytes[..copy_len]);
            offset += copy_len;
        }
    }
}

/// Award-aware triplet sampler.
///
/// Every triplet consumes random draws in this fixed order:
///
/// 1. anchor category (weighted `winning 0.34 / partial 0.33 / losing 0.33`)
/// 2. anchor record (uniform within the category)
/// 3. positive branch coin (`u < similar_ratio` queries the oracle)
/// 4. positive pick (uniform among oracle survivors, else uniform fallback)
/// 5. negative fallback-pool coin (one of the two other categories)
/// 6. negative oracle-filter coin (independent of step 5)
/// 7. negative branch coin (`u < similar_ratio` queries the oracle)
/// 8. negative pick (uniform among oracle survivors, else uniform fallback)
///
/// Changing this order changes the output for a given seed.
pub struct TripletSampler {
    corpus: Arc<Corpus>,
    oracle: CachedOracle<Arc<dyn SimilarityOracle>>,
    config: SamplerConfig,
    /// Stream consumed by sequential generation; shared across calls.
    rng: Mutex<DeterministicRng>,
}

impl TripletSampler {
    /// Create a sampler with its own query cache of `config.cache_capacity` entries.
    pub fn new(
        corpus: Arc<Corpus>,
        oracle: Arc<dyn SimilarityOracle>,
        config: SamplerConfig,
    ) -> Result<Self, SamplerError> {
        let cache = QueryCache::new(config.cache_capacity);
        Self::with_cache(corpus, oracle, config, cache)
    }

    /// Create a sampler backed by an existing (possibly shared) query cache.
    ///
    /// Fails with `Configuration` or `EmptyPartition` before anything is drawn.
    pub fn with_cache(
        corpus: Arc<Corpus>,
        oracle: Arc<dyn SimilarityOracle>,
        config: SamplerConfig,
        cache: QueryCache,
    ) -> Result<Self, SamplerError> {
        config.validate()?;
        corpus.ensure_sampleable()?;
        let [winning, partial, losing] = corpus.counts();
        info!(
            "[triplets:sampler] corpus ready: {}={} {}={} {}={} (seed={}, similar_ratio={}, top_k={})",
            winning.0,
            winning.1,
            partial.0,
            partial.1,
            losing.0,
            losing.1,
            config.seed,
            config.similar_ratio,
            config.top_k
        );
        Ok(Self {
            rng: Mutex::new(DeterministicRng::new(config.seed)),
            oracle: CachedOracle::new(oracle, cache),
            corpus,
            config,
        })
    }

    /// Validated sampler settings.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Corpus being sampled.
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Query cache backing oracle lookups.
    pub fn cache(&self) -> &QueryCache {
        self.oracle.cache()
    }

    /// Current query-cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.oracle.cache().stats()
    }

    /// Generate exactly `num_samples` triplets from the sampler's seeded stream.
    ///
    /// Consecutive calls continue the same stream, so generating train,
    /// validation, and test in order is reproducible for a fixed seed.
    pub fn generate(&self, num_samples: usize) -> Result<Vec<Triplet>, SamplerError> {
        ensure_positive(num_samples)?;
        let mut rng = self.rng.lock().expect("sampler rng poisoned");
        let mut triplets = Vec::with_capacity(num_samples);
        for done in 1..=num_samples {
            triplets.push(self.sample_triplet(&mut *rng)?);
            log_progress(done, num_samples);
        }
        Ok(triplets)
    }

    /// Generate exactly `num_samples` triplets on a rayon pool.
    ///
    /// Triplet `i` draws from its own stream seeded by `(seed, stream, i)`, so
    /// the result does not depend on worker count or scheduling. It differs
    /// from `generate` for the same seed.
    pub fn generate_parallel(
        &self,
        stream: &str,
        num_samples: usize,
    ) -> Result<Vec<Triplet>, SamplerError> {
        ensure_positive(num_samples)?;
        let completed = AtomicUsize::new(0);
        let run = || {
            (0..num_samples)
                .into_par_iter()
                .map(|idx| {
                    let seed = stable_hash_indexed(self.config.seed, stream, idx as u64);
                    let mut rng = DeterministicRng::new(seed);
                    let triplet = self.sample_triplet(&mut rng)?;
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    log_progress(done, num_samples);
                    Ok::<_, SamplerError>(triplet)
                })
                .collect::<Result<Vec<_>, SamplerError>>()
        };
        if self.config.workers == 0 {
            return run();
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .map_err(|err| {
                SamplerError::Configuration(format!("failed to build worker pool: {err}"))
            })?;
        pool.install(run)
    }

    fn sample_triplet<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Triplet, SamplerError> {
        let category = CATEGORY_WEIGHTS
            .choose_weighted(rng, |(_, weight)| *weight)
            .map(|(category, _)| *category)
            .map_err(|err| SamplerError::Configuration(format!("category weights: {err}")))?;
        let anchor_idx = *self.corpus.partition(category).choose(rng).ok_or(
            SamplerError::EmptyPartition {
                category,
                available: 0,
                required: 1,
            },
        )?;
        let anchor = self.corpus.record(anchor_idx);

        let positive_similar = rng.random::<f64>() < self.config.similar_ratio;
        let positive_idx = self.pick(rng, anchor, category, category, positive_similar)?;

        let others = category.others();
        let negative_pool = coin(rng, others);
        let negative_filter = coin(rng, others);
        let negative_similar = rng.random::<f64>() < self.config.similar_ratio;
        let negative_idx =
            self.pick(rng, anchor, negative_filter, negative_pool, negative_similar)?;

        Ok(Triplet {
            anchor: anchor.description.clone(),
            positive: self.corpus.record(positive_idx).description.clone(),
            negative: self.corpus.record(negative_idx).description.clone(),
            category,
        })
    }

    /// Pick a record index: oracle survivors for `filter` when `similar`,
    /// otherwise (or when none survive) uniform from `fallback` minus the anchor.
    fn pick<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        anchor: &ProjectRecord,
        filter: Category,
        fallback: Category,
        similar: bool,
    ) -> Result<usize, SamplerError> {
        if similar {
            let candidates = self.similar_candidates(anchor, filter.award());
            if let Some(idx) = candidates.choose(rng) {
                return Ok(*idx);
            }
        }
        self.corpus
            .partition_excluding(fallback, &anchor.description)
            .choose(rng)
            .copied()
            .ok_or(SamplerError::EmptyPartition {
                category: fallback,
                available: 0,
                required: 1,
            })
    }

    /// Oracle hits for `label`, resolved to corpus indices, minus the anchor itself.
    fn similar_candidates(&self, anchor: &ProjectRecord, label: Award) -> Vec<usize> {
        match self
            .oracle
            .query(&anchor.description, self.config.top_k, label)
        {
            OracleOutcome::Found(neighbors) => neighbors
                .iter()
                .filter_map(|neighbor| {
                    let resolved = self.corpus.index_of(&neighbor.id);
                    if resolved.is_none() {
                        debug!(
                            "[triplets:sampler] oracle returned unknown handle '{}'",
                            neighbor.id
                        );
                    }
                    resolved
                })
                .filter(|idx| {
                    let record = self.corpus.record(*idx);
                    record.award == label && !record.same_project(anchor)
                })
                .collect(),
            OracleOutcome::Unavailable(reason) => {
                warn!(
                    "[triplets:sampler] oracle unavailable for '{label}' query, using uniform fallback: {reason}"
                );
                Vec::new()
            }
        }
    }
}

/// Fair coin between the two entries of `options`.
fn coin<R: Rng + ?Sized>(rng: &mut R, options: [Category; 2]) -> Category {
    if rng.random::<f64>() < NEGATIVE_COIN_P {
        options[0]
    } else {
        options[1]
    }
}

fn ensure_positive(num_samples: usize) -> Result<(), SamplerError> {
    if num_samples == 0 {
        return Err(SamplerError::Configuration(
            "number of triplets must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn log_progress(done: usize, total: usize) {
    if done % PROGRESS_LOG_EVERY == 0 || done == total {
        info!("[triplets:sampler] generated {done}/{total} triplet(s)");
    }
}

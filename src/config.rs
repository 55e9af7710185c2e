use crate::constants::sampler::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_SEED, DEFAULT_SIMILAR_RATIO, DEFAULT_TOP_K,
};
use crate::constants::splits::{DEFAULT_NUM_TEST, DEFAULT_NUM_TRAIN, DEFAULT_NUM_VAL};
use crate::errors::SamplerError;
use crate::splits::SplitLabel;

/// Triplet sampler configuration.
#[derive(Clone, Debug)]
pub struct SamplerConfig {
    /// RNG seed that controls deterministic sampling order.
    pub seed: u64,
    /// Probability (0.0–1.0) of querying the oracle for a positive or negative
    /// instead of drawing uniformly from the partition.
    pub similar_ratio: f64,
    /// Neighbors requested per oracle query.
    pub top_k: usize,
    /// Max `(query, label)` entries kept in the oracle query cache (0 disables it).
    pub cache_capacity: usize,
    /// Worker threads for parallel generation; 0 uses the rayon default.
    pub workers: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            similar_ratio: DEFAULT_SIMILAR_RATIO,
            top_k: DEFAULT_TOP_K,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            workers: 0,
        }
    }
}

impl SamplerConfig {
    /// Reject values the sampler cannot run with.
    pub fn validate(&self) -> Result<(), SamplerError> {
        if !(0.0..=1.0).contains(&self.similar_ratio) {
            return Err(SamplerError::Configuration(format!(
                "similar_ratio must be within [0, 1], got {}",
                self.similar_ratio
            )));
        }
        if self.top_k == 0 {
            return Err(SamplerError::Configuration(
                "top_k must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Target triplet counts for the three dataset splits plus sampler settings.
#[derive(Clone, Debug)]
pub struct DatasetConfig {
    /// Training triplets to generate.
    pub num_train: usize,
    /// Validation triplets to generate.
    pub num_val: usize,
    /// Test triplets to generate.
    pub num_test: usize,
    /// Settings shared by every split.
    pub sampler: SamplerConfig,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            num_train: DEFAULT_NUM_TRAIN,
            num_val: DEFAULT_NUM_VAL,
            num_test: DEFAULT_NUM_TEST,
            sampler: SamplerConfig::default(),
        }
    }
}

impl DatasetConfig {
    /// Target count for `split`.
    pub fn count_for(&self, split: SplitLabel) -> usize {
        match split {
            SplitLabel::Train => self.num_train,
            SplitLabel::Validation => self.num_val,
            SplitLabel::Test => self.num_test,
        }
    }

    /// Validate counts and sampler settings before any generation starts.
    pub fn validate(&self) -> Result<(), SamplerError> {
        for split in SplitLabel::ALL {
            if self.count_for(split) == 0 {
                return Err(SamplerError::Configuration(format!(
                    "{} triplet count must be greater than zero",
                    split.as_str()
                )));
            }
        }
        self.sampler.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        DatasetConfig::default().validate().unwrap();
    }

    #[test]
    fn similar_ratio_outside_unit_interval_is_rejected() {
        for ratio in [-0.1, 1.01, f64::NAN] {
            let config = SamplerConfig {
                similar_ratio: ratio,
                ..SamplerConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(SamplerError::Configuration(_))
            ));
        }
    }

    #[test]
    fn ratio_bounds_are_inclusive() {
        for ratio in [0.0, 1.0] {
            let config = SamplerConfig {
                similar_ratio: ratio,
                ..SamplerConfig::default()
            };
            config.validate().unwrap();
        }
    }

    #[test]
    fn zero_split_count_is_rejected() {
        let config = DatasetConfig {
            num_val: 0,
            ..DatasetConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("validation"));
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let config = SamplerConfig {
            top_k: 0,
            ..SamplerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

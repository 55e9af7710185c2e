//! In-memory labeled corpus partitioned by award.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::constants::sampler::MIN_PARTITION_RECORDS;
use crate::data::{Category, ProjectRecord};
use crate::errors::SamplerError;
use crate::types::ProjectId;

/// Read-only project corpus with per-category partitions and an id lookup.
#[derive(Clone, Debug, Default)]
pub struct Corpus {
    records: Vec<ProjectRecord>,
    /// Record indices per category, in corpus order.
    winning: Vec<usize>,
    partial: Vec<usize>,
    losing: Vec<usize>,
    by_id: HashMap<ProjectId, usize>,
}

impl Corpus {
    /// Build a corpus from loaded records. The first record wins on duplicate ids.
    pub fn new(records: Vec<ProjectRecord>) -> Self {
        let mut corpus = Self {
            records,
            ..Self::default()
        };
        for (idx, record) in corpus.records.iter().enumerate() {
            match record.award.category() {
                Category::Winning => corpus.winning.push(idx),
                Category::Partial => corpus.partial.push(idx),
                Category::Losing => corpus.losing.push(idx),
            }
            if corpus.by_id.contains_key(&record.id) {
                debug!("[triplets:corpus] duplicate id '{}' ignored for lookup", record.id);
                continue;
            }
            corpus.by_id.insert(record.id.clone(), idx);
        }
        corpus
    }

    /// All records in load order.
    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the corpus holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at corpus index `idx`.
    pub fn record(&self, idx: usize) -> &ProjectRecord {
        &self.records[idx]
    }

    /// Resolve an oracle handle to its record.
    pub fn get(&self, id: &str) -> Option<&ProjectRecord> {
        self.index_of(id).map(|idx| &self.records[idx])
    }

    /// Corpus index for an oracle handle.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Corpus indices of the records in `category`'s partition.
    pub fn partition(&self, category: Category) -> &[usize] {
        match category {
            Category::Winning => &self.winning,
            Category::Partial => &self.partial,
            Category::Losing => &self.losing,
        }
    }

    /// Partition indices whose description differs from `description`.
    pub fn partition_excluding(&self, category: Category, description: &str) -> Vec<usize> {
        self.partition(category)
            .iter()
            .copied()
            .filter(|idx| self.records[*idx].description != description)
            .collect()
    }

    /// Record count per category, in `Category::ALL` order.
    pub fn counts(&self) -> [(Category, usize); 3] {
        Category::ALL.map(|category| (category, self.partition(category).len()))
    }

    /// Ensure every partition can serve anchor-excluding draws.
    ///
    /// Each partition needs at least two distinct descriptions, otherwise some
    /// anchor would have no eligible positive.
    pub fn ensure_sampleable(&self) -> Result<(), SamplerError> {
        for category in Category::ALL {
            let distinct: HashSet<&str> = self
                .partition(category)
                .iter()
                .map(|idx| self.records[*idx].description.as_str())
                .collect();
            if distinct.len() < MIN_PARTITION_RECORDS {
                return Err(SamplerError::EmptyPartition {
                    category,
                    available: distinct.len(),
                    required: MIN_PARTITION_RECORDS,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Award;

    fn record(id: &str, text: &str, award: Award) -> ProjectRecord {
        ProjectRecord::new(id, text, award)
    }

    fn sample_corpus() -> Corpus {
        Corpus::new(vec![
            record("w1", "W1", Award::Big),
            record("l1", "L1", Award::None),
            record("w2", "W2", Award::Big),
            record("p1", "P1", Award::Small),
            record("p2", "P2", Award::Small),
            record("l2", "L2", Award::None),
        ])
    }

    #[test]
    fn partitions_follow_award_in_corpus_order() {
        let corpus = sample_corpus();
        assert_eq!(corpus.partition(Category::Winning), &[0, 2]);
        assert_eq!(corpus.partition(Category::Partial), &[3, 4]);
        assert_eq!(corpus.partition(Category::Losing), &[1, 5]);
        assert_eq!(
            corpus.counts(),
            [
                (Category::Winning, 2),
                (Category::Partial, 2),
                (Category::Losing, 2)
            ]
        );
    }

    #[test]
    fn lookup_resolves_ids_and_keeps_first_duplicate() {
        let corpus = Corpus::new(vec![
            record("dup", "first", Award::Big),
            record("dup", "second", Award::Big),
        ]);
        assert_eq!(corpus.get("dup").unwrap().description, "first");
        assert!(corpus.get("missing").is_none());
    }

    #[test]
    fn exclusion_drops_every_record_with_equal_text() {
        let corpus = Corpus::new(vec![
            record("a", "same", Award::Big),
            record("b", "same", Award::Big),
            record("c", "other", Award::Big),
        ]);
        assert_eq!(corpus.partition_excluding(Category::Winning, "same"), vec![2]);
    }

    #[test]
    fn sampleable_requires_two_distinct_descriptions_per_partition() {
        sample_corpus().ensure_sampleable().unwrap();

        let corpus = Corpus::new(vec![
            record("w1", "W1", Award::Big),
            record("w2", "W1", Award::Big),
            record("p1", "P1", Award::Small),
            record("p2", "P2", Award::Small),
            record("l1", "L1", Award::None),
            record("l2", "L2", Award::None),
        ]);
        match corpus.ensure_sampleable() {
            Err(SamplerError::EmptyPartition {
                category,
                available,
                required,
            }) => {
                assert_eq!(category, Category::Winning);
                assert_eq!(available, 1);
                assert_eq!(required, 2);
            }
            other => panic!("expected EmptyPartition, got {other:?}"),
        }
    }

    #[test]
    fn empty_corpus_reports_first_category() {
        let err = Corpus::default().ensure_sampleable().unwrap_err();
        assert!(err.to_string().contains("winning"));
    }
}

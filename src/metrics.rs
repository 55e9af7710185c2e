use std::fmt;

use crate::data::{Category, Triplet};

/// Per-category share of a triplet set.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryShare {
    /// Anchor category.
    pub category: Category,
    /// Triplets anchored in `category`.
    pub count: usize,
    /// `count / total`.
    pub share: f64,
}

/// Anchor-category distribution of a triplet set.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryShares {
    /// Triplets counted.
    pub total: usize,
    /// One entry per category, in `Category::ALL` order.
    pub per_category: Vec<CategoryShare>,
}

impl CategoryShares {
    /// Observed share of `category` (0.0 if absent).
    pub fn share_of(&self, category: Category) -> f64 {
        self.per_category
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.share)
            .unwrap_or(0.0)
    }

    /// Largest absolute gap between observed and expected shares.
    pub fn max_deviation(&self, expected: &[(Category, f64)]) -> f64 {
        expected
            .iter()
            .map(|(category, weight)| (self.share_of(*category) - weight).abs())
            .fold(0.0, f64::max)
    }
}

impl fmt::Display for CategoryShares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.per_category {
            write!(f, "{}={:.3} ", entry.category, entry.share)?;
        }
        write!(f, "(n={})", self.total)
    }
}

/// Compute the anchor-category distribution; `None` for an empty set.
pub fn category_shares(triplets: &[Triplet]) -> Option<CategoryShares> {
    if triplets.is_empty() {
        return None;
    }
    let total = triplets.len();
    let per_category = Category::ALL
        .iter()
        .map(|category| {
            let count = triplets
                .iter()
                .filter(|triplet| triplet.category == *category)
                .count();
            CategoryShare {
                category: *category,
                count,
                share: count as f64 / total as f64,
            }
        })
        .collect();
    Some(CategoryShares {
        total,
        per_category,
    })
}

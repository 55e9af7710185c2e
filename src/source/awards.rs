use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::constants::source::{BIG_WIN_LABEL, SMALL_WIN_LABEL};
use crate::data::Award;
use crate::errors::SamplerError;
use crate::types::PrizeName;
use crate::utils::normalize_inline_whitespace;

/// Classification of a single prize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrizeClass {
    /// Overall winner, finalist, or any placement.
    BigWin,
    /// Track, sponsor, or technology prize.
    SmallWin,
}

impl PrizeClass {
    fn parse(label: &str) -> Option<Self> {
        match label {
            BIG_WIN_LABEL => Some(PrizeClass::BigWin),
            SMALL_WIN_LABEL => Some(PrizeClass::SmallWin),
            _ => None,
        }
    }
}

/// Prize-name → class table used to derive a project's award.
///
/// Prize names are compared after whitespace normalization.
#[derive(Clone, Debug, Default)]
pub struct AwardMapping {
    classes: HashMap<PrizeName, PrizeClass>,
}

impl AwardMapping {
    /// Build a mapping from `(prize name, class)` pairs.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, PrizeClass)>,
        S: AsRef<str>,
    {
        Self {
            classes: entries
                .into_iter()
                .map(|(name, class)| (normalize_inline_whitespace(name), class))
                .collect(),
        }
    }

    /// Load a JSON object of `{ "<prize>": "Big Win" | "Small Win" }`.
    pub fn from_path(path: &Path) -> Result<Self, SamplerError> {
        let raw: HashMap<PrizeName, String> = serde_json::from_str(&fs::read_to_string(path)?)?;
        let mut entries = Vec::with_capacity(raw.len());
        for (prize, label) in raw {
            let class = PrizeClass::parse(label.trim()).ok_or_else(|| {
                SamplerError::Configuration(format!(
                    "{}: prize '{prize}' has label '{label}', expected '{BIG_WIN_LABEL}' or '{SMALL_WIN_LABEL}'",
                    path.display()
                ))
            })?;
            entries.push((prize, class));
        }
        info!(
            "[triplets:source] loaded {} prize classification(s) from {}",
            entries.len(),
            path.display()
        );
        Ok(Self::new(entries))
    }

    /// Number of classified prizes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// True when no prize is classified.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Class of one prize. Unmapped prizes count as small wins.
    pub fn classify(&self, prize: &str) -> PrizeClass {
        let key = normalize_inline_whitespace(prize);
        match self.classes.get(&key) {
            Some(class) => *class,
            None => {
                warn!("[triplets:source] unmapped prize '{key}' treated as a small win");
                PrizeClass::SmallWin
            }
        }
    }

    /// `big` if any prize is a big win, `small` if any prize at all, else `none`.
    pub fn award_for<'a, I>(&self, prizes: I) -> Award
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut award = Award::None;
        for prize in prizes {
            match self.classify(prize) {
                PrizeClass::BigWin => return Award::Big,
                PrizeClass::SmallWin => award = Award::Small,
            }
        }
        award
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

pub use crate::types::{Description, ProjectId, ProjectUrl};

/// Award label attached to every project; partitions the corpus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Award {
    /// Overall winner, finalist, or placement prize.
    Big,
    /// Sponsor, track, or technology prize.
    Small,
    /// No prize.
    None,
}

impl Award {
    /// Label string used by oracle filters (`big`, `small`, `none`).
    pub fn as_str(self) -> &'static str {
        match self {
            Award::Big => "big",
            Award::Small => "small",
            Award::None => "none",
        }
    }

    /// Sampling category whose partition holds projects with this award.
    pub fn category(self) -> Category {
        match self {
            Award::Big => Category::Winning,
            Award::Small => Category::Partial,
            Award::None => Category::Losing,
        }
    }
}

impl fmt::Display for Award {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anchor category recorded on each triplet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Anchors drawn from `big` projects.
    Winning,
    /// Anchors drawn from `small` projects.
    Partial,
    /// Anchors drawn from `none` projects.
    Losing,
}

impl Category {
    /// All categories in weight-table order.
    pub const ALL: [Category; 3] = [Category::Winning, Category::Partial, Category::Losing];

    /// Lowercase name, as written to `anchor_status`.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Winning => "winning",
            Category::Partial => "partial",
            Category::Losing => "losing",
        }
    }

    /// Award label of the partition this category draws from.
    pub fn award(self) -> Award {
        match self {
            Category::Winning => Award::Big,
            Category::Partial => Award::Small,
            Category::Losing => Award::None,
        }
    }

    /// The two categories a negative may come from, in fixed coin order.
    ///
    /// The first entry is picked on a "heads" coin (`u < 0.5`).
    pub fn others(self) -> [Category; 2] {
        match self {
            Category::Winning => [Category::Losing, Category::Partial],
            Category::Partial => [Category::Winning, Category::Losing],
            Category::Losing => [Category::Winning, Category::Partial],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled hackathon project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Stable identifier; the handle oracles return for this record.
    pub id: ProjectId,
    /// Project page URL, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_url: Option<ProjectUrl>,
    /// Description text. Two records with equal text are the same project.
    pub description: Description,
    /// Award label.
    pub award: Award,
}

impl ProjectRecord {
    /// Record without a project URL.
    pub fn new(id: impl Into<ProjectId>, description: impl Into<Description>, award: Award) -> Self {
        Self {
            id: id.into(),
            project_url: None,
            description: description.into(),
            award,
        }
    }

    /// True when both records describe the same project.
    pub fn same_project(&self, other: &ProjectRecord) -> bool {
        self.description == other.description
    }
}

/// One contrastive training example.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triplet {
    /// Anchor description.
    pub anchor: Description,
    /// Same-category description.
    pub positive: Description,
    /// Description from another category.
    pub negative: Description,
    /// Category the anchor was drawn from.
    #[serde(rename = "anchor_status")]
    pub category: Category,
}

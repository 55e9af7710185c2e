use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::data::Category;
use crate::types::ProjectId;

/// Error type for configuration, corpus, and persistence failures.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// A category partition is too small to serve anchor-excluding draws.
    #[error(
        "category '{category}' has {available} usable record(s); at least {required} required"
    )]
    EmptyPartition {
        /// Category whose partition is too small.
        category: Category,
        /// Distinct descriptions available.
        available: usize,
        /// Distinct descriptions needed.
        required: usize,
    },
    /// Invalid settings, rejected before any triplet is drawn.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A corpus or split file line could not be used.
    #[error("malformed corpus input at {}:{line}: {reason}", path.display())]
    CorpusFormat {
        /// File containing the bad line.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Parser or validation message.
        reason: String,
    },
    /// Two loaded records share an id, so oracle handles would be ambiguous.
    #[error("duplicate project id '{id}' in source '{source_id}'")]
    DuplicateId {
        /// Source that produced the records.
        source_id: String,
        /// The repeated id.
        id: ProjectId,
    },
    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// JSON encoding or decoding failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelnotesError {
    #[error("not initialized: run 'relnotes init'")]
    NotInitialized,

    #[error("offset invariant violated: {0}")]
    OffsetInvariant(String),

    #[error("invalid range [{start}, {end}) for document ending at {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("release already present in document: {0}")]
    DuplicateRelease(String),

    #[error("document already holds published releases; replace is only for an empty document")]
    DocumentPopulated,

    #[error("unknown product line: {0}")]
    UnknownProductLine(String),

    #[error("product line '{product_line}' has already been decided ({status})")]
    AlreadyDecided {
        product_line: String,
        status: String,
    },

    #[error("invalid vote '{0}': expected approve, reject or defer")]
    InvalidVote(String),

    #[error("consolidation failed: {0}")]
    Consolidator(String),

    #[error("snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RelnotesError>;

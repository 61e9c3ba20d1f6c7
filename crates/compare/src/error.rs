use thiserror::Error;

/// Result type for comparison operations
pub type Result<T> = std::result::Result<T, CompareError>;

/// Errors raised while building models or comparing them
#[derive(Error, Debug)]
pub enum CompareError {
    /// A block node has no `blockType`
    #[error("Block at {path} has no blockType")]
    MissingBlockType { path: String },

    /// A block node carries `children` that is not an array
    #[error("Block at {path} has invalid children (expected array)")]
    InvalidChildren { path: String },

    /// Policy, tool or module record without a config tree
    #[error("Empty {0} config")]
    EmptyConfig(String),

    /// Schema `$ref` that points nowhere
    #[error("Unresolved schema reference: {0}")]
    UnresolvedRef(String),

    /// Schema `$ref` chain deeper than the configured ref level
    #[error("Schema reference {reference} exceeds depth {depth}")]
    RefDepthExceeded { reference: String, depth: usize },

    /// Schema `$ref` that points back to one of its own ancestors
    #[error("Circular schema reference: {0}")]
    CircularRef(String),

    /// Document store has no record with this id
    #[error("Unknown {kind}: {id}")]
    NotFound { kind: String, id: String },

    /// Artifact metadata exists but its bytes do not
    #[error("Artifact file not found: {0}")]
    MissingArtifactFile(String),

    /// Comparators need a fixed left plus at least one right
    #[error("At least two models are required, got {0}")]
    NotEnoughModels(usize),

    /// Invalid compare options
    #[error("Invalid compare options: {0}")]
    InvalidOptions(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document store failure
    #[error(transparent)]
    Store(#[from] anyhow::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl CompareError {
    /// Create a missing block type error
    pub fn missing_block_type(path: impl Into<String>) -> Self {
        Self::MissingBlockType { path: path.into() }
    }

    /// Create an invalid children error
    pub fn invalid_children(path: impl Into<String>) -> Self {
        Self::InvalidChildren { path: path.into() }
    }

    /// Create an empty config error
    pub fn empty_config(kind: impl Into<String>) -> Self {
        Self::EmptyConfig(kind.into())
    }

    /// Create a not found error
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create an invalid options error
    pub fn invalid_options(msg: impl Into<String>) -> Self {
        Self::InvalidOptions(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

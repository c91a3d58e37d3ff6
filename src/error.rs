use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for changelog-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Changelog parse error: {0}")]
    Parse(String),

    #[error("Changelog promotion error: {0}")]
    Promotion(String),

    #[error("I/O error ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Staging error: {0}")]
    Stage(String),

    #[error("Commit error: {0}")]
    Commit(String),

    /// A tag with this name is already present in the repository.
    #[error("tag already exists: {0}")]
    TagExists(String),

    /// The exact version tag was found before any tag was created.
    #[error("Tag conflict: tag {0} already exists")]
    TagConflict(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Push error: {0}")]
    Push(String),

    #[error("Profile lookup error: {0}")]
    ProfileLookup(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),
}

/// Convenience type alias for Results in changelog-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a changelog parse error with context
    pub fn parse(msg: impl Into<String>) -> Self {
        ReleaseError::Parse(msg.into())
    }

    /// Create a promotion error with context
    pub fn promotion(msg: impl Into<String>) -> Self {
        ReleaseError::Promotion(msg.into())
    }

    /// Wrap an I/O failure together with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReleaseError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn stage(msg: impl Into<String>) -> Self {
        ReleaseError::Stage(msg.into())
    }

    pub fn commit(msg: impl Into<String>) -> Self {
        ReleaseError::Commit(msg.into())
    }

    pub fn tag(msg: impl Into<String>) -> Self {
        ReleaseError::Tag(msg.into())
    }

    pub fn push(msg: impl Into<String>) -> Self {
        ReleaseError::Push(msg.into())
    }

    pub fn profile_lookup(msg: impl Into<String>) -> Self {
        ReleaseError::ProfileLookup(msg.into())
    }
}

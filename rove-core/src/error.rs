//! Error types for rove

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for rove operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for rove operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by libgit2
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The path is not inside a git working copy
    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    /// A `git` subprocess failed
    #[error("git command failed: {0}")]
    Command(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

use std::path::PathBuf;

use thiserror::Error;

use crate::types::PassId;

#[derive(Error, Debug)]
pub enum ShrinkError {
    #[error("Invalid filter pattern `{pattern}`: {reason}")]
    InvalidFilter { pattern: String, reason: String },
    #[error("Archive error in {}: {reason}", .path.display())]
    Archive { path: PathBuf, reason: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Shrink {pass} failed: {source}")]
    Pass {
        pass: PassId,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShrinkError {
    /// Wrap a failure raised while configuring or running `pass`.
    ///
    /// An `io::Error` at the root is kept as the source; anything else is
    /// wrapped so every pass failure is I/O-classified.
    pub fn pass(pass: PassId, err: anyhow::Error) -> Self {
        let source = match err.downcast::<std::io::Error>() {
            Ok(io) => io,
            Err(other) => std::io::Error::other(other),
        };
        Self::Pass { pass, source }
    }

    /// Same as [`ShrinkError::pass`] for errors already typed as `ShrinkError`.
    pub fn into_pass(self, pass: PassId) -> Self {
        match self {
            Self::Pass { .. } => self,
            Self::Io(io) => Self::Pass { pass, source: io },
            other => Self::Pass { pass, source: std::io::Error::other(other) },
        }
    }
}

pub type Result<T> = std::result::Result<T, ShrinkError>;

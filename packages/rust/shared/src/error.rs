//! Error types for ContentPilot.
//!
//! Library crates use [`ContentPilotError`] via `thiserror`.
//! App crates (cli/server) wrap this with `color-eyre` for rich diagnostics;
//! the HTTP surface maps variants to status codes.

use std::path::PathBuf;

/// Top-level error type for all ContentPilot operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentPilotError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A required request field is missing or blank.
    #[error("input error: {message}")]
    Input { message: String },

    /// Generative endpoint failure (non-success status or no candidates).
    #[error("generation error: {0}")]
    Generation(String),

    /// Model output or a stored document failed JSON shape validation.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Repository contents API read failure.
    #[error("remote read error: {0}")]
    RemoteRead(String),

    /// Repository contents API write failure.
    #[error("remote write error: {0}")]
    RemoteWrite(String),

    /// Revision mismatch on write-back: the remote document changed
    /// since it was read.
    #[error("conflict error: {0}")]
    Conflict(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ContentPilotError>;

impl ContentPilotError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an input error from any displayable message.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ContentPilotError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = ContentPilotError::input("prompt is required");
        assert_eq!(err.to_string(), "input error: prompt is required");

        let err = ContentPilotError::Conflict("plan sha changed".into());
        assert!(err.to_string().contains("plan sha changed"));
    }
}

//! Error types for tagger backends

use std::time::Duration;
use thiserror::Error;

/// Failure while running an external tagger over one block
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tagger could not be started (not found, not executable)
    #[error("Failed to start tagger '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the input file or reading the tagger's pipes failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The tagger exited unsuccessfully
    #[error("Tagger '{program}' exited with status {code}: {stderr}")]
    NonZeroExit {
        program: String,
        code: i32,
        stderr: String,
    },

    /// The tagger was killed by a signal
    #[error("Tagger '{program}' was terminated before it finished")]
    Interrupted { program: String },

    /// The tagger did not finish within the configured timeout
    #[error("Tagger '{program}' timed out after {after:?}")]
    Timeout { program: String, after: Duration },

    /// The tagger's output could not be interpreted
    #[error("Unreadable tagger output: {0}")]
    UnreadableOutput(String),
}

impl ToolError {
    /// Create a new unreadable output error
    pub fn unreadable(msg: impl std::fmt::Display) -> Self {
        Self::UnreadableOutput(msg.to_string())
    }
}

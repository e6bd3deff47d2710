//! Error types for the experiment store.

/// Errors produced by `faultloom_store`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An IO error occurred reading or writing an artifact.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A JSON artifact could not be parsed. The parser never guesses at
    /// malformed content; it surfaces the failure instead.
    #[error("corrupt artifact at {path}: {source}")]
    CorruptArtifact {
        /// The path of the offending file.
        path: String,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },
    /// An experiment id given to `analyze`/`continue` does not exist on disk.
    #[error("no experiment directory for id {0}")]
    UnknownExperiment(i64),
    /// A value could not be serialized to JSON before writing.
    #[error("failed to serialize artifact: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Convenience result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the trace store client.

/// Errors produced by `faultloom_trace`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The trace store was unreachable or returned an unexpected status.
    #[error("trace store request failed: {0}")]
    TransientRemote(String),
    /// An IO error occurred while persisting or reading a chunk.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A chunk file on disk could not be deserialized.
    #[error("malformed chunk at {path}: {source}")]
    CorruptChunk {
        /// The path of the offending file.
        path: String,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },
    /// The underlying HTTP transport failed.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Convenience result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

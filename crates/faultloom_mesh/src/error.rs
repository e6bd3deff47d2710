//! Error types for the mesh topology client.

/// Errors produced by `faultloom_mesh`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The mesh introspection endpoint was unreachable or returned an
    /// unexpected status.
    #[error("mesh topology request failed: {0}")]
    TransientRemote(String),
    /// Authentication failed even after a re-authenticate-and-retry.
    #[error("authentication to the mesh topology endpoint failed")]
    AuthenticationFailed,
    /// An IO error occurred reading or writing the persisted auth config.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The persisted auth config file was malformed.
    #[error("malformed mesh client config at {path}: {source}")]
    CorruptConfig {
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

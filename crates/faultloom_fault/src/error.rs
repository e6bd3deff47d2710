//! Error types for the fault-policy client.

/// Errors produced by `faultloom_fault`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The control plane was unreachable or returned an unexpected status.
    #[error("fault policy request failed: {0}")]
    TransientRemote(String),
    /// A policy for this host already existed. Recoverable: the caller
    /// should delete and reapply.
    #[error("fault policy for {0} already exists")]
    AlreadyExists(String),
    /// The underlying HTTP transport failed.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Convenience result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the miner subprocess driver.

/// Errors produced by `faultloom_miner`.
///
/// A timeout is deliberately not a variant here: running past the deadline
/// is handled by signalling the child and accepting whatever it wrote, not
/// by failing the operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The miner executable could not be spawned at all.
    #[error("failed to spawn miner process: {0}")]
    Spawn(#[source] std::io::Error),
    /// The spawned child exposed no pid, so its process group could not be
    /// determined. Only possible if the child had already been reaped.
    #[error("miner child process has no pid")]
    MissingPid,
    /// An I/O error occurred while waiting on or signalling the child.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

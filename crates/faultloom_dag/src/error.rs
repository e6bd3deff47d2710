//! Error types for DAG construction and transcript parsing.

/// Errors produced by `faultloom_dag`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A span carried a `FOLLOWS_FROM` reference. This is an intentional
    /// fail-fast: the implementation has no defined semantics for it, and
    /// guessing would hide an unmodelled case rather than surface it.
    #[error("span {span_id} has an unsupported FOLLOWS_FROM reference to {parent_id}")]
    UnknownReferenceType {
        /// The span carrying the reference.
        span_id: String,
        /// The referenced parent span.
        parent_id: String,
    },
    /// The transcript or a label file could not be parsed.
    #[error("parse error at line {line}: {reason}")]
    Parse {
        /// 1-based line number of the offending line.
        line: usize,
        /// Human-readable reason for the failure.
        reason: String,
    },
    /// An IO error occurred reading or writing an artifact.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A label or artifact JSON file could not be parsed.
    #[error(transparent)]
    Store(#[from] faultloom_store::Error),
}

/// Convenience result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

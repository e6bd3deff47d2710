//! Error types for the experiment controller.

/// Errors produced by `faultloom_orchestrator`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An `ExperimentState::next` call named an event that isn't legal from
    /// the current state.
    #[error("cannot apply {event:?} to experiment state {state:?}")]
    InvalidTransition {
        /// The state the experiment was in.
        state: crate::state::ExperimentState,
        /// The event that was rejected.
        event: crate::state::Event,
    },
    /// The operator was prompted for input but none of the supplied choices
    /// were applicable, or the experiment has nothing to choose from (e.g.
    /// the miner produced no candidate subgraphs).
    #[error("no candidates available: {0}")]
    NoCandidates(String),
    /// An interactive prompt failed (e.g. stdin is not a terminal).
    #[error("operator prompt failed: {0}")]
    Prompt(#[source] std::io::Error),
    /// I/O failure reading or writing experiment state.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Trace store client failure.
    #[error(transparent)]
    Trace(#[from] faultloom_trace::Error),
    /// Mesh topology client failure.
    #[error(transparent)]
    Mesh(#[from] faultloom_mesh::Error),
    /// Fault policy client failure.
    #[error(transparent)]
    Fault(#[from] faultloom_fault::Error),
    /// DAG builder/transcript failure.
    #[error(transparent)]
    Dag(#[from] faultloom_dag::Error),
    /// Miner driver failure.
    #[error(transparent)]
    Miner(#[from] faultloom_miner::Error),
    /// Experiment store failure.
    #[error(transparent)]
    Store(#[from] faultloom_store::Error),
}

/// Convenience result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

//! Experiment state machine tying the trace, mesh, fault, DAG, miner, and
//! analysis crates together into the four operator-facing verbs:
//! `analyze`, `start`, `experiment`, `continue`.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod controller;
pub mod error;
pub mod guard;
pub mod prompt;
pub mod state;
pub mod uri;

pub use controller::{ExperimentController, ExperimentSummary};
pub use error::{Error, Result};
pub use prompt::{DialoguerPrompt, OperatorPrompt};
pub use state::{Event, ExperimentState, Granularity};

//! The experiment state machine.
//!
//! `ExperimentState::next` is pure bookkeeping — it validates that an event
//! is legal from the current state and returns the resulting state, with no
//! I/O of its own. [`crate::controller::ExperimentController`] calls it
//! alongside the actual work for each transition, which keeps the sequencing
//! rules independently unit-testable without a trace store or mesh control
//! plane in the loop.

use crate::error::{Error, Result};

/// Where an injected fault is scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// The whole service, matched with URI prefix `/`.
    Service,
    /// A single RPC, matched with the URI rewritten from its operation name.
    Request,
}

/// A chosen fault target: the service to fault and the URI prefix to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultTarget {
    /// The service to inject the fault into.
    pub service: String,
    /// The URI prefix the fault policy matches against.
    pub uri_prefix: String,
}

/// One step of the experiment state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Allocate the experiment's artifact directory.
    CreateDir,
    /// Pull frontend traces into the artifact directory.
    CollectTraces,
    /// Build DAGs and write the transcript/label files.
    BuildDags,
    /// Run the subgraph miner and parse its ranked output.
    Mine,
    /// The operator chose a fault target.
    ChooseFault(FaultTarget),
    /// Upstream services of the fault target were resolved.
    ComputeUpstreams,
    /// The operator chose an abort percentage.
    ChooseRate(f64),
    /// Baseline success rates were measured.
    MeasureBaseline,
    /// The fault policy was applied.
    ApplyFault,
    /// The fixed wait period elapsed (or was cancelled).
    Wait { cancelled: bool },
    /// Post-fault success rates were measured.
    MeasurePost,
    /// The fault policy was reverted.
    RevertFault,
    /// Before/after/delta graphs were rendered.
    Report,
}

/// The experiment's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentState {
    /// No artifact directory exists yet.
    Init,
    /// The experiment directory has been created.
    DirCreated,
    /// Frontend traces have been pulled and persisted.
    TracesCollected,
    /// DAGs have been built and the transcript written.
    Dagged,
    /// The miner has run and its output was parsed into ranked subgraphs.
    Mined,
    /// The operator picked a fault target.
    FaultChosen,
    /// Upstream services of the fault target are known.
    UpstreamsComputed,
    /// The operator picked an abort percentage.
    RateChosen,
    /// Baseline (pre-fault) success rates were measured.
    BaselineMeasured,
    /// The fault policy is live.
    FaultApplied,
    /// The fixed wait period is in progress or just completed.
    Waiting,
    /// Post-fault success rates were measured.
    PostMeasured,
    /// The fault policy has been removed.
    FaultReverted,
    /// The experiment is complete; before/after/delta graphs were reported.
    Reported,
}

impl ExperimentState {
    /// Validates and applies one state transition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if `event` is not legal from the
    /// current state. A cancelled [`Event::Wait`] is the one transition that
    /// skips ahead: it jumps straight to [`ExperimentState::FaultReverted`],
    /// bypassing post-measurement, per the requirement that a fault revert
    /// must still be attempted if the operator aborts mid-wait.
    pub fn next(self, event: &Event) -> Result<Self> {
        let next = match (self, event) {
            (Self::Init, Event::CreateDir) => Self::DirCreated,
            (Self::DirCreated, Event::CollectTraces) => Self::TracesCollected,
            (Self::TracesCollected, Event::BuildDags) => Self::Dagged,
            (Self::Dagged, Event::Mine) => Self::Mined,
            (Self::Mined, Event::ChooseFault(_)) => Self::FaultChosen,
            (Self::FaultChosen, Event::ComputeUpstreams) => Self::UpstreamsComputed,
            (Self::UpstreamsComputed, Event::ChooseRate(_)) => Self::RateChosen,
            (Self::RateChosen, Event::MeasureBaseline) => Self::BaselineMeasured,
            (Self::BaselineMeasured, Event::ApplyFault) => Self::FaultApplied,
            (Self::FaultApplied, Event::Wait { cancelled: false }) => Self::Waiting,
            (Self::FaultApplied, Event::Wait { cancelled: true }) => Self::FaultReverted,
            (Self::Waiting, Event::MeasurePost) => Self::PostMeasured,
            (Self::PostMeasured, Event::RevertFault) => Self::FaultReverted,
            (Self::FaultReverted, Event::Report) => Self::Reported,
            (state, event) => {
                return Err(Error::InvalidTransition {
                    state,
                    event: event.clone(),
                });
            }
        };
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_reaches_reported() {
        let target = FaultTarget {
            service: "cartservice".to_string(),
            uri_prefix: "/".to_string(),
        };
        let mut state = ExperimentState::Init;
        let events = [
            Event::CreateDir,
            Event::CollectTraces,
            Event::BuildDags,
            Event::Mine,
            Event::ChooseFault(target),
            Event::ComputeUpstreams,
            Event::ChooseRate(50.0),
            Event::MeasureBaseline,
            Event::ApplyFault,
            Event::Wait { cancelled: false },
            Event::MeasurePost,
            Event::RevertFault,
            Event::Report,
        ];
        for event in &events {
            state = state.next(event).unwrap();
        }
        assert_eq!(state, ExperimentState::Reported);
    }

    #[test]
    fn cancelled_wait_skips_directly_to_fault_reverted() {
        let state = ExperimentState::FaultApplied
            .next(&Event::Wait { cancelled: true })
            .unwrap();
        assert_eq!(state, ExperimentState::FaultReverted);
    }

    #[test]
    fn out_of_order_event_is_rejected() {
        let result = ExperimentState::Init.next(&Event::Mine);
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
    }

    #[test]
    fn cannot_skip_baseline_measurement() {
        let result = ExperimentState::UpstreamsComputed.next(&Event::ApplyFault);
        assert!(result.is_err());
    }
}

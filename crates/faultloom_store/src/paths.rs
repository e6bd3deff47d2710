//! Centralized path layout for an experiment directory.

use std::path::{Path, PathBuf};

/// Every path beneath `data/experiments/<unix-ts>/` that a faultloom crate
/// might need to read or write.
#[derive(Debug, Clone)]
pub struct ExperimentPaths {
    root: PathBuf,
    id: i64,
}

impl ExperimentPaths {
    /// Allocates a new experiment directory under `base_dir`, named by the
    /// current unix timestamp.
    #[must_use]
    pub fn new_now(base_dir: &Path) -> Self {
        let id = chrono::Utc::now().timestamp();
        Self::for_id(base_dir, id)
    }

    /// Addresses an existing (or to-be-created) experiment directory by id.
    #[must_use]
    pub fn for_id(base_dir: &Path, id: i64) -> Self {
        Self {
            root: base_dir.join(id.to_string()),
            id,
        }
    }

    /// The experiment's id (the unix timestamp it was created at).
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// The experiment's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `traces/<operation>/` — directory holding one file per trace id for
    /// the given frontend operation (slashes in `operation` are not
    /// expected; callers replace them with underscores before calling this).
    #[must_use]
    pub fn traces_dir(&self, operation_safe: &str) -> PathBuf {
        self.root.join("traces").join(operation_safe)
    }

    /// `traces/<operation>/<trace-id>`.
    #[must_use]
    pub fn trace_file(&self, operation_safe: &str, trace_id: &str) -> PathBuf {
        self.traces_dir(operation_safe).join(trace_id)
    }

    /// `before/` or `after/` directory.
    #[must_use]
    pub fn phase_dir(&self, phase: &str) -> PathBuf {
        self.root.join(phase)
    }

    /// `before/<service>` or `after/<service>`.
    #[must_use]
    pub fn phase_file(&self, phase: &str, service: &str) -> PathBuf {
        self.phase_dir(phase).join(service)
    }

    /// The graph transcript the DAG builder writes and the miner reads.
    #[must_use]
    pub fn traces_data(&self) -> PathBuf {
        self.root.join("traces.data")
    }

    /// The miner's output file.
    #[must_use]
    pub fn traces_result(&self) -> PathBuf {
        self.root.join("traces.result")
    }

    /// Vertex (service) label table.
    #[must_use]
    pub fn v_labels(&self) -> PathBuf {
        self.root.join("vLabels")
    }

    /// Edge (operation) label table.
    #[must_use]
    pub fn e_labels(&self) -> PathBuf {
        self.root.join("eLabels")
    }

    /// Trace-id to graph-index table.
    #[must_use]
    pub fn g_labels(&self) -> PathBuf {
        self.root.join("gLabels")
    }

    /// Trace-id to (span-id to local-vertex-index) table.
    #[must_use]
    pub fn g_vertices(&self) -> PathBuf {
        self.root.join("gVertices")
    }

    /// Returns true if a directory already exists for this id.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_nest_under_root() {
        let paths = ExperimentPaths::for_id(Path::new("data/experiments"), 1_700_000_000);
        assert_eq!(
            paths.root(),
            Path::new("data/experiments/1700000000")
        );
        assert_eq!(
            paths.trace_file("hipstershop_CartService_GetCart", "abc123"),
            Path::new("data/experiments/1700000000/traces/hipstershop_CartService_GetCart/abc123")
        );
        assert_eq!(
            paths.phase_file("before", "cartservice"),
            Path::new("data/experiments/1700000000/before/cartservice")
        );
        assert_eq!(
            paths.traces_data(),
            Path::new("data/experiments/1700000000/traces.data")
        );
    }
}

//! Per-verb command implementations.

pub mod analyze;
pub mod continue_cmd;
pub mod experiment;
pub mod start;

use anyhow::{Context, Result};
use faultloom_fault::HttpFaultPolicyClient;
use faultloom_mesh::HttpMeshTopologyClient;
use faultloom_orchestrator::{DialoguerPrompt, ExperimentController};
use faultloom_trace::HttpTraceStoreClient;
use std::path::Path;

/// Builds an `ExperimentController` wired to the three external services.
pub(crate) fn build_controller(
    jaeger: &str,
    fault: &str,
    kiali: &str,
    kiali_user: &str,
    kiali_password: &str,
    base_dir: &Path,
    miner: &str,
) -> Result<ExperimentController> {
    let trace = HttpTraceStoreClient::new(jaeger)
        .with_context(|| format!("failed to build trace store client for {jaeger}"))?;
    let mesh_config_path = base_dir.join(".kiali-config.json");
    let mesh = HttpMeshTopologyClient::new(kiali, kiali_user, kiali_password, &mesh_config_path)
        .with_context(|| format!("failed to build mesh topology client for {kiali}"))?;
    let policy = HttpFaultPolicyClient::new(fault)
        .with_context(|| format!("failed to build fault policy client for {fault}"))?;

    Ok(ExperimentController::new(
        trace,
        mesh,
        policy,
        base_dir.to_path_buf(),
        miner.to_string(),
        Box::new(DialoguerPrompt),
    ))
}

//! `faultloom analyze` - replay a completed experiment's report.

use crate::commands::build_controller;
use anyhow::{Context, Result};
use faultloom_analyze::render::{render_delta, render_graph};
use std::path::Path;
use tracing::info;

/// Runs the analyze command. Read-only: no mesh/fault-policy calls are made
/// and no advisory lock is taken by the caller.
#[allow(clippy::too_many_arguments)]
pub async fn run(
    jaeger: &str,
    fault: &str,
    kiali: &str,
    kiali_user: &str,
    kiali_password: &str,
    base_dir: &Path,
    miner: &str,
    id: i64,
) -> Result<()> {
    info!(id, "replaying experiment report");
    let controller =
        build_controller(jaeger, fault, kiali, kiali_user, kiali_password, base_dir, miner)?;

    let summary = controller
        .analyze(id)
        .await
        .with_context(|| format!("failed to analyze experiment {id}"))?;

    println!("experiment {} report", summary.id);
    println!("before:\n{}", render_graph(&summary.before));
    println!("after:\n{}", render_graph(&summary.after));
    println!("delta:\n{}", render_delta(&summary.delta));

    Ok(())
}

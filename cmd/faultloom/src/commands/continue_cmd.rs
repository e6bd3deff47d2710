//! `faultloom continue` - resume an experiment directory at the mining step.

use crate::commands::build_controller;
use anyhow::{Context, Result};
use faultloom_analyze::render::{render_delta, render_graph};
use std::path::Path;
use tracing::info;

/// Runs the continue command.
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
    info!(id, "resuming experiment");
    let controller =
        build_controller(jaeger, fault, kiali, kiali_user, kiali_password, base_dir, miner)?;

    let summary = controller
        .continue_experiment(id)
        .await
        .with_context(|| format!("failed to continue experiment {id}"))?;

    println!("experiment {} complete", summary.id);
    println!("before:\n{}", render_graph(&summary.before));
    println!("after:\n{}", render_graph(&summary.after));
    println!("delta:\n{}", render_delta(&summary.delta));

    Ok(())
}

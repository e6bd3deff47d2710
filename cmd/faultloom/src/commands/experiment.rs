//! `faultloom experiment` - run a full experiment from scratch.

use crate::commands::build_controller;
use anyhow::{Context, Result};
use faultloom_analyze::render::{render_delta, render_graph};
use std::path::Path;
use tracing::info;

/// Runs the experiment command.
#[allow(clippy::too_many_arguments)]
pub async fn run(
    jaeger: &str,
    fault: &str,
    kiali: &str,
    kiali_user: &str,
    kiali_password: &str,
    base_dir: &Path,
    miner: &str,
) -> Result<()> {
    info!("starting a new experiment");
    let controller =
        build_controller(jaeger, fault, kiali, kiali_user, kiali_password, base_dir, miner)?;

    let summary = controller
        .run_experiment()
        .await
        .context("experiment failed")?;

    println!("experiment {} complete", summary.id);
    println!("before:\n{}", render_graph(&summary.before));
    println!("after:\n{}", render_graph(&summary.after));
    println!("delta:\n{}", render_delta(&summary.delta));

    Ok(())
}

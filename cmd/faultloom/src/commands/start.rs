//! `faultloom start` - survey the mesh's services and traffic rates.

use crate::commands::build_controller;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Runs the start command.
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
    info!(kiali, "surveying mesh topology");
    let controller =
        build_controller(jaeger, fault, kiali, kiali_user, kiali_password, base_dir, miner)?;

    let rows = controller.survey().await.context("survey failed")?;

    println!("{:<40} inbound rate", "service");
    for (service, rate) in rows {
        println!("{service:<40} {rate}");
    }

    Ok(())
}

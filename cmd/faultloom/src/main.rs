//! faultloom CLI - trace-driven fault-injection orchestrator.
//!
//! Commands:
//! - `faultloom start` - survey the mesh's services and traffic rates
//! - `faultloom experiment` - run a full experiment from scratch
//! - `faultloom continue <id>` - resume a mined experiment directory
//! - `faultloom analyze <id>` - replay a completed experiment's report

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod lock;

const DEFAULT_JAEGER: &str = "jaeger-query.istio-system:16686";
const DEFAULT_FAULT: &str = "istiod.istio-system:8080";
const DEFAULT_KIALI: &str = "kiali.istio-system";
const DEFAULT_BASE_DIR: &str = "data/experiments";
const DEFAULT_MINER_SCRIPT: &str = "scripts/mine.sh";

#[derive(Parser)]
#[command(name = "faultloom")]
#[command(about = "Trace-driven fault-injection orchestrator for a gRPC service mesh")]
#[command(version)]
struct Cli {
    /// Enable verbose (debug) output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Jaeger-like trace store address
    #[arg(long, global = true, env = "FAULTLOOM_JAEGER", default_value = DEFAULT_JAEGER)]
    jaeger: String,

    /// Mesh control-plane address used for fault-policy injection
    #[arg(long, global = true, env = "FAULTLOOM_FAULT", default_value = DEFAULT_FAULT)]
    fault: String,

    /// Mesh topology introspection host
    #[arg(long, global = true, env = "FAULTLOOM_KIALI", default_value = DEFAULT_KIALI)]
    kiali: String,

    /// Mesh topology basic-auth username
    #[arg(long, global = true, env = "FAULTLOOM_KIALI_USER", default_value = "admin")]
    kiali_user: String,

    /// Mesh topology basic-auth password
    #[arg(long, global = true, env = "FAULTLOOM_KIALI_PASSWORD", default_value = "admin")]
    kiali_password: String,

    /// Directory experiment artifacts are written under
    #[arg(long, global = true, env = "FAULTLOOM_BASE_DIR", default_value = DEFAULT_BASE_DIR)]
    base_dir: String,

    /// Path to the frequent-subgraph-mining executable
    #[arg(long, global = true, env = "FAULTLOOM_MINER", default_value = DEFAULT_MINER_SCRIPT)]
    miner: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Survey the mesh's services and their inbound traffic rates
    Start,

    /// Run a full experiment: collect traces, mine subgraphs, inject a
    /// fault, measure the before/after/delta success rates
    Experiment,

    /// Resume an experiment directory at the mining step
    Continue {
        /// The experiment's id (its directory name under the base dir)
        id: i64,
    },

    /// Replay a completed experiment's persisted before/after chunks
    Analyze {
        /// The experiment's id (its directory name under the base dir)
        id: i64,
    },
}

impl Commands {
    /// True for verbs that mutate experiment state on disk and must hold
    /// the advisory lock. `start` only reads mesh topology and `analyze`
    /// only replays persisted chunks; neither touches experiment
    /// directories, so both run unlocked.
    const fn is_mutating(&self) -> bool {
        matches!(self, Self::Experiment | Self::Continue { .. })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let base_dir = std::path::PathBuf::from(&cli.base_dir);
    std::fs::create_dir_all(&base_dir)?;

    let _guard = if cli.command.is_mutating() {
        Some(lock::acquire(&base_dir)?)
    } else {
        None
    };

    match cli.command {
        Commands::Start => {
            commands::start::run(
                &cli.jaeger,
                &cli.fault,
                &cli.kiali,
                &cli.kiali_user,
                &cli.kiali_password,
                &base_dir,
                &cli.miner,
            )
            .await
        }
        Commands::Experiment => {
            commands::experiment::run(
                &cli.jaeger,
                &cli.fault,
                &cli.kiali,
                &cli.kiali_user,
                &cli.kiali_password,
                &base_dir,
                &cli.miner,
            )
            .await
        }
        Commands::Continue { id } => {
            commands::continue_cmd::run(
                &cli.jaeger,
                &cli.fault,
                &cli.kiali,
                &cli.kiali_user,
                &cli.kiali_password,
                &base_dir,
                &cli.miner,
                id,
            )
            .await
        }
        Commands::Analyze { id } => {
            commands::analyze::run(
                &cli.jaeger,
                &cli.fault,
                &cli.kiali,
                &cli.kiali_user,
                &cli.kiali_password,
                &base_dir,
                &cli.miner,
                id,
            )
            .await
        }
    }
}

//! Drives the external frequent-subgraph-mining executable.
//!
//! The miner is given a hard wall-clock budget. Graphs with expensive
//! support computations can run well past it, so faultloom kills the whole
//! process group rather than waiting indefinitely, then accepts whatever
//! partial result file the miner had written.
//!
//! Process-group placement happens via [`CommandExt::process_group`] before
//! `spawn`, so the child becomes its own group leader atomically at `exec`.
//! The original driver this was modeled on called `Start()` and then
//! `Setpgid()`/`Getpgid()` afterwards, leaving a window where a fast-exiting
//! child could vanish before its group was ever read back.

use crate::error::{Error, Result};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::warn;

const MINER_TIMEOUT: Duration = Duration::from_secs(10);

/// Invokes a miner script against an input/output file pair, enforcing a
/// fixed wall-clock timeout.
pub struct MinerDriver {
    script_path: PathBuf,
    timeout: Duration,
}

impl MinerDriver {
    /// Creates a driver for the miner executable at `script_path`, using
    /// the default ten-second timeout.
    pub fn new(script_path: impl Into<PathBuf>) -> Self {
        Self {
            script_path: script_path.into(),
            timeout: MINER_TIMEOUT,
        }
    }

    /// Overrides the default timeout. Exposed for tests.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the miner against `input`, writing results to `output`.
    ///
    /// Returns `Ok(())` whether the miner exited cleanly or was killed on
    /// timeout; callers read `output` afterwards and treat a short or empty
    /// file as "nothing found" rather than as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if the process cannot be started at all, or
    /// [`Error::MissingPid`]/[`Error::Io`] if the child's process group
    /// cannot be determined or waited on.
    pub async fn run(&self, input: &Path, output: &Path) -> Result<()> {
        let mut command = Command::new(&self.script_path);
        command
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Placing the child in its own group (pgid == its own pid) before
        // exec means the pgid below is valid the instant spawn() returns;
        // there is no gap where a signal could reach the wrong group.
        command.process_group(0);

        let mut child = command.spawn().map_err(Error::Spawn)?;
        let pid = child.id().ok_or(Error::MissingPid)?;
        let pgid = Pid::from_raw(i32::try_from(pid).unwrap_or(i32::MAX));

        let mut clean_exit = false;
        tokio::select! {
            status = child.wait() => {
                clean_exit = true;
                let status = status?;
                if !status.success() {
                    warn!(?status, "miner exited non-zero, accepting its output anyway");
                }
            }
            () = tokio::time::sleep(self.timeout) => {
                warn!(pgid = pgid.as_raw(), "miner exceeded timeout, signalling process group");
                if killpg(pgid, Signal::SIGTERM).is_err() {
                    warn!(pgid = pgid.as_raw(), "process group already gone");
                }
            }
        }

        if !clean_exit {
            // Give the group a moment to die from SIGTERM, then reap.
            match tokio::time::timeout(Duration::from_secs(2), child.wait()).await {
                Ok(status) => {
                    status?;
                }
                Err(_) => {
                    let _ = killpg(pgid, Signal::SIGKILL);
                    let _ = child.wait().await;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_before_timeout_reports_no_error() {
        let driver = MinerDriver::new("/bin/true").with_timeout(Duration::from_secs(5));
        let result = driver
            .run(Path::new("/dev/null"), Path::new("/dev/null"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn missing_executable_is_a_spawn_error() {
        let driver =
            MinerDriver::new("/nonexistent/mine.sh").with_timeout(Duration::from_millis(100));
        let result = driver
            .run(Path::new("/dev/null"), Path::new("/dev/null"))
            .await;
        assert!(matches!(result, Err(Error::Spawn(_))));
    }

    #[tokio::test]
    async fn slow_child_is_killed_on_timeout_without_error() {
        let driver = MinerDriver::new("/bin/sleep").with_timeout(Duration::from_millis(50));
        let result = driver.run(Path::new("30"), Path::new("0")).await;
        assert!(result.is_ok());
    }
}

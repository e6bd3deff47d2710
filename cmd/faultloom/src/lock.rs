//! Advisory lock file rejecting concurrent mutating-verb invocations.

use anyhow::{bail, Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Held for the duration of a mutating verb (`experiment`, `continue`);
/// removed on drop. `start` and `analyze` are read-only and never take it.
pub struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Acquires `<base_dir>/.lock`, failing if another invocation already holds
/// it.
///
/// # Errors
///
/// Returns an error if the lock file already exists or cannot be created.
pub fn acquire(base_dir: &Path) -> Result<LockGuard> {
    let path = base_dir.join(".lock");
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .with_context(|| {
            format!(
                "another faultloom invocation holds {} - wait for it to finish",
                path.display()
            )
        })?;

    if let Err(err) = writeln!(file, "{}", std::process::id()) {
        let _ = std::fs::remove_file(&path);
        bail!("failed to write lock file {}: {err}", path.display());
    }

    Ok(LockGuard { path })
}

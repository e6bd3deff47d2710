//! Single-write-call file IO.
//!
//! `std::fs::write` already performs one `write(2)` call on the full
//! in-memory buffer rather than an incremental stream, so there is no
//! partial-write window to guard against beyond choosing that primitive
//! over a `File` + multiple `write_all` calls. `read_json_strict` is the
//! read-side counterpart: it never falls back to a default value on a
//! parse failure.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Writes `bytes` to `path` in a single call, creating parent directories
/// first if needed.
///
/// # Errors
///
/// Returns [`Error::Io`] if the parent directory cannot be created or the
/// write fails.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Serializes `value` to pretty JSON and writes it to `path` in a single
/// call.
///
/// # Errors
///
/// Returns [`Error::Serialize`] if `value` cannot be serialized, or
/// [`Error::Io`] on a write failure.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(Error::Serialize)?;
    write_file(path, &bytes)
}

/// Reads and parses a JSON file, returning a [`Error::CorruptArtifact`] on
/// any parse failure rather than silently defaulting.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, or
/// [`Error::CorruptArtifact`] if its contents are not valid JSON for `T`.
pub fn read_json_strict<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|source| Error::CorruptArtifact {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn write_then_read_json_roundtrip() {
        let dir = tempdir();
        let path = dir.join("labels.json");
        let mut value = HashMap::new();
        value.insert("frontend".to_string(), 0i64);

        write_json(&path, &value).unwrap();
        let read: HashMap<String, i64> = read_json_strict(&path).unwrap();
        assert_eq!(read, value);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn read_json_strict_fails_loudly_on_garbage() {
        let dir = tempdir();
        let path = dir.join("garbage.json");
        write_file(&path, b"not json").unwrap();

        let result: Result<HashMap<String, i64>> = read_json_strict(&path);
        assert!(matches!(result, Err(Error::CorruptArtifact { .. })));

        std::fs::remove_dir_all(dir).ok();
    }

    fn tempdir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "faultloom_store_test_{:?}",
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}

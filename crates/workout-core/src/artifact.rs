//! Artifact naming and persistence.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// `workout_export_<unix seconds>.csv`
pub fn export_file_name(fetched_at: DateTime<Utc>) -> String {
    format!("workout_export_{}.csv", fetched_at.timestamp())
}

/// Write `contents` to `dir/name`, creating `dir` if needed.
///
/// # Errors
///
/// Any filesystem failure is reported as [`CoreError::PersistenceFailed`]
/// naming the path that could not be written.
pub fn write_artifact(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    let persisted = |source| CoreError::PersistenceFailed {
        path: path.clone(),
        source,
    };
    std::fs::create_dir_all(dir).map_err(persisted)?;
    std::fs::write(&path, contents).map_err(persisted)?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "artifact written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_file_name() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(export_file_name(at), "workout_export_1700000000.csv");
    }

    #[test]
    fn test_write_artifact_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");
        let path = write_artifact(&target, "a.csv", "x,y").unwrap();
        assert_eq!(path, target.join("a.csv"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "x,y");
    }

    #[test]
    fn test_write_artifact_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        // a regular file cannot act as the parent directory
        let err = write_artifact(&blocker, "a.csv", "x").unwrap_err();
        match err {
            CoreError::PersistenceFailed { path, .. } => assert_eq!(path, blocker.join("a.csv")),
            other => panic!("unexpected error: {other}"),
        }
    }
}

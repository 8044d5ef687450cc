//! # Flat-file JSON store
//!
//! Each logical store is one pretty-printed JSON document on disk; the whole
//! document is the unit of both reads and writes. There is no cache layer in
//! front of it: callers re-read the full document per operation and commit by
//! full overwrite, so the only consistency machinery needed is the write
//! serializer sitting above this module.

use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;
use uuid::Uuid;

use crate::{config::CorruptionPolicy, error::AppError};

/// Loads the document at `path`, treating "no data yet" as an empty document.
///
/// A missing file always yields `T::default()`. A file that exists but fails
/// to parse is handled per `policy`; any other I/O failure propagates.
pub async fn load<T>(path: &Path, policy: CorruptionPolicy) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(AppError::Storage(e)),
    };

    match serde_json::from_str(&raw) {
        Ok(doc) => Ok(doc),
        Err(e) => match policy {
            CorruptionPolicy::Reset => {
                warn!(path = %path.display(), error = %e, "corrupt store, resetting to empty");
                Ok(T::default())
            }
            CorruptionPolicy::Backup => {
                let backup = backup_path(path);
                warn!(
                    path = %path.display(),
                    backup = %backup.display(),
                    error = %e,
                    "corrupt store, backing up before resetting to empty",
                );
                tokio::fs::rename(path, &backup)
                    .await
                    .map_err(AppError::Storage)?;
                Ok(T::default())
            }
            CorruptionPolicy::Fail => {
                warn!(path = %path.display(), error = %e, "corrupt store, refusing operation");
                Err(AppError::Internal(format!(
                    "corrupt store at {}: {e}",
                    path.display()
                )))
            }
        },
    }
}

/// Serializes `doc` as indented JSON and replaces the file at `path`,
/// creating the containing directory if needed.
pub async fn save<T>(path: &Path, doc: &T) -> Result<(), AppError>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(AppError::Storage)?;
    }

    let payload = serde_json::to_string_pretty(doc)
        .map_err(|e| AppError::Internal(format!("failed to encode store payload: {e}")))?;

    // Write-then-rename so a crash mid-write never leaves a torn document.
    let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
    tokio::fs::write(&temp_path, payload)
        .await
        .map_err(AppError::Storage)?;
    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(AppError::Storage)?;

    Ok(())
}

fn backup_path(path: &Path) -> PathBuf {
    path.with_extension(format!("corrupt-{}", Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        entries: Vec<String>,
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("absent.json");

        let doc: Doc = load(&path, CorruptionPolicy::Fail).await.expect("load");
        assert_eq!(doc, Doc::default());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested/dir/doc.json");
        let doc = Doc {
            entries: vec!["a".to_string(), "b".to_string()],
        };

        save(&path, &doc).await.expect("save");
        let loaded: Doc = load(&path, CorruptionPolicy::Fail).await.expect("load");
        assert_eq!(loaded, doc);
    }

    #[tokio::test]
    async fn saved_document_is_indented() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("doc.json");
        let doc = Doc {
            entries: vec!["a".to_string()],
        };

        save(&path, &doc).await.expect("save");
        let raw = tokio::fs::read_to_string(&path).await.expect("read");
        assert!(raw.contains("\n  \"entries\""));
    }

    #[tokio::test]
    async fn corrupt_file_resets_under_reset_policy() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("doc.json");
        tokio::fs::write(&path, "{not json").await.expect("write");

        let doc: Doc = load(&path, CorruptionPolicy::Reset).await.expect("load");
        assert_eq!(doc, Doc::default());
    }

    #[tokio::test]
    async fn corrupt_file_is_moved_aside_under_backup_policy() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("doc.json");
        tokio::fs::write(&path, "{not json").await.expect("write");

        let doc: Doc = load(&path, CorruptionPolicy::Backup).await.expect("load");
        assert_eq!(doc, Doc::default());
        assert!(!path.exists());

        let mut entries = std::fs::read_dir(temp.path()).expect("read_dir");
        let moved = entries.next().expect("backup file").expect("entry");
        assert!(
            moved
                .file_name()
                .to_string_lossy()
                .contains("corrupt-")
        );
    }

    #[tokio::test]
    async fn corrupt_file_errors_under_fail_policy() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("doc.json");
        tokio::fs::write(&path, "{not json").await.expect("write");

        let result: Result<Doc, _> = load(&path, CorruptionPolicy::Fail).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}

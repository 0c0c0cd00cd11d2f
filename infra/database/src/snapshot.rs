use crate::error::{DatabaseError, DatabaseErrorExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const TMP_MARKER: &str = ".tallytmp.";
const SNAPSHOT_EXTENSION: &str = "json";

pub(crate) fn snapshot_path(root: &Path, collection: &str) -> PathBuf {
    root.join(collection).with_extension(SNAPSHOT_EXTENSION)
}

/// Reads a snapshot; a missing file is an empty collection.
pub(crate) async fn read(path: &Path) -> Result<Option<Vec<u8>>, DatabaseError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(DatabaseError::Io {
            source,
            context: Some(format!("Reading snapshot {}", path.display()).into()),
        }),
    }
}

/// Writes `data` to `target` through a unique temp file, `fsync` and `rename`.
///
/// Readers only ever observe the previous or the new snapshot, never a partial one.
pub(crate) async fn write_atomic(
    target: &Path,
    data: &[u8],
    counter: &AtomicU64,
) -> Result<(), DatabaseError> {
    let temp = unique_tmp_path(target, counter);

    discard_on_error(&temp, fill_temp(&temp, data).await).await?;
    discard_on_error(&temp, swap_into_place(&temp, target).await).await?;

    if let Some(parent) = target.parent() {
        sync_dir(parent).await;
    }

    debug!(path = %target.display(), bytes = data.len(), "Snapshot saved atomically");
    Ok(())
}

async fn fill_temp(temp: &Path, data: &[u8]) -> Result<(), DatabaseError> {
    let mut file = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(temp)
        .await
        .context(format!("Temp creation failed: {}", temp.display()))?;
    file.write_all(data).await.context("Write failed")?;
    file.sync_all().await.context("Hardware sync failed")
}

async fn swap_into_place(temp: &Path, target: &Path) -> Result<(), DatabaseError> {
    let swap_failed = || format!("Atomic swap failed: {} -> {}", temp.display(), target.display());
    match fs::rename(temp, target).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            fs::remove_file(target)
                .await
                .context(format!("Failed to replace snapshot: {}", target.display()))?;
            fs::rename(temp, target).await.context(swap_failed())
        },
        Err(source) => Err(DatabaseError::Io { source, context: Some(swap_failed().into()) }),
    }
}

/// Deletes the temp file when `result` is an error, so a failed write leaves nothing behind.
async fn discard_on_error<T>(
    temp: &Path,
    result: Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    if result.is_err()
        && let Err(err) = fs::remove_file(temp).await
        && err.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = %temp.display(), error = %err, "Failed to remove temp file");
    }
    result
}

/// Removes temp files left behind by an interrupted write.
pub(crate) async fn purge_tmp(root: &Path) {
    let root = root.to_path_buf();

    match tokio::task::spawn_blocking(move || remove_orphans(&root)).await {
        Ok((removed, failed)) if removed > 0 || failed > 0 => {
            info!(removed, failed, "Cleaned up orphaned snapshot files");
        },
        Err(e) => warn!(error = %e, "Temp file cleanup task panicked"),
        _ => {},
    }
}

fn remove_orphans(root: &Path) -> (usize, usize) {
    let mut removed = 0;
    let mut failed = 0;

    WalkDir::new(root)
        .max_depth(1)
        .into_iter()
        .flatten()
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_str().is_some_and(|name| name.contains(TMP_MARKER)))
        .for_each(|entry| match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Failed to remove temp file");
                failed += 1;
            },
        });

    (removed, failed)
}

async fn sync_dir(path: &Path) {
    match fs::File::open(path).await {
        Ok(dir) => {
            if let Err(err) = dir.sync_all().await {
                debug!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => debug!(path = %path.display(), error = %err, "Directory open failed"),
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("snapshot");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{}.{counter}", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let target = snapshot_path(dir.path(), "items");
        let counter = AtomicU64::new(0);

        write_atomic(&target, b"[1]", &counter).await.unwrap();
        write_atomic(&target, b"[1,2]", &counter).await.unwrap();

        assert_eq!(read(&target).await.unwrap().as_deref(), Some(&b"[1,2]"[..]));
        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().contains(TMP_MARKER))
            .count();
        assert_eq!(leftovers, 0);
    }

    fn temp_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().contains(TMP_MARKER))
            .count()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_swap_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = snapshot_path(dir.path(), "items");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("occupied"), "").unwrap();

        let err = write_atomic(&target, b"[1]", &AtomicU64::new(0)).await.unwrap_err();
        assert!(err.to_string().contains("Atomic swap failed"), "{err}");
        assert_eq!(temp_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn errors_discard_the_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("items.json.tallytmp.1.0");

        std::fs::write(&temp, "[").unwrap();
        assert!(discard_on_error(&temp, Ok(())).await.is_ok());
        assert!(temp.exists());

        let failed: Result<(), DatabaseError> =
            Err(DatabaseError::from(std::io::Error::other("disk full")));
        assert!(discard_on_error(&temp, failed).await.is_err());
        assert!(!temp.exists());

        let again: Result<(), DatabaseError> =
            Err(DatabaseError::from(std::io::Error::other("disk full")));
        assert!(discard_on_error(&temp, again).await.is_err());
    }

    #[tokio::test]
    async fn missing_snapshot_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read(&dir.path().join("nope.json")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn purge_removes_only_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("users.json"), "[]").unwrap();
        std::fs::write(dir.path().join("users.json.tallytmp.1.0"), "[").unwrap();

        purge_tmp(dir.path()).await;

        assert!(dir.path().join("users.json").exists());
        assert!(!dir.path().join("users.json.tallytmp.1.0").exists());
    }
}

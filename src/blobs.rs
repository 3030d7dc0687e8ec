//! The `user-files` blob bucket, namespaced by user id on the local
//! filesystem. Keys look like `{user_id}/{epoch_millis}_{name}`; the
//! millisecond prefix keeps concurrent uploads of the same file name
//! from colliding (not guaranteed within the same millisecond, an
//! accepted risk).

use crate::errors::AppError;
use crate::models::FileEntry;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

pub const MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024; // 1 GiB
pub const LIST_PAGE_SIZE: usize = 100;

/// Rejects oversized uploads before anything touches the store.
pub fn ensure_within_limit(size: u64) -> Result<(), AppError> {
    if size > MAX_FILE_SIZE {
        return Err(AppError::validation("file size exceeds 1GB limit"));
    }
    Ok(())
}

/// File names become path components; keep them single-segment.
pub fn validate_name(name: &str) -> Result<(), AppError> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name == "." || name == ".."
    {
        return Err(AppError::validation("invalid file name"));
    }
    Ok(())
}

pub fn object_name(now: DateTime<Utc>, original: &str) -> String {
    format!("{}_{}", now.timestamp_millis(), original)
}

/// `{new_base}.{ext of old}`, matching how the UI renames; a name
/// without an extension keeps just the new base.
pub fn renamed_object(old_name: &str, new_base: &str) -> String {
    match old_name.rsplit_once('.') {
        Some((_, ext)) => format!("{new_base}.{ext}"),
        None => new_base.to_string(),
    }
}

fn user_dir(root: &Path, user_id: Uuid) -> PathBuf {
    root.join(user_id.to_string())
}

pub async fn upload(
    root: &Path,
    user_id: Uuid,
    name: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    validate_name(name)?;
    ensure_within_limit(bytes.len() as u64)?;
    let dir = user_dir(root, user_id);
    fs::create_dir_all(&dir).await?;
    let object = object_name(Utc::now(), name);
    fs::write(dir.join(&object), bytes).await?;
    Ok(object)
}

/// Entries newest first, first page only.
pub async fn list(root: &Path, user_id: Uuid) -> Result<Vec<FileEntry>, AppError> {
    let dir = user_dir(root, user_id);
    let mut entries = Vec::new();
    let mut reader = match fs::read_dir(&dir).await {
        Ok(reader) => reader,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
        Err(err) => return Err(err.into()),
    };
    while let Some(entry) = reader.next_entry().await? {
        let meta = entry.metadata().await?;
        if !meta.is_file() {
            continue;
        }
        let created = meta
            .created()
            .or_else(|_| meta.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        entries.push(FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: meta.len(),
            created_at: created,
        });
    }
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.name.cmp(&a.name)));
    entries.truncate(LIST_PAGE_SIZE);
    Ok(entries)
}

pub async fn download(root: &Path, user_id: Uuid, name: &str) -> Result<Vec<u8>, AppError> {
    validate_name(name)?;
    match fs::read(user_dir(root, user_id).join(name)).await {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::NotFound("file"))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn remove(root: &Path, user_id: Uuid, name: &str) -> Result<(), AppError> {
    validate_name(name)?;
    match fs::remove_file(user_dir(root, user_id).join(name)).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::NotFound("file"))
        }
        Err(err) => Err(err.into()),
    }
}

/// Rename as a download / upload-under-new-key / delete-old-key saga.
/// The store has no atomic move, so a failure after the copy lands
/// surfaces as `RenameInterrupted` with both keys possibly present.
pub async fn rename(
    root: &Path,
    user_id: Uuid,
    old_name: &str,
    new_base: &str,
) -> Result<String, AppError> {
    if new_base.trim().is_empty() {
        return Err(AppError::validation("new file name is required"));
    }
    let new_name = renamed_object(old_name, new_base.trim());
    validate_name(old_name)?;
    validate_name(&new_name)?;

    let bytes = download(root, user_id, old_name).await?;
    let dir = user_dir(root, user_id);
    fs::write(dir.join(&new_name), &bytes).await?;
    if let Err(err) = fs::remove_file(dir.join(old_name)).await {
        return Err(AppError::RenameInterrupted {
            copied: true,
            message: err.to_string(),
        });
    }
    Ok(new_name)
}

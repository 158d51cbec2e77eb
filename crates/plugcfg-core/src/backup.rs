use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::paths::ConfigPaths;

/// Slots tried after the probed index when a backup file appears between
/// probing and claiming it.
const MAX_CLAIM_ATTEMPTS: u64 = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFile {
    pub index: u64,
    pub path: PathBuf,
}

/// Smallest backup index `k >= 0` whose file does not exist yet.
///
/// Recomputed by probing on every call; nothing is cached between calls.
///
/// # Errors
/// Returns an error if the existence of a candidate cannot be determined.
pub fn next_backup_index(paths: &ConfigPaths) -> std::io::Result<u64> {
    let mut index = 0;
    while paths.backup_file(index).try_exists()? {
        index += 1;
    }
    Ok(index)
}

/// Path of the next unused backup slot for `paths`.
///
/// # Errors
/// Returns an error if the existence of a candidate cannot be determined.
pub fn next_backup_path(paths: &ConfigPaths) -> std::io::Result<BackupFile> {
    let index = next_backup_index(paths)?;
    Ok(BackupFile {
        index,
        path: paths.backup_file(index),
    })
}

/// Existing backups for `paths`, ordered by index.
///
/// # Errors
/// Returns an error if the config directory exists but cannot be listed.
pub fn list_backups(paths: &ConfigPaths) -> std::io::Result<Vec<BackupFile>> {
    let entries = match std::fs::read_dir(paths.dir()) {
        Ok(entries) => entries,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => return Err(error),
    };

    let mut backups = Vec::new();
    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(index) = file_name.to_str().and_then(|name| paths.backup_index(name)) else {
            continue;
        };
        backups.push(BackupFile {
            index,
            path: entry.path(),
        });
    }

    backups.sort_by_key(|backup| backup.index);
    Ok(backups)
}

/// Copy `source` into the next free backup slot.
///
/// The slot is claimed with `create_new`, so an existing backup is never
/// overwritten; if the probed slot is taken by the time it is claimed the
/// next one is tried. A partially written backup is removed on failure.
pub(crate) fn copy_to_next_backup(
    paths: &ConfigPaths,
    source: &Path,
) -> Result<BackupFile, StoreError> {
    let mut reader = File::open(source)
        .map_err(|error| StoreError::io("failed to open config for backup", source, error))?;

    let first = next_backup_index(paths)
        .map_err(|error| StoreError::io("failed to probe backup slots", paths.dir(), error))?;

    for index in first..first.saturating_add(MAX_CLAIM_ATTEMPTS) {
        let path = paths.backup_file(index);
        let mut writer = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(error) => return Err(StoreError::io("failed to create backup", &path, error)),
        };

        let copied = std::io::copy(&mut reader, &mut writer).and_then(|_| writer.sync_all());
        if let Err(error) = copied {
            drop(writer);
            let _ = std::fs::remove_file(&path);
            return Err(StoreError::io("failed to copy backup", &path, error));
        }

        return Ok(BackupFile { index, path });
    }

    Err(StoreError::BackupExhausted {
        path: paths.backup_file(first),
    })
}

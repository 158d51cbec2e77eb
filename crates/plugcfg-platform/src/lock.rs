use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("config is locked by another writer: {}", path.display())]
    Contended { path: PathBuf },
    #[error("{context} ({}): {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LockError {
    fn io(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Exclusive advisory lock scoped to one config name.
///
/// Released when dropped. The lock file itself is left in place and holds
/// the PID of the last owner.
#[derive(Debug)]
pub struct NameLock {
    file: File,
    path: PathBuf,
}

impl NameLock {
    /// Block until the lock at `path` is held.
    ///
    /// # Errors
    /// Returns an error if the lock file cannot be opened or locked.
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        let file = open_lock_file(path)?;
        file.lock_exclusive()
            .map_err(|error| LockError::io("failed to acquire config lock", path, error))?;
        Self::finish(file, path)
    }

    /// Take the lock at `path` without waiting.
    ///
    /// # Errors
    /// Returns [`LockError::Contended`] if another handle holds the lock, or
    /// an I/O error if the lock file cannot be opened or locked.
    pub fn try_acquire(path: &Path) -> Result<Self, LockError> {
        let file = open_lock_file(path)?;
        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(error) if error.kind() == std::io::ErrorKind::WouldBlock => {
                return Err(LockError::Contended {
                    path: path.to_path_buf(),
                });
            }
            Err(error) => {
                return Err(LockError::io("failed to acquire config lock", path, error));
            }
        }
        Self::finish(file, path)
    }

    fn finish(mut file: File, path: &Path) -> Result<Self, LockError> {
        file.set_len(0)
            .and_then(|()| file.seek(SeekFrom::Start(0)).map(|_| ()))
            .and_then(|()| writeln!(file, "{}", std::process::id()))
            .map_err(|error| LockError::io("failed to write lock metadata", path, error))?;

        log::debug!("Acquired config lock {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for NameLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn open_lock_file(path: &Path) -> Result<File, LockError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|error| LockError::io("failed to create lock directory", path, error))?;
    }

    OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|error| LockError::io("failed to open lock file", path, error))
}

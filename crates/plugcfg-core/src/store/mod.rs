//! Versioned config store over a root directory.
//!
//! A store assumes it is the only writer for a given config name. Nothing
//! stops two processes from racing between the backup probe and the write;
//! enable [`StoreOptions::lock`] when several writers may share a name.

use std::path::{Path, PathBuf};

use plugcfg_platform::NameLock;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::atomic::write_atomic;
use crate::backup::{self, BackupFile};
use crate::codec;
use crate::error::StoreError;
use crate::name::{ConfigName, InvalidName, NameResolver};
use crate::options::StoreOptions;
use crate::paths::ConfigPaths;
use crate::versioned::VersionedConfig;


/// What an upgrade did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport<V> {
    pub from: V,
    pub to: V,
    pub backup: BackupFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome<V> {
    /// The config name could not be resolved; defaults were returned.
    Unresolved,
    /// No live file existed; defaults were written.
    Created,
    /// The live file was already at the current version.
    Current,
    Upgraded(UpdateReport<V>),
}

pub struct ConfigStore<R = ConfigName> {
    root: PathBuf,
    resolver: R,
    options: StoreOptions,
}

impl ConfigStore<ConfigName> {
    /// Store for an explicitly named config.
    ///
    /// # Errors
    /// Returns an error if `name` is not a valid config name.
    pub fn named(root: impl AsRef<Path>, name: &str) -> Result<Self, InvalidName> {
        Ok(Self::new(root, ConfigName::new(name)?))
    }
}

impl<R: NameResolver> ConfigStore<R> {
    #[must_use]
    pub fn new(root: impl AsRef<Path>, resolver: R) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            resolver,
            options: StoreOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// File layout for the currently resolved name, if any.
    #[must_use]
    pub fn paths(&self) -> Option<ConfigPaths> {
        self.resolver
            .resolve()
            .map(|name| ConfigPaths::new(&self.root, &name))
    }

    /// Bring the on-disk config up to `T::current_version()`.
    ///
    /// Returns `Ok(false)` without touching the filesystem when `config` is
    /// already current or when the config name cannot be resolved. Otherwise
    /// the live file is copied to the next free `N-{k}.bak`, the version of
    /// `config` is bumped and `config` is written over the live file.
    ///
    /// # Errors
    /// Returns an error if the backup copy, the serialization or the write
    /// fails. A failed backup leaves the live file and `config` untouched.
    pub fn update<T: VersionedConfig>(&self, config: &mut T) -> Result<bool, StoreError> {
        Ok(self.update_with_report(config)?.is_some())
    }

    /// Same as [`Self::update`] but reports the old version and the backup.
    ///
    /// # Errors
    /// See [`Self::update`].
    pub fn update_with_report<T: VersionedConfig>(
        &self,
        config: &mut T,
    ) -> Result<Option<UpdateReport<T::Version>>, StoreError> {
        let Some(paths) = self.resolve_paths("update") else {
            return Ok(None);
        };
        self.upgrade(&paths, config)
    }

    /// Parse the live file into a fresh `T`.
    ///
    /// Falls back to `T::default()` only when the config name cannot be
    /// resolved. A missing or malformed file is an error.
    ///
    /// # Errors
    /// Returns an error if the live file cannot be read or parsed.
    pub fn reload<T: VersionedConfig>(&self) -> Result<T, StoreError> {
        let Some(paths) = self.resolve_paths("reload") else {
            return Ok(T::default());
        };
        log::debug!("Reloading config {}", paths.name());
        read_config(&paths.live_file())
    }

    /// Write `config` over the live file without taking a backup.
    ///
    /// Returns `Ok(false)` without touching the filesystem when the config
    /// name cannot be resolved.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save<T: Serialize>(&self, config: &T) -> Result<bool, StoreError> {
        let Some(paths) = self.resolve_paths("save") else {
            return Ok(false);
        };
        let _lock = self.lock(&paths)?;
        self.write_live(&paths, config)?;
        Ok(true)
    }

    /// Load the config, creating it from defaults or upgrading it as needed.
    ///
    /// # Errors
    /// Returns an error if the live file cannot be read, parsed, backed up
    /// or written.
    pub fn load_or_create<T: VersionedConfig>(
        &self,
    ) -> Result<(T, LoadOutcome<T::Version>), StoreError> {
        let Some(paths) = self.resolve_paths("load") else {
            return Ok((T::default(), LoadOutcome::Unresolved));
        };

        let live = paths.live_file();
        let exists = live
            .try_exists()
            .map_err(|error| StoreError::io("failed to check config", &live, error))?;

        if !exists {
            let config = T::default();
            let _lock = self.lock(&paths)?;
            self.write_live(&paths, &config)?;
            log::info!("Created config {} at {}", paths.name(), live.display());
            return Ok((config, LoadOutcome::Created));
        }

        let mut config: T = read_config(&live)?;
        let outcome = match self.upgrade(&paths, &mut config)? {
            Some(report) => LoadOutcome::Upgraded(report),
            None => LoadOutcome::Current,
        };
        Ok((config, outcome))
    }

    /// Backups taken so far, oldest first. Empty when the name is unresolved.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be listed.
    pub fn backups(&self) -> Result<Vec<BackupFile>, StoreError> {
        let Some(paths) = self.resolve_paths("list backups") else {
            return Ok(Vec::new());
        };
        backup::list_backups(&paths)
            .map_err(|error| StoreError::io("failed to list backups", paths.dir(), error))
    }

    fn resolve_paths(&self, operation: &str) -> Option<ConfigPaths> {
        let paths = self.paths();
        if paths.is_none() {
            log::debug!("Config name could not be resolved, skipping {operation}");
        }
        paths
    }

    fn upgrade<T: VersionedConfig>(
        &self,
        paths: &ConfigPaths,
        config: &mut T,
    ) -> Result<Option<UpdateReport<T::Version>>, StoreError> {
        let expected = T::current_version();
        if *config.version() == expected {
            log::debug!("Config {} is current ({expected:?})", paths.name());
            return Ok(None);
        }

        let _lock = self.lock(paths)?;
        let backup = backup::copy_to_next_backup(paths, &paths.live_file())?;

        let from = config.version().clone();
        config.set_version(expected.clone());
        self.write_live(paths, config)?;

        log::info!(
            "Upgraded config {} from {from:?} to {expected:?}, previous file kept at {}",
            paths.name(),
            backup.path.display()
        );

        Ok(Some(UpdateReport {
            from,
            to: expected,
            backup,
        }))
    }

    fn write_live<T: Serialize + ?Sized>(
        &self,
        paths: &ConfigPaths,
        config: &T,
    ) -> Result<(), StoreError> {
        let data = codec::to_pretty_json(config, self.options.indent)
            .map_err(StoreError::Serialize)?;

        paths.ensure_dir().map_err(|error| {
            StoreError::io("failed to create config directory", paths.dir(), error)
        })?;

        let live = paths.live_file();
        let written = if self.options.atomic_writes {
            write_atomic(&live, &data)
        } else {
            std::fs::write(&live, &data)
        };
        written.map_err(|error| StoreError::io("failed to write config", &live, error))
    }

    fn lock(&self, paths: &ConfigPaths) -> Result<Option<NameLock>, StoreError> {
        if !self.options.lock {
            return Ok(None);
        }
        Ok(Some(NameLock::acquire(&paths.lock_file())?))
    }
}

fn read_config<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let text = std::fs::read_to_string(path)
        .map_err(|error| StoreError::io("failed to read config", path, error))?;
    codec::from_lenient_json(&text).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

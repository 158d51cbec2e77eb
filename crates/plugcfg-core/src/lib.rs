//! Versioned, file-backed configuration objects.
//!
//! Each config lives at `ROOT/NAME/NAME.json`. When a loaded config reports
//! an older version than the running code expects, [`ConfigStore::update`]
//! copies the live file to the next free `ROOT/NAME/NAME-{k}.bak`, bumps the
//! version and rewrites the file. Backups are never overwritten or pruned.

mod atomic;
pub mod backup;
pub mod codec;
mod error;
mod name;
mod options;
mod paths;
mod store;
mod versioned;

pub use backup::{BackupFile, list_backups, next_backup_index, next_backup_path};
pub use error::StoreError;
pub use name::{ConfigName, FnResolver, InvalidName, NameResolver};
pub use options::StoreOptions;
pub use paths::{BACKUP_EXTENSION, CONFIG_EXTENSION, ConfigPaths};
pub use store::{ConfigStore, LoadOutcome, UpdateReport};
pub use versioned::{VersionedConfig, default_reports_current_version};

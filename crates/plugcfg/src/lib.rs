//! Host-side entry point for plugin configuration.
//!
//! Re-exports the store from `plugcfg-core` and adds what a host process
//! needs around it:
//! - [`HostEnvironment`]: where configs live and how stores are tuned.
//! - [`host_store!`]: a store named after the calling crate.
//! - [`logging`]: `simplelog` setup for hosts without their own logger.

mod host;
pub mod logging;

pub use host::{HostEnvironment, OPTIONS_FILE_NAME};
pub use plugcfg_core::{
    BackupFile, ConfigName, ConfigPaths, ConfigStore, FnResolver, InvalidName, LoadOutcome,
    NameResolver, StoreError, StoreOptions, UpdateReport, VersionedConfig, caller_name,
    versioned_config,
};
pub use plugcfg_platform::{ConfigRoot, RootError, RootSource};

/// Store for the crate that invokes the macro, rooted in a [`HostEnvironment`].
#[macro_export]
macro_rules! host_store {
    ($env:expr) => {
        $env.store_with($crate::caller_name!())
    };
}

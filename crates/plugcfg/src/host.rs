use std::path::{Path, PathBuf};

use plugcfg_core::{ConfigName, ConfigStore, InvalidName, NameResolver, StoreOptions, codec};
use plugcfg_platform::{ConfigRoot, RootError};

/// Host-level options file, read from the root directory.
pub const OPTIONS_FILE_NAME: &str = "plugcfg.json";

const LOG_FILE_NAME: &str = "plugcfg.log";

#[derive(Debug, Clone)]
pub struct HostEnvironment {
    root: ConfigRoot,
    options: StoreOptions,
}

impl HostEnvironment {
    #[must_use]
    pub fn new(root: ConfigRoot) -> Self {
        Self {
            root,
            options: StoreOptions::default(),
        }
    }

    /// Locate the config root for `app_name` and read host options from it.
    ///
    /// # Errors
    /// Returns an error when the config root cannot be determined.
    pub fn discover(explicit_root: Option<&Path>, app_name: &str) -> Result<Self, RootError> {
        let root = ConfigRoot::discover(explicit_root, app_name)?;
        let options = load_options(&root.dir().join(OPTIONS_FILE_NAME));
        Ok(Self { root, options })
    }

    #[must_use]
    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn root(&self) -> &ConfigRoot {
        &self.root
    }

    #[must_use]
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.root.dir().join(LOG_FILE_NAME)
    }

    /// Send `plugcfg` log output to [`Self::log_file`].
    ///
    /// Returns `false` if a logger was already installed.
    pub fn init_logging(&self, debug_enabled: bool) -> bool {
        crate::logging::init_logging(
            &self.log_file(),
            debug_enabled,
            crate::logging::DEFAULT_MAX_LOG_SIZE,
        )
    }

    /// Store for an explicitly named config.
    ///
    /// # Errors
    /// Returns an error if `name` is not a valid config name.
    pub fn store_for(&self, name: &str) -> Result<ConfigStore<ConfigName>, InvalidName> {
        Ok(self.store_with(ConfigName::new(name)?))
    }

    #[must_use]
    pub fn store_with<R: NameResolver>(&self, resolver: R) -> ConfigStore<R> {
        ConfigStore::new(self.root.dir(), resolver).with_options(self.options.clone())
    }
}

fn load_options(path: &Path) -> StoreOptions {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return StoreOptions::default();
        }
        Err(error) => {
            log::warn!("Could not read {}: {error}", path.display());
            return StoreOptions::default();
        }
    };

    codec::from_lenient_json(&content).unwrap_or_else(|error| {
        log::warn!("Ignoring malformed {}: {error}", path.display());
        StoreOptions::default()
    })
}

#[cfg(test)]
mod tests {
    use plugcfg_core::{StoreOptions, VersionedConfig};
    use plugcfg_platform::{ConfigRoot, RootSource};
    use serde::{Deserialize, Serialize};

    use super::{HostEnvironment, OPTIONS_FILE_NAME, load_options};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct TeleportSettings {
        version: u32,
        #[serde(default)]
        cooldown_secs: u64,
    }

    impl Default for TeleportSettings {
        fn default() -> Self {
            Self {
                version: 5,
                cooldown_secs: 60,
            }
        }
    }

    crate::versioned_config!(TeleportSettings, version: u32 = 5);

    #[test]
    fn discover_reads_host_options() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        std::fs::write(
            temp_dir.path().join(OPTIONS_FILE_NAME),
            "{ \"indent\": 4, // wider\n \"lock\": true }",
        )
        .expect("options file should be written");

        let env = HostEnvironment::discover(Some(temp_dir.path()), "server")
            .expect("explicit root should resolve");

        assert_eq!(env.root().source(), RootSource::Explicit);
        assert_eq!(env.options().indent, 4);
        assert!(env.options().lock);
        assert!(env.options().atomic_writes);
    }

    #[test]
    fn malformed_options_fall_back_to_defaults() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let path = temp_dir.path().join(OPTIONS_FILE_NAME);
        std::fs::write(&path, "{not-valid-json").expect("options file should be written");

        assert_eq!(load_options(&path), StoreOptions::default());
        assert_eq!(
            load_options(&temp_dir.path().join("missing.json")),
            StoreOptions::default()
        );
    }

    #[test]
    fn store_for_places_config_under_root() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let env = HostEnvironment::new(ConfigRoot::explicit(temp_dir.path()));

        let store = env.store_for("teleport").expect("name should be valid");
        let (config, _) = store
            .load_or_create::<TeleportSettings>()
            .expect("config should be created");

        assert_eq!(config.version, TeleportSettings::current_version());
        assert!(
            temp_dir
                .path()
                .join("teleport")
                .join("teleport.json")
                .is_file()
        );
        assert!(env.store_for("../escape").is_err());
    }

    #[test]
    fn host_store_is_named_after_calling_crate() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let env = HostEnvironment::new(ConfigRoot::explicit(temp_dir.path()))
            .with_options(StoreOptions {
                indent: 8,
                ..StoreOptions::default()
            });

        let store = crate::host_store!(env);
        let paths = store.paths().expect("package name should resolve");

        assert_eq!(paths.name().as_str(), "plugcfg");
        assert_eq!(paths.live_file(), temp_dir.path().join("plugcfg").join("plugcfg.json"));
        assert_eq!(store.options().indent, 8);
    }

    #[test]
    fn log_file_lives_in_root() {
        let env = HostEnvironment::new(ConfigRoot::explicit("/srv/game"));

        assert_eq!(env.log_file(), std::path::Path::new("/srv/game").join("plugcfg.log"));
    }
}

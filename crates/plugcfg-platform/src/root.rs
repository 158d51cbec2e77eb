use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable that overrides the platform configuration root.
pub const ROOT_ENV_VAR: &str = "PLUGCFG_CONFIG_ROOT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RootError {
    #[error("Could not determine config directory")]
    ConfigDirUnavailable,
    #[error("Application name must not be empty")]
    EmptyAppName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSource {
    Explicit,
    Environment,
    Platform,
}

/// Directory under which every plugin's configuration folder lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRoot {
    dir: PathBuf,
    source: RootSource,
}

impl ConfigRoot {
    #[must_use]
    pub fn explicit(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            source: RootSource::Explicit,
        }
    }

    /// Resolve the configuration root for `app_name`.
    ///
    /// Resolution order: `explicit` → `PLUGCFG_CONFIG_ROOT` → the platform
    /// config directory joined with `app_name`.
    ///
    /// # Errors
    /// Returns an error when no explicit root or override is given and the
    /// platform config directory cannot be determined, or when `app_name` is
    /// needed but empty.
    pub fn discover(explicit: Option<&Path>, app_name: &str) -> Result<Self, RootError> {
        Self::resolve(
            explicit,
            std::env::var_os(ROOT_ENV_VAR),
            dirs::config_dir(),
            app_name,
        )
    }

    fn resolve(
        explicit: Option<&Path>,
        env_override: Option<OsString>,
        platform_dir: Option<PathBuf>,
        app_name: &str,
    ) -> Result<Self, RootError> {
        if let Some(dir) = explicit {
            return Ok(Self::explicit(dir));
        }

        if let Some(dir) = env_override.filter(|value| !value.is_empty()) {
            log::debug!("Using config root from {ROOT_ENV_VAR}");
            return Ok(Self {
                dir: PathBuf::from(dir),
                source: RootSource::Environment,
            });
        }

        let app_name = app_name.trim();
        if app_name.is_empty() {
            return Err(RootError::EmptyAppName);
        }

        let base = platform_dir.ok_or(RootError::ConfigDirUnavailable)?;
        Ok(Self {
            dir: base.join(app_name),
            source: RootSource::Platform,
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn source(&self) -> RootSource {
        self.source
    }

    /// Ensure the root directory exists on disk.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }
}

impl AsRef<Path> for ConfigRoot {
    fn as_ref(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::path::{Path, PathBuf};

    use super::{ConfigRoot, RootError, RootSource};

    #[test]
    fn explicit_root_wins_over_everything() {
        let root = ConfigRoot::resolve(
            Some(Path::new("/srv/game")),
            Some(OsString::from("/from/env")),
            Some(PathBuf::from("/home/u/.config")),
            "server",
        )
        .expect("explicit root should resolve");

        assert_eq!(root.dir(), Path::new("/srv/game"));
        assert_eq!(root.source(), RootSource::Explicit);
    }

    #[test]
    fn environment_override_is_used_verbatim() {
        let root = ConfigRoot::resolve(
            None,
            Some(OsString::from("/from/env")),
            Some(PathBuf::from("/home/u/.config")),
            "server",
        )
        .expect("env root should resolve");

        assert_eq!(root.dir(), Path::new("/from/env"));
        assert_eq!(root.source(), RootSource::Environment);
    }

    #[test]
    fn empty_environment_override_is_ignored() {
        let root = ConfigRoot::resolve(
            None,
            Some(OsString::new()),
            Some(PathBuf::from("/home/u/.config")),
            "server",
        )
        .expect("platform root should resolve");

        assert_eq!(root.dir(), Path::new("/home/u/.config").join("server"));
        assert_eq!(root.source(), RootSource::Platform);
    }

    #[test]
    fn missing_platform_dir_is_an_error() {
        let result = ConfigRoot::resolve(None, None, None, "server");
        assert_eq!(result, Err(RootError::ConfigDirUnavailable));
    }

    #[test]
    fn blank_app_name_is_rejected() {
        let result = ConfigRoot::resolve(None, None, Some(PathBuf::from("/cfg")), "  ");
        assert_eq!(result, Err(RootError::EmptyAppName));
    }

    #[test]
    fn ensure_dir_creates_nested_root() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let root = ConfigRoot::explicit(temp_dir.path().join("a").join("b"));

        root.ensure_dir().expect("root should be created");

        assert!(root.dir().is_dir());
    }
}

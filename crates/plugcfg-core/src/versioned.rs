use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A configuration object persisted as JSON and tagged with a schema version.
///
/// `current_version` is the version the running code expects. A value
/// produced by `Default::default()` must report that same version; the store
/// relies on it when it falls back to defaults.
///
/// Every field other than the version is owned by the implementor. Fields
/// added in a newer version should carry `#[serde(default)]` so that older
/// files still parse and are filled in when rewritten.
pub trait VersionedConfig: Serialize + DeserializeOwned + Default {
    type Version: PartialEq + Debug + Clone;

    fn current_version() -> Self::Version;

    fn version(&self) -> &Self::Version;

    fn set_version(&mut self, version: Self::Version);

    fn is_current(&self) -> bool {
        *self.version() == Self::current_version()
    }
}

/// Whether `T::default()` reports `T::current_version()`.
#[must_use]
pub fn default_reports_current_version<T: VersionedConfig>() -> bool {
    T::default().is_current()
}

/// Implements [`VersionedConfig`] for a struct with a plain version field.
///
/// ```ignore
/// versioned_config!(ChatSettings, version: u32 = 3);
/// ```
#[macro_export]
macro_rules! versioned_config {
    ($ty:ty, $field:ident : $version:ty = $current:expr) => {
        impl $crate::VersionedConfig for $ty {
            type Version = $version;

            fn current_version() -> Self::Version {
                $current
            }

            fn version(&self) -> &Self::Version {
                &self.$field
            }

            fn set_version(&mut self, version: Self::Version) {
                self.$field = version;
            }
        }
    };
}

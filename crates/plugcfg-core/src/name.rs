use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Logical name of one plugin's configuration.
///
/// Used verbatim as a directory name and file stem, so it must be a single
/// non-empty path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConfigName(String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidName {
    #[error("config name is empty")]
    Empty,
    #[error("config name has leading or trailing whitespace: {0:?}")]
    Whitespace(String),
    #[error("config name contains forbidden character {found:?}: {name:?}")]
    ForbiddenChar { name: String, found: char },
    #[error("config name is reserved: {0:?}")]
    Reserved(String),
}

const FORBIDDEN_CHARS: [char; 3] = ['/', '\\', '\0'];

impl ConfigName {
    /// Validate and wrap a logical config name.
    ///
    /// # Errors
    /// Returns an error if the name is empty, padded with whitespace, is `.`
    /// or `..`, or contains a path separator or NUL.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidName> {
        let name = name.into();

        if name.is_empty() {
            return Err(InvalidName::Empty);
        }
        if name.trim() != name {
            return Err(InvalidName::Whitespace(name));
        }
        if let Some(found) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
            return Err(InvalidName::ForbiddenChar { name, found });
        }
        if name == "." || name == ".." {
            return Err(InvalidName::Reserved(name));
        }

        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ConfigName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ConfigName {
    type Err = InvalidName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for ConfigName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Supplies the logical config name for the current caller.
///
/// Returning `None` means the caller's identity could not be determined;
/// the store then refuses to touch the filesystem.
pub trait NameResolver {
    fn resolve(&self) -> Option<ConfigName>;
}

impl NameResolver for ConfigName {
    fn resolve(&self) -> Option<ConfigName> {
        Some(self.clone())
    }
}

impl NameResolver for Option<ConfigName> {
    fn resolve(&self) -> Option<ConfigName> {
        self.clone()
    }
}

impl<R: NameResolver + ?Sized> NameResolver for &R {
    fn resolve(&self) -> Option<ConfigName> {
        (**self).resolve()
    }
}

impl<R: NameResolver + ?Sized> NameResolver for Box<R> {
    fn resolve(&self) -> Option<ConfigName> {
        (**self).resolve()
    }
}

/// Adapts a closure that looks up a raw name, e.g. from host state.
///
/// Names that fail validation resolve to `None`.
pub struct FnResolver<F>(pub F);

impl<F> NameResolver for FnResolver<F>
where
    F: Fn() -> Option<String>,
{
    fn resolve(&self) -> Option<ConfigName> {
        (self.0)().and_then(|raw| ConfigName::new(raw).ok())
    }
}

/// Resolves to the package name of the crate that invokes the macro.
///
/// Expands to an `Option<ConfigName>`, which is itself a [`NameResolver`].
#[macro_export]
macro_rules! caller_name {
    () => {
        $crate::ConfigName::new(env!("CARGO_PKG_NAME")).ok()
    };
}

use std::path::{Path, PathBuf};

use crate::name::ConfigName;

pub const CONFIG_EXTENSION: &str = "json";
pub const BACKUP_EXTENSION: &str = "bak";

/// File layout for one logical config under a root directory.
///
/// For name `N` under root `R`: the live file is `R/N/N.json` and backups
/// are `R/N/N-{k}.bak`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    dir: PathBuf,
    name: ConfigName,
}

impl ConfigPaths {
    #[must_use]
    pub fn new(root: impl AsRef<Path>, name: &ConfigName) -> Self {
        Self {
            dir: root.as_ref().join(name.as_str()),
            name: name.clone(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &ConfigName {
        &self.name
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn live_file(&self) -> PathBuf {
        self.dir.join(format!("{}.{CONFIG_EXTENSION}", self.name))
    }

    #[must_use]
    pub fn backup_file(&self, index: u64) -> PathBuf {
        self.dir.join(format!("{}-{index}.{BACKUP_EXTENSION}", self.name))
    }

    #[must_use]
    pub fn lock_file(&self) -> PathBuf {
        self.dir.join(format!(".{}.lock", self.name))
    }

    /// Create the per-name directory if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    /// Index encoded in a backup file name, if `file_name` is one of ours.
    ///
    /// Only the canonical decimal form produced by [`Self::backup_file`] is
    /// accepted, so `N-01.bak` or `N-+1.bak` are not backups.
    #[must_use]
    pub fn backup_index(&self, file_name: &str) -> Option<u64> {
        let digits = file_name
            .strip_prefix(self.name.as_str())?
            .strip_prefix('-')?
            .strip_suffix(BACKUP_EXTENSION)?
            .strip_suffix('.')?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return None;
        }
        digits.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::ConfigPaths;
    use crate::name::ConfigName;

    fn chat_paths() -> ConfigPaths {
        let name = ConfigName::new("chat").expect("name should be valid");
        ConfigPaths::new("/srv/game/configs", &name)
    }

    #[test]
    fn layout_follows_name_directory_scheme() {
        let paths = chat_paths();
        let dir = Path::new("/srv/game/configs").join("chat");

        assert_eq!(paths.dir(), dir.as_path());
        assert_eq!(paths.live_file(), dir.join("chat.json"));
        assert_eq!(paths.backup_file(0), dir.join("chat-0.bak"));
        assert_eq!(paths.backup_file(12), dir.join("chat-12.bak"));
        assert_eq!(paths.lock_file(), dir.join(".chat.lock"));
    }

    #[test]
    fn same_name_maps_to_same_paths() {
        assert_eq!(chat_paths(), chat_paths());
        assert_eq!(chat_paths().live_file(), chat_paths().live_file());
    }

    #[test]
    fn backup_index_parses_only_canonical_names() {
        let paths = chat_paths();

        assert_eq!(paths.backup_index("chat-0.bak"), Some(0));
        assert_eq!(paths.backup_index("chat-42.bak"), Some(42));
        assert_eq!(paths.backup_index("chat-01.bak"), None);
        assert_eq!(paths.backup_index("chat-+1.bak"), None);
        assert_eq!(paths.backup_index("chat-.bak"), None);
        assert_eq!(paths.backup_index("chat.json"), None);
        assert_eq!(paths.backup_index("chatter-1.bak"), None);
        assert_eq!(paths.backup_index("chat-1.bak.tmp"), None);
    }
}

use serde::{Deserialize, Serialize};

use crate::codec::DEFAULT_INDENT;

/// Tunables for a [`crate::ConfigStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Spaces per indentation level in written files.
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Write the live file through a temp file and rename.
    #[serde(default = "default_true")]
    pub atomic_writes: bool,

    /// Hold a per-name advisory lock while writing.
    #[serde(default)]
    pub lock: bool,
}

fn default_indent() -> usize {
    DEFAULT_INDENT
}

fn default_true() -> bool {
    true
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            atomic_writes: true,
            lock: false,
        }
    }
}

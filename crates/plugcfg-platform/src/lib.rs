mod lock;
mod root;

pub use lock::{LockError, NameLock};
pub use root::{ConfigRoot, ROOT_ENV_VAR, RootError, RootSource};

//! `simplelog` setup for hosts.
//!
//! Library crates only emit through the `log` facade; a host that has no
//! logger of its own can call [`init_logging`] once at start-up.

#[cfg(debug_assertions)]
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use simplelog::{CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, WriteLogger};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;

/// Size past which the upgrade log is cut down at start-up.
pub const DEFAULT_MAX_LOG_SIZE: u64 = 1024 * 1024;

/// Keep roughly the newest `max_log_size / 2` bytes of `log_path`, starting
/// at a line boundary, once the file has grown past `max_log_size`.
fn trim_log_file(log_path: &Path, max_log_size: u64) -> io::Result<()> {
    let size = match std::fs::metadata(log_path) {
        Ok(metadata) => metadata.len(),
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(error) => return Err(error),
    };
    if size <= max_log_size {
        return Ok(());
    }

    let contents = std::fs::read(log_path)?;
    let keep = usize::try_from(max_log_size / 2).unwrap_or(contents.len());
    let cut = contents.len().saturating_sub(keep);
    let start = contents[cut..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(contents.len(), |pos| cut + pos + 1);
    std::fs::write(log_path, &contents[start..])
}

/// Install a global logger appending to `log_path` (and the terminal in
/// debug builds).
///
/// Returns `false` when the log file cannot be opened or another logger is
/// already installed.
pub fn init_logging(log_path: &Path, debug_enabled: bool, max_log_size: u64) -> bool {
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = trim_log_file(log_path, max_log_size);

    let Ok(file) = OpenOptions::new().create(true).append(true).open(log_path) else {
        return false;
    };

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("plugcfg")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    #[cfg(debug_assertions)]
    loggers.push(TermLogger::new(
        LevelFilter::Debug,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));

    loggers.push(WriteLogger::new(LevelFilter::Debug, config, file));

    if CombinedLogger::init(loggers).is_err() {
        return false;
    }

    set_logging_enabled(debug_enabled);
    log::info!("Config log opened at {}", log_path.display());
    true
}

/// Toggle between debug-level and info-level output.
pub fn set_logging_enabled(debug_enabled: bool) {
    if debug_enabled {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }
}

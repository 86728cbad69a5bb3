// Conditional logging macros - only active in debug builds

use env_logger::{Builder, Env, Target};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}

const DEFAULT_FILTER: &str = "warn";
const LOG_DIR_NAME: &str = "number-guesser";
const LOG_FILE_NAME: &str = "number-guesser.log";

/// Where log records go.
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    /// Used by the full-screen interface so records don't land on the screen.
    File(PathBuf),
}

/// `<cache dir>/number-guesser/number-guesser.log`, when the platform has a
/// cache directory.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join(LOG_DIR_NAME).join(LOG_FILE_NAME))
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global logger. `RUST_LOG` overrides the default `warn` filter.
///
/// Calling this twice is harmless: the second call leaves the first logger in
/// place.
pub fn init_logging(target: &LogTarget) -> io::Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    match target {
        LogTarget::Stderr => {
            builder.target(Target::Stderr);
        }
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            builder.target(Target::Pipe(Box::new(file)));
            builder.write_style(env_logger::WriteStyle::Never);
        }
    }
    if builder.try_init().is_err() {
        debug_log!("logger already initialised");
    }
    Ok(())
}

//! Logging infrastructure for clarify.
//!
//! Provides structured file logging with daily rotation to platform-standard directories.
//! The terminal is owned by the UI, so nothing is ever logged to stdout or stderr.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, reload};

/// Handle for swapping the log filter after the config has been read.
pub type ReloadHandle = reload::Handle<EnvFilter, Registry>;

/// Result of initializing the logging system.
pub struct LoggingContext {
    /// Guard that must be held for the application lifetime to ensure logs are flushed.
    pub _guard: WorkerGuard,
    /// The session ID for this invocation.
    pub session_id: String,
    /// The directory where logs are written.
    pub log_directory: PathBuf,
    /// Handle used by [`set_level`].
    pub reload_handle: ReloadHandle,
}

/// Error that occurred during logging initialization.
#[derive(Debug)]
pub struct LoggingError {
    pub message: String,
}

impl std::fmt::Display for LoggingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Generates a 6-character random hex session ID.
fn generate_session_id() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    let bytes: [u8; 3] = rng.random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Initializes the logging system.
///
/// Returns a `LoggingContext` on success, or a `LoggingError` on failure.
/// The returned `WorkerGuard` must be held for the application lifetime.
pub fn init() -> Result<LoggingContext, LoggingError> {
    let session_id = generate_session_id();

    let project_dirs =
        ProjectDirs::from("dev", "clarify", "clarify").ok_or_else(|| LoggingError {
            message: "Failed to determine platform directories".to_string(),
        })?;

    // macOS: ~/Library/Logs/clarify/
    // Linux: ~/.local/state/clarify/
    // Windows: %LocalAppData%\clarify\
    let log_dir = if cfg!(target_os = "macos") {
        dirs_home_log_dir()
    } else {
        project_dirs
            .state_dir()
            .map(PathBuf::from)
            .or_else(|| Some(project_dirs.data_local_dir().to_path_buf()))
    }
    .ok_or_else(|| LoggingError {
        message: "Failed to determine log directory".to_string(),
    })?;

    fs::create_dir_all(&log_dir).map_err(|e| LoggingError {
        message: format!("Failed to create log directory: {}", e),
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "clarify");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, reload_handle) = reload::Layer::new(env_filter);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_span_events(FmtSpan::NONE)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| LoggingError {
            message: format!("Failed to install log subscriber: {}", e),
        })?;

    info!(session_id = %session_id, "session_start");

    Ok(LoggingContext {
        _guard: guard,
        session_id,
        log_directory: log_dir,
        reload_handle,
    })
}

/// Apply the configured log level.
///
/// `RUST_LOG` wins when set, so the configured level is ignored in that case.
pub fn set_level(handle: &ReloadHandle, level: &str) {
    use tracing::warn;

    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return;
    }

    let filter = match EnvFilter::try_new(level) {
        Ok(filter) => filter,
        Err(e) => {
            warn!(level = %level, error = %e, "log_level_invalid");
            return;
        }
    };

    match handle.reload(filter) {
        Ok(()) => info!(level = %level, "log_level_set"),
        Err(e) => warn!(level = %level, error = %e, "log_level_reload_failed"),
    }
}

/// Gets the macOS ~/Library/Logs/clarify/ directory.
fn dirs_home_log_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("Library").join("Logs").join("clarify"))
}

/// Cleans up log files older than the retention period.
///
/// Scans the log directory for `clarify.*` files and deletes those older than 7 days.
/// Errors are logged at WARN level but don't prevent app startup.
pub fn cleanup_old_logs(log_dir: &Path) {
    use std::time::{Duration, SystemTime};
    use tracing::{debug, warn};

    const RETENTION_DAYS: u64 = 7;
    let retention_duration = Duration::from_secs(RETENTION_DAYS * 24 * 60 * 60);

    let entries = match fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Failed to read log directory for cleanup");
            return;
        }
    };

    let now = SystemTime::now();
    let mut deleted_count = 0u32;

    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();

        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) if is_log_file_name(name) => name,
            _ => continue,
        };

        let modified = match fs::metadata(&path).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                warn!(file = %file_name, error = %e, "Failed to get modification time for log file");
                continue;
            }
        };

        let age = match now.duration_since(modified) {
            Ok(d) => d,
            Err(_) => continue, // File is in the future, skip
        };

        if age > retention_duration {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(file = %file_name, age_days = age.as_secs() / 86400, "Deleted old log file");
                    deleted_count += 1;
                }
                Err(e) => {
                    warn!(file = %file_name, error = %e, "Failed to delete old log file");
                }
            }
        }
    }

    if deleted_count > 0 {
        debug!(count = deleted_count, "Log cleanup completed");
    }
}

/// Rotated log files are named `clarify.YYYY-MM-DD`.
fn is_log_file_name(name: &str) -> bool {
    name.starts_with("clarify.") && name != "clarify"
}

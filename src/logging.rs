use log::{debug, error, info, warn};

/// Initializes the logger with the `env_logger` crate.
///
/// Call once at startup; log levels are selected with the `RUST_LOG`
/// environment variable.
pub fn init_logger() {
    env_logger::init();
}

/// Logs an error message.
pub fn log_error(message: &str) {
    error!("{message}");
}

/// Logs a warning message.
pub fn log_warn(message: &str) {
    warn!("{message}");
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    info!("{message}");
}

/// Logs a debug message.
pub fn log_debug(message: &str) {
    debug!("{message}");
}

use crate::config::LogLevel;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `level` when set. Calling this twice is harmless;
/// the second subscriber is simply not installed.
pub fn init_logging(level: LogLevel, ansi: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_ansi(ansi)
        .try_init()
        .is_ok();

    if installed {
        debug!(level = level.as_directive(), "Logging initialized");
    }
}

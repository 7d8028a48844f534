//! Logging setup: journald where available, rotating file otherwise.
//!
//! The CLI must keep stdout clean for its own listing output, so logs
//! never go to the terminal; they land in the journal on Linux or in a
//! daily-rotated file under the local data directory.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system.
///
/// Log level is controlled via the `MEEPLEBOX_LOG` environment variable:
/// - `MEEPLEBOX_LOG=debug` for verbose output
/// - `MEEPLEBOX_LOG=info` for standard output (default)
/// - `MEEPLEBOX_LOG=warn` for warnings and errors only
pub fn init(log_dir: Option<PathBuf>) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_env("MEEPLEBOX_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(target_os = "linux")]
    {
        if let Ok(journald_layer) = tracing_journald::layer() {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(journald_layer)
                .init();

            tracing::debug!("Logging initialized with journald backend");
            return Ok(());
        }
    }

    let log_dir = log_dir.unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meeplebox")
            .join("logs")
    });

    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "meeplebox.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // The guard must outlive the process or buffered lines are lost;
    // init() runs once at startup, so parking it in a static is fine.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(_guard);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::debug!("Logging initialized with file backend at {:?}", log_dir);
    Ok(())
}

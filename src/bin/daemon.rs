//! Notification daemon for meeplebox.
//!
//! The CLI queues reminder alerts in the shared SQLite database; this
//! daemon polls that queue and turns due rows into desktop
//! notifications. Delivery is fire-and-forget: a row is dropped from
//! the queue after one attempt, shown or not.
//!
//! ## Usage
//!
//! ```bash
//! meeplebox-daemon              # Poll in the foreground
//! meeplebox-daemon --once       # Deliver due alerts once and exit
//! ```

use anyhow::{Context, Result};
use notify_rust::Notification;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

use meeplebox::db::Database;
use meeplebox::notify::NotificationCenter;
use meeplebox::Config;

#[derive(Default)]
struct DaemonOptions {
    /// Poll interval override (seconds); the config value applies when unset
    poll_interval: Option<u64>,
    /// Deliver once and exit
    once: bool,
    /// Config path override
    config_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let options = parse_args();

    init_logging()?;

    info!("meeplebox daemon starting...");

    let config = load_config(&options);
    let db = Database::open(&config.db_path)?;
    db.initialize()?;
    info!("Database opened at {:?}", config.db_path);

    let notifier = NotificationCenter::new(&config.notifications);
    let poll_interval = options
        .poll_interval
        .unwrap_or(config.notifications.poll_interval_secs);

    if options.once {
        info!("Running in single-shot mode");
        deliver_due(&db, &notifier)?;
    } else {
        info!(
            "Running in daemon mode, polling every {} seconds",
            poll_interval
        );
        run_daemon_loop(&db, &notifier, poll_interval)?;
    }

    info!("meeplebox daemon stopped");
    Ok(())
}

fn parse_args() -> DaemonOptions {
    let args: Vec<String> = std::env::args().collect();
    let mut options = DaemonOptions::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--once" | "-1" => {
                options.once = true;
            }
            "--interval" | "-i" => {
                if i + 1 < args.len() {
                    if let Ok(interval) = args[i + 1].parse() {
                        options.poll_interval = Some(interval);
                    }
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    options.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    options
}

fn print_help() {
    println!(
        r#"meeplebox-daemon - Desktop notification delivery for meeplebox

USAGE:
    meeplebox-daemon [OPTIONS]

OPTIONS:
    --once, -1          Deliver due alerts once and exit
    --interval, -i N    Poll interval in seconds (default: from config)
    --config, -c PATH   Path to config file
    --help, -h          Show this help message

ENVIRONMENT:
    MEEPLEBOX_CONFIG    Path to config file (overrides default location)
    RUST_LOG            Log level (trace, debug, info, warn, error)

The daemon shares the meeplebox database and shows a desktop
notification for every reminder alert whose fire time has passed.
"#
    );
}

fn init_logging() -> Result<()> {
    use tracing_subscriber::prelude::*;

    // Prefer journald on Linux
    #[cfg(target_os = "linux")]
    {
        if let Ok(journald_layer) = tracing_journald::layer() {
            let subscriber = tracing_subscriber::registry()
                .with(journald_layer)
                .with(tracing_subscriber::filter::EnvFilter::new(
                    std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
                ));
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set tracing subscriber")?;
            return Ok(());
        }
    }

    // Fall back to stderr
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    Ok(())
}

fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("MEEPLEBOX_CONFIG") {
        return PathBuf::from(path);
    }

    Config::config_path()
}

/// Missing or broken config files are not fatal for the daemon; it
/// falls back to defaults so queued alerts still get delivered.
fn load_config(options: &DaemonOptions) -> Config {
    let path = options.config_path.clone().unwrap_or_else(config_path);
    match Config::load_from(&path) {
        Ok(config) => {
            info!("Config loaded from {:?}", path);
            config
        }
        Err(e) => {
            warn!("Could not load config from {:?} ({}), using defaults", path, e);
            Config::default()
        }
    }
}

fn run_daemon_loop(db: &Database, notifier: &NotificationCenter, poll_interval: u64) -> Result<()> {
    loop {
        if let Err(e) = deliver_due(db, notifier) {
            error!("Delivery pass failed: {}", e);
        }
        thread::sleep(Duration::from_secs(poll_interval));
    }
}

/// One delivery pass: show every due alert, then drop it from the
/// queue whether or not the desktop accepted it. By the next pass a
/// failed alert would be stale, so there is no retry.
fn deliver_due(db: &Database, notifier: &NotificationCenter) -> Result<()> {
    let due = notifier.due(db)?;
    if due.is_empty() {
        return Ok(());
    }
    info!("Found {} due alert(s)", due.len());

    for alert in due {
        match Notification::new()
            .summary(&alert.title)
            .body(&alert.body)
            .appname("meeplebox")
            .icon("appointment-soon")
            .show()
        {
            Ok(_) => info!("Delivered \"{}\"", alert.title),
            Err(e) => warn!("Could not show \"{}\": {}", alert.title, e),
        }
        db.remove_notification(&alert.id)?;
    }

    Ok(())
}

use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::ServerConfig;

/// Install the global subscriber: stdout always, plus an append-only
/// error log file outside debug mode.
pub fn init(config: &ServerConfig) {
    let default_directive = if config.debug { "debug" } else { "info,sqlx=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let log_path = config.error_log.as_ref().filter(|_| !config.debug);
    let mut open_error = None;
    let file_layer = log_path.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(LevelFilter::INFO),
            ),
            Err(e) => {
                open_error = Some(format!("{}: {e}", path.display()));
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    if let Some(err) = open_error {
        tracing::warn!("error log disabled, cannot open {err}");
    }
}

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_ERROR_LOG: &str = "error.log";

/// Process-level settings read from the environment (after `.env`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub debug: bool,
    /// File that receives a copy of INFO-and-above events when not in
    /// debug mode. `None` disables it.
    pub error_log: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind = lookup("GIGBOOK_BIND")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 5000)));

        let debug = lookup("GIGBOOK_DEBUG")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        let error_log = match lookup("GIGBOOK_ERROR_LOG") {
            Some(path) if path.trim().is_empty() => None,
            Some(path) => Some(PathBuf::from(path)),
            None => Some(PathBuf::from(DEFAULT_ERROR_LOG)),
        };

        Self {
            bind,
            debug,
            error_log,
        }
    }
}

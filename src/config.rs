//! Binder Configuration

use serde::Deserialize;
use std::time::Duration;

/// Tunables for the binder and its supporting state.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Default connect timeout (per endpoint, unless the endpoint overrides it)
    pub connect_timeout: Duration,
    /// How long a just-failed endpoint stays demoted in the try order
    pub retry_cooldown: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            retry_cooldown: Duration::from_secs(5),
        }
    }
}

/// Load configuration from `BINDER_*` environment variables, falling back to
/// defaults for anything unset or unparsable.
pub fn load_config() -> anyhow::Result<Config> {
    let connect_timeout_ms: u64 = std::env::var("BINDER_CONNECT_TIMEOUT_MS")
        .unwrap_or_else(|_| "5000".to_string())
        .parse()
        .unwrap_or(5000);

    let retry_cooldown_ms: u64 = std::env::var("BINDER_RETRY_COOLDOWN_MS")
        .unwrap_or_else(|_| "5000".to_string())
        .parse()
        .unwrap_or(5000);

    Ok(Config {
        connect_timeout: Duration::from_millis(connect_timeout_ms),
        retry_cooldown: Duration::from_millis(retry_cooldown_ms),
    })
}

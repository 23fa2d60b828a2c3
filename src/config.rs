//! Environment-derived configuration, read once at startup and injected into
//! the upstream clients.

use std::time::Duration;

const DEFAULT_PORT: u16 = 1000;
const DEFAULT_OPENFDA_BASE: &str = "https://api.fda.gov";
const DEFAULT_INTERACTIONS_BASE: &str = "https://interactions.medgate.dev/v1/check";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub openfda_base: String,
    pub openfda_api_key: Option<String>,
    pub interactions_base: String,
    pub interactions_api_key: Option<String>,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env_trimmed("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            openfda_base: env_trimmed("MEDGATE_OPENFDA_BASE")
                .unwrap_or_else(|| DEFAULT_OPENFDA_BASE.to_string()),
            openfda_api_key: env_trimmed("OPENFDA_API_KEY"),
            interactions_base: env_trimmed("MEDGATE_INTERACTIONS_BASE")
                .unwrap_or_else(|| DEFAULT_INTERACTIONS_BASE.to_string()),
            interactions_api_key: env_trimmed("INTERACTIONS_API_KEY"),
            timeout: env_trimmed("MEDGATE_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

/// Reads an environment variable, treating whitespace-only values as unset.
fn env_trimmed(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
impl Config {
    /// A config pointing both upstreams at a test server.
    pub(crate) fn for_test(base: String) -> Self {
        Self {
            port: 0,
            openfda_base: base.clone(),
            openfda_api_key: None,
            interactions_base: base,
            interactions_api_key: Some("test-key".to_string()),
            timeout: Duration::from_secs(5),
        }
    }
}

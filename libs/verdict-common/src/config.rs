// Application configuration, read from the environment.

use std::time::Duration;

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_EXECUTION_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Connection string for the queue broker.
    pub redis_url: String,
    /// Listen address for the API server.
    pub bind_addr: String,
    /// Simulated execution time per job in the worker.
    pub execution_delay: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let redis_url = std::env::var("REDIS_URL")
            .unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());
        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let execution_delay = execution_delay_from(std::env::var("EXECUTION_DELAY_MS").ok());

        Self {
            redis_url,
            bind_addr,
            execution_delay,
        }
    }
}

/// Parse the execution delay, falling back to the default.
/// A set-but-unparseable value is a misconfiguration worth surfacing.
fn execution_delay_from(raw: Option<String>) -> Duration {
    match raw {
        None => Duration::from_millis(DEFAULT_EXECUTION_DELAY_MS),
        Some(value) => match value.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                tracing::warn!(
                    value = %value,
                    default_ms = DEFAULT_EXECUTION_DELAY_MS,
                    "Invalid EXECUTION_DELAY_MS, using default"
                );
                Duration::from_millis(DEFAULT_EXECUTION_DELAY_MS)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_delay_uses_default() {
        assert_eq!(
            execution_delay_from(None),
            Duration::from_millis(DEFAULT_EXECUTION_DELAY_MS)
        );
    }

    #[test]
    fn valid_delay_is_parsed() {
        assert_eq!(
            execution_delay_from(Some("250".to_string())),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn unparseable_delay_falls_back_to_default() {
        assert_eq!(
            execution_delay_from(Some("soon".to_string())),
            Duration::from_millis(DEFAULT_EXECUTION_DELAY_MS)
        );
        assert_eq!(
            execution_delay_from(Some("-5".to_string())),
            Duration::from_millis(DEFAULT_EXECUTION_DELAY_MS)
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: DEFAULT_REDIS_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            execution_delay: Duration::from_millis(DEFAULT_EXECUTION_DELAY_MS),
        }
    }
}

//! Client configuration, loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the client.
///
/// Every field has a default so the client works against a local backend
/// without any environment variables set.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Verification service base URL (default: `"http://localhost:8000"`).
    pub api_url: String,

    /// Delay between status requests (default: 1 s).
    pub poll_interval: Duration,

    /// Per-request HTTP timeout (default: 120 s).
    pub http_timeout: Duration,

    /// Where the task list is persisted (default: `.claimcheck`).
    pub state_dir: PathBuf,

    /// Where exported reports and previews are written (default: `.`).
    pub report_dir: PathBuf,

    /// `tracing` filter string, e.g. `"info"` or `"claimcheck_core=debug"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ClientConfig {
    /// Build from `CLAIMCHECK_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_owned());
        Self {
            api_url: env_or("CLAIMCHECK_API_URL", "http://localhost:8000"),
            poll_interval: Duration::from_millis(parse(&get, "CLAIMCHECK_POLL_INTERVAL_MS", 1000)),
            http_timeout: Duration::from_secs(parse(&get, "CLAIMCHECK_HTTP_TIMEOUT_SECS", 120)),
            state_dir: PathBuf::from(env_or("CLAIMCHECK_STATE_DIR", ".claimcheck")),
            report_dir: PathBuf::from(env_or("CLAIMCHECK_REPORT_DIR", ".")),
            log_level: env_or("CLAIMCHECK_LOG", "info"),
            log_json: get("CLAIMCHECK_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

fn parse<T: std::str::FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    get(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with(vars: &[(&str, &str)]) -> ClientConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.api_url, "http://localhost:8000");
        assert_eq!(cfg.poll_interval, Duration::from_secs(1));
        assert_eq!(cfg.http_timeout, Duration::from_secs(120));
        assert_eq!(cfg.state_dir, PathBuf::from(".claimcheck"));
        assert_eq!(cfg.report_dir, PathBuf::from("."));
        assert_eq!(cfg.log_level, "info");
        assert!(!cfg.log_json);
    }

    #[test]
    fn overrides_and_bad_numbers() {
        let cfg = with(&[
            ("CLAIMCHECK_API_URL", "https://verify.example.com"),
            ("CLAIMCHECK_POLL_INTERVAL_MS", "250"),
            ("CLAIMCHECK_HTTP_TIMEOUT_SECS", "soon"),
            ("CLAIMCHECK_LOG_JSON", "TRUE"),
        ]);
        assert_eq!(cfg.api_url, "https://verify.example.com");
        assert_eq!(cfg.poll_interval, Duration::from_millis(250));
        assert_eq!(cfg.http_timeout, Duration::from_secs(120));
        assert!(cfg.log_json);
    }
}

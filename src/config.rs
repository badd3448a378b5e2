//! REST client configuration

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestConfig {
    /// API root, e.g. `http://localhost:3001/api`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RestConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `NOTETREE_API_URL` and `NOTETREE_API_TIMEOUT_MS` override the defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("NOTETREE_API_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        match lookup("NOTETREE_API_TIMEOUT_MS").map(|v| v.trim().parse::<u64>()) {
            Some(Ok(ms)) if ms > 0 => config.timeout = Duration::from_millis(ms),
            Some(_) => tracing::warn!("ignoring invalid NOTETREE_API_TIMEOUT_MS"),
            None => {}
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RestConfig::from_lookup(|_| None);
        assert_eq!(config.base_url, "http://localhost:3001/api");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = RestConfig::from_lookup(|key| match key {
            "NOTETREE_API_URL" => Some("http://notes.lan:8080/api".into()),
            "NOTETREE_API_TIMEOUT_MS" => Some("2500".into()),
            _ => None,
        });
        assert_eq!(config.base_url, "http://notes.lan:8080/api");
        assert_eq!(config.timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_bad_timeout_keeps_default() {
        let config = RestConfig::from_lookup(|key| {
            (key == "NOTETREE_API_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}

//! ServiceConfig - dispatcher / task manager の設定
//!
//! JSON で読み込める（CLI の `--config`）。未知のキーはエラー。

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SadiError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Externally visible URL of the service (task URLs, description subject).
    /// Falls back to the request URL when unset.
    pub service_url: Option<String>,
    /// Advisory wait sent with a pending poll.
    pub poll_wait_ms: u64,
    /// Completed tasks older than this are evicted. `None` keeps them for the process lifetime.
    pub task_ttl_secs: Option<u64>,
    pub reap_interval_secs: u64,
    /// Drop a completed task once its result has been served.
    pub consume_on_poll: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_url: None,
            poll_wait_ms: 5000,
            task_ttl_secs: None,
            reap_interval_secs: 60,
            consume_on_poll: false,
        }
    }
}

impl ServiceConfig {
    pub fn from_json(text: &str) -> Result<Self, SadiError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| SadiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SadiError> {
        if self.reap_interval_secs == 0 {
            return Err(SadiError::Config("reap_interval_secs must be positive".into()));
        }
        if let Some(url) = &self.service_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(SadiError::Config(format!(
                "service_url must be an absolute http(s) URL, got {url:?}"
            )));
        }
        Ok(())
    }

    pub fn poll_wait(&self) -> Duration {
        Duration::from_millis(self.poll_wait_ms)
    }

    pub fn task_ttl(&self) -> Option<Duration> {
        self.task_ttl_secs.map(Duration::from_secs)
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let config = ServiceConfig::from_json(r#"{"task_ttl_secs": 300}"#).unwrap();
        assert_eq!(config.poll_wait_ms, 5000);
        assert_eq!(config.task_ttl(), Some(Duration::from_secs(300)));
        assert!(!config.consume_on_poll);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = ServiceConfig::from_json(r#"{"poll_wait": 1}"#).unwrap_err();
        assert!(matches!(err, SadiError::Config(_)));
    }

    #[test]
    fn relative_service_url_is_rejected() {
        let err = ServiceConfig::from_json(r#"{"service_url": "/hello"}"#).unwrap_err();
        assert!(matches!(err, SadiError::Config(_)));
    }
}

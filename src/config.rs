//! Worker configuration.

use page_driver::PoolSettings;
use serde::{Deserialize, Serialize};

/// Everything the worker needs to run, resolved once at startup from flags
/// and environment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// TCP port of the HTTP surface.
    pub port: u16,

    /// Bearer secret required on every non-health request. Auth is disabled
    /// when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_secret: Option<String>,

    pub pool: PoolSettings,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            worker_secret: None,
            pool: PoolSettings::default(),
        }
    }
}

impl WorkerConfig {
    pub fn auth_enabled(&self) -> bool {
        self.worker_secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_worker_contract() {
        let config = WorkerConfig::default();
        assert_eq!(config.port, 3001);
        assert!(!config.auth_enabled());
        assert_eq!(config.pool.capacity, 3);
        assert!(config.pool.headless);
    }

    #[test]
    fn empty_secret_disables_auth() {
        let config = WorkerConfig {
            worker_secret: Some(String::new()),
            ..WorkerConfig::default()
        };
        assert!(!config.auth_enabled());

        let config = WorkerConfig {
            worker_secret: Some("s3cret".to_string()),
            ..WorkerConfig::default()
        };
        assert!(config.auth_enabled());
    }
}

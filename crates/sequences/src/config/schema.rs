use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SequencesConfig {
    #[serde(default = "default_database")]
    pub default_database: String,
    pub databases: BTreeMap<String, DatabaseConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
    #[serde(default)]
    pub upsert: bool,
    /// Upper bound on how long a blocking allocation waits for a held lock.
    /// Unset keeps the backend's own default.
    #[serde(default)]
    pub lock_timeout_ms: Option<u64>,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
            upsert: false,
            lock_timeout_ms: None,
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }
}

impl SequencesConfig {
    pub fn single(alias: &str, database: DatabaseConfig) -> Self {
        let mut databases = BTreeMap::new();
        databases.insert(alias.to_string(), database);
        Self {
            default_database: alias.to_string(),
            databases,
        }
    }
}

pub(crate) fn default_database() -> String {
    "default".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_ms() -> u64 {
    5000
}

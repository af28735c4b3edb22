use serde::{Deserialize, Serialize};

/// Default TTL attached to newly created risk events (60 days).
fn default_event_ttl_secs() -> u64 {
    5_184_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// MySQL URL for the at-risk score database.
    pub atrisk_database_url: String,
    /// MySQL URL for the schools database (directory and customer settings).
    pub schools_database_url: String,
    pub redis_url: String,
    /// TTL attached to risk events on creation, in seconds.
    #[serde(default = "default_event_ttl_secs")]
    pub default_event_ttl_secs: u64,
    /// Set to "production" for JSON logging, anything else for human-readable.
    #[serde(default)]
    pub env: String,
    /// Sentry DSN for error tracking
    #[serde(default)]
    pub sentry_dsn: Option<String>,
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}

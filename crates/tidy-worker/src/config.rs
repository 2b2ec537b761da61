//! Worker configuration.

use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Queue items processed per polling cycle
    pub batch_size: u32,
    /// Delay between polling cycles when the queue is idle
    pub poll_interval: Duration,
    /// Postgres connection string
    pub database_url: String,
    /// Postgres pool size
    pub database_max_connections: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            poll_interval: Duration::from_secs(30),
            database_url: "postgres://localhost:5432/tidy".to_string(),
            database_max_connections: 5,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            batch_size: std::env::var("WORKER_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.batch_size),
            poll_interval: Duration::from_secs(
                std::env::var("WORKER_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            database_max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.database_max_connections),
        }
    }
}

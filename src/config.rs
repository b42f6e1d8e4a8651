use std::time::Duration;

use dotenvy;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_namespace: String,
    pub db_database: String,
    pub db_password: Option<String>,
    pub db_username: Option<String>,
    pub db_url: String,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let db_namespace = std::env::var("DB_NAMESPACE").unwrap_or("namespace".to_string());
        let db_database = std::env::var("DB_DATABASE").unwrap_or("database".to_string());
        let db_password = std::env::var("DB_PASSWORD").ok();
        let db_username = std::env::var("DB_USERNAME").ok();
        let db_url = std::env::var("DB_URL").unwrap_or("mem://".to_string());

        let read_timeout_ms = env_number("LIKE_READ_TIMEOUT_MS", 5_000);
        let write_timeout_ms = env_number("LIKE_WRITE_TIMEOUT_MS", 10_000);

        Self {
            db_namespace,
            db_database,
            db_password,
            db_username,
            db_url,
            read_timeout_ms,
            write_timeout_ms,
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            write_timeout: Duration::from_millis(self.write_timeout_ms),
        }
    }
}

fn env_number(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(value) => value.parse::<u64>().unwrap_or_else(|_| {
            tracing::warn!(key, value, default, "not a number, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Deadlines applied by the like controller to every store call.
#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(10),
        }
    }
}

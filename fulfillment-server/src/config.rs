//! Server configuration

/// Fulfillment server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL
    pub database_url: String,
    /// HTTP port (webhook, REST, health)
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Directory for daily rolling log files (used only if it exists)
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| var(key).filter(|s| !s.is_empty());
        Self {
            database_url: non_empty("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://fulfillment.db".into()),
            http_port: var("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            log_level: var("LOG_LEVEL")
                .unwrap_or_else(|| "fulfillment_server=info,tower_http=info".into()),
            log_dir: non_empty("LOG_DIR"),
        }
    }
}

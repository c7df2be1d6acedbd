//! Server configuration module

use clap::Parser;

use bazaar_app::context::AppConfig;

use crate::config::{
    auth::AuthConfig,
    cache::CacheConfig,
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    server::ServerRuntimeConfig,
};

pub(crate) mod auth;
pub(crate) mod cache;
pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod server;

pub(crate) use observability::LogFormat;

/// Bazaar JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "bazaar-json", about = "Bazaar JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Catalog cache settings.
    #[command(flatten)]
    pub cache: CacheConfig,

    /// Session settings.
    #[command(flatten)]
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Settings needed to build the application context.
    #[must_use]
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            database_url: self.database.database_url.clone(),
            max_connections: self.database.max_connections,
            run_migrations: self.database.run_migrations,
            cache: self.cache.settings(),
            session_ttl_minutes: self.auth.session_ttl_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn flags_build_app_config() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "bazaar-json",
            "--database-url",
            "postgres://bazaar@localhost/bazaar",
            "--port",
            "9000",
            "--cache-ttl-seconds",
            "60",
            "--session-ttl-minutes",
            "15",
            "--run-migrations",
        ])?;

        let app = config.app_config();

        assert_eq!(config.socket_addr(), "0.0.0.0:9000");
        assert_eq!(app.database_url, "postgres://bazaar@localhost/bazaar");
        assert_eq!(app.max_connections, 10);
        assert!(app.run_migrations, "flag should enable migrations");
        assert_eq!(app.cache.ttl, Duration::from_secs(60));
        assert_eq!(app.session_ttl_minutes, 15);
        assert_eq!(config.server.shutdown_grace(), Some(Duration::from_secs(30)));
        assert!(config.observability.metrics_enabled, "metrics default on");
        assert!(!config.observability.otel_enabled, "trace export default off");

        Ok(())
    }
}

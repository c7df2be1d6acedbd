//! Database Config

use clap::Args;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Maximum pooled connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 10_u32)]
    pub max_connections: u32,

    /// Apply pending migrations on startup
    #[arg(long, env = "DATABASE_RUN_MIGRATIONS", default_value_t = false)]
    pub run_migrations: bool,
}

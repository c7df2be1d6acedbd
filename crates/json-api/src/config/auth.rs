//! Auth Config

use clap::Args;

/// Session settings.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// Minutes a bearer token stays valid after login
    #[arg(long, env = "SESSION_TTL_MINUTES", default_value_t = 1_440_u32)]
    pub session_ttl_minutes: u32,
}

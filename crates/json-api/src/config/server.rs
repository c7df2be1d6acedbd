//! Server Config

use std::time::Duration;

use clap::Args;

/// Listener and lifecycle settings.
#[derive(Debug, Args)]
pub struct ServerRuntimeConfig {
    /// Server host address
    #[arg(short = 'H', long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "SERVER_PORT", default_value = "8698")]
    pub port: u16,

    /// Seconds in-flight requests get to finish after a shutdown signal; 0 waits forever
    #[arg(long, env = "SHUTDOWN_GRACE_SECONDS", default_value = "30")]
    pub shutdown_grace_seconds: u64,
}

impl ServerRuntimeConfig {
    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn shutdown_grace(&self) -> Option<Duration> {
        (self.shutdown_grace_seconds > 0).then(|| Duration::from_secs(self.shutdown_grace_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(shutdown_grace_seconds: u64) -> ServerRuntimeConfig {
        ServerRuntimeConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
            shutdown_grace_seconds,
        }
    }

    #[test]
    fn socket_addr_joins_host_and_port() {
        assert_eq!(config(30).socket_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn zero_grace_means_unbounded() {
        assert_eq!(config(0).shutdown_grace(), None);
        assert_eq!(config(5).shutdown_grace(), Some(Duration::from_secs(5)));
    }
}

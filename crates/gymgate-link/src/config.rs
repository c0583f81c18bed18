use gymgate_core::{
    Error, Result,
    constants::{
        CONNECT_TIMEOUT, DEFAULT_READER_ADDR, PING_INTERVAL, READER_ADDR_ENV, RECONNECT_SETTLE,
        SEND_TIMEOUT,
    },
};
use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for the reader link.
///
/// # Example
///
/// ```
/// use gymgate_link::LinkConfig;
/// use std::time::Duration;
///
/// let config = LinkConfig {
///     reader_addr: "127.0.0.1:8080".parse().unwrap(),
///     connect_timeout: Duration::from_millis(1000),
///     ..LinkConfig::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Reader service address to connect to.
    pub reader_addr: SocketAddr,

    /// Timeout for establishing the TCP connection.
    pub connect_timeout: Duration,

    /// Timeout for a single outbound write.
    pub send_timeout: Duration,

    /// Delay between disconnect and connect during `reconnect()`, letting
    /// the prior socket fully close.
    pub settle_delay: Duration,

    /// Keepalive ping interval while connected.
    pub ping_interval: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            // DEFAULT_READER_ADDR is a compile-time constant and always parses.
            reader_addr: DEFAULT_READER_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8080))),
            connect_timeout: CONNECT_TIMEOUT,
            send_timeout: SEND_TIMEOUT,
            settle_delay: RECONNECT_SETTLE,
            ping_interval: PING_INTERVAL,
        }
    }
}

impl LinkConfig {
    /// Build a config from the environment, falling back to defaults.
    ///
    /// Honors `GYMGATE_READER_ADDR` for the reader service endpoint.
    ///
    /// # Errors
    /// Returns `Error::Config` if the environment variable is set but does
    /// not parse as a socket address.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var(READER_ADDR_ENV) {
            config.reader_addr = addr.parse().map_err(|_| {
                Error::Config(format!("{READER_ADDR_ENV}: invalid socket address '{addr}'"))
            })?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = LinkConfig::default();
        assert_eq!(config.reader_addr.port(), 8080);
        assert_eq!(config.ping_interval, Duration::from_secs(30));
        assert_eq!(config.settle_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_config_override_pattern() {
        let config = LinkConfig {
            connect_timeout: Duration::from_millis(100),
            ..LinkConfig::default()
        };
        assert_eq!(config.connect_timeout, Duration::from_millis(100));
        assert_eq!(config.send_timeout, LinkConfig::default().send_timeout);
    }
}

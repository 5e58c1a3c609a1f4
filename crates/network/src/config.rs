//! # Session Configuration
//!
//! Transport options for a weight map session.
//!
//! # Example
//!
//! ```rust
//! use weightmap_network::{AckMode, SessionConfig};
//! use std::time::Duration;
//!
//! let config = SessionConfig {
//!     address: "127.0.0.1:8080".to_string(),
//!     read_timeout: Duration::from_secs(5),
//!     ack_mode: AckMode::EveryFrame,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

pub use weightmap_core::AckMode;

/// Session configuration options
///
/// # Default Values
///
/// - `localhost:8080` (the map server's default listen address)
/// - 5 second connect timeout, 30 second read/write timeouts
/// - ACK on `CONTINUE` only
/// - `TCP_NODELAY` on, keepalive off
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// `host:port` of the map server
    ///
    /// # Examples
    /// - `localhost:8080` - Local server on the default port
    /// - `10.0.0.12:9000` - Robot controller on the LAN
    pub address: String,

    /// How long to wait for the TCP handshake
    pub connect_timeout: Duration,

    /// How long to wait for one full response frame
    ///
    /// # Notes
    /// - Applies per frame, not per exchange
    /// - Expiry poisons the session since the stream may be mid-frame
    pub read_timeout: Duration,

    /// How long to wait for one frame to be written
    pub write_timeout: Duration,

    /// Frame acknowledgement policy
    pub ack_mode: AckMode,

    /// Disable Nagle's algorithm on the socket
    ///
    /// # Default
    /// `true`. Every exchange is a small request followed by a blocking wait,
    /// so batching only adds latency.
    pub nodelay: bool,

    /// Idle time before TCP keepalive probes start, `None` to leave keepalive off
    pub keepalive: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            address: "localhost:8080".to_string(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(30),
            ack_mode: AckMode::ContinueOnly,
            nodelay: true,
            keepalive: None,
        }
    }
}

impl SessionConfig {
    /// Configuration for `address` with every other option at its default
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Checks
    /// - `address` must be non-empty and contain a port
    /// - All timeouts must be non-zero
    pub fn validate(&self) -> Result<(), String> {
        if self.address.trim().is_empty() {
            return Err("address must not be empty".to_string());
        }

        match self.address.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() => {
                if port.parse::<u16>().is_err() {
                    return Err(format!("invalid port in address '{}'", self.address));
                }
            }
            _ => return Err(format!("address '{}' must be host:port", self.address)),
        }

        if self.connect_timeout.is_zero() {
            return Err("connect_timeout must be > 0".to_string());
        }

        if self.read_timeout.is_zero() {
            return Err("read_timeout must be > 0".to_string());
        }

        if self.write_timeout.is_zero() {
            return Err("write_timeout must be > 0".to_string());
        }

        if let Some(idle) = self.keepalive {
            if idle.is_zero() {
                tracing::warn!("keepalive idle time of 0 lets the OS pick its own default");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.address, "localhost:8080");
        assert_eq!(config.ack_mode, AckMode::ContinueOnly);
        assert!(config.nodelay);
        assert!(config.keepalive.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_address() {
        assert!(SessionConfig::new("").validate().is_err());
        assert!(SessionConfig::new("localhost").validate().is_err());
        assert!(SessionConfig::new(":8080").validate().is_err());
        assert!(SessionConfig::new("localhost:99999").validate().is_err());
        assert!(SessionConfig::new("10.0.0.12:9000").validate().is_ok());
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = SessionConfig::default();
        config.read_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}

//! Weight map client configuration
//!
//! Loads client options from a `mapclient.txt` key=value file:
//!
//! ```text
//! # map server
//! host = 10.0.0.12
//! port = 8080
//! readtimeout = 2.5
//! ackmode = every
//! ```
//!
//! Blank lines and `#` comments are ignored. Unknown keys are logged and
//! skipped so one options file can be shared between tool versions.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use weightmap_core::AckMode;

/// Default options file name, looked up in the working directory
pub const DEFAULT_FILE: &str = "mapclient.txt";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: invalid value '{value}' for '{key}'")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
    },
}

/// Options shared by the client tools
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    /// Map server host (from "host" option)
    pub host: String,
    /// Map server port (from "port" option, default: 8080)
    pub port: u16,
    /// TCP connect timeout (from "connecttimeout", seconds)
    pub connect_timeout: Duration,
    /// Per-frame read timeout (from "readtimeout", seconds)
    pub read_timeout: Duration,
    /// Per-frame write timeout (from "writetimeout", seconds)
    pub write_timeout: Duration,
    /// Frame acknowledgement policy (from "ackmode": `continue` or `every`)
    pub ack_mode: AckMode,
    /// TCP_NODELAY (from "nodelay")
    pub nodelay: bool,
    /// Keepalive idle time (from "keepalive", seconds, 0 = off)
    pub keepalive: Option<Duration>,
    /// Default tracing filter (from "loglevel")
    pub log_level: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(30),
            ack_mode: AckMode::default(),
            nodelay: true,
            keepalive: None,
            log_level: "info".to_string(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_seconds(value: &str) -> Option<Duration> {
    let secs: f64 = value.parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

impl ClientOptions {
    /// Load options from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let options = Self::parse(&content)?;
        tracing::debug!("Loaded client options from {}", path.display());
        Ok(options)
    }

    /// Load `mapclient.txt` from the working directory, falling back to defaults
    pub fn load_default() -> Result<Self, ConfigError> {
        if Path::new(DEFAULT_FILE).exists() {
            Self::load_from_file(DEFAULT_FILE)
        } else {
            tracing::debug!("No {} found, using default options", DEFAULT_FILE);
            Ok(Self::default())
        }
    }

    /// Parse options file content
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut options = Self::default();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.split_once('=') {
                Some((key, value)) => options.parse_option(index + 1, key.trim(), value.trim())?,
                None => tracing::warn!("Ignoring line {} without '=': {}", index + 1, line),
            }
        }

        Ok(options)
    }

    fn parse_option(&mut self, line: usize, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            line,
            key: key.to_string(),
            value: value.to_string(),
        };

        match key.to_ascii_lowercase().as_str() {
            "host" => {
                if value.is_empty() {
                    return Err(invalid());
                }
                self.host = value.to_string();
            }
            "port" => self.port = value.parse().map_err(|_| invalid())?,
            "connecttimeout" => self.connect_timeout = parse_seconds(value).ok_or_else(invalid)?,
            "readtimeout" => self.read_timeout = parse_seconds(value).ok_or_else(invalid)?,
            "writetimeout" => self.write_timeout = parse_seconds(value).ok_or_else(invalid)?,
            "ackmode" => self.ack_mode = AckMode::from_name(value).ok_or_else(invalid)?,
            "nodelay" => self.nodelay = parse_bool(value).ok_or_else(invalid)?,
            "keepalive" => {
                let idle = parse_seconds(value).ok_or_else(invalid)?;
                self.keepalive = (!idle.is_zero()).then_some(idle);
            }
            "loglevel" => self.log_level = value.to_string(),
            _ => tracing::warn!("Unknown client option: {} = {}", key, value),
        }
        Ok(())
    }

    /// `host:port` of the map server
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Log the effective options
    pub fn display(&self) {
        tracing::info!("Client options:");
        tracing::info!("  Server: {}", self.address());
        tracing::info!(
            "  Timeouts: connect {:?}, read {:?}, write {:?}",
            self.connect_timeout,
            self.read_timeout,
            self.write_timeout
        );
        tracing::info!("  Ack mode: {}", self.ack_mode.name());
        tracing::info!("  Nodelay: {}, keepalive: {:?}", self.nodelay, self.keepalive);
    }
}

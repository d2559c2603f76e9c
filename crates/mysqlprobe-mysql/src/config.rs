//! Probe configuration.
//!
//! Target address, timeouts and reporting options for a single probe.

use std::time::Duration;

use mysqlprobe_core::ConfigError;

use crate::transport::ReadDeadline;

/// Default MySQL port.
pub const DEFAULT_PORT: u16 = 3306;

/// Default dial and read timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Configuration for one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Hostname or IP address
    pub host: String,
    /// Port number (default: 3306)
    pub port: u16,
    /// Timeout for establishing the TCP connection
    pub connect_timeout: Duration,
    /// Timeout applied to reads of the first packet
    pub read_timeout: Duration,
    /// How `read_timeout` is applied across reads
    pub deadline: ReadDeadline,
    /// Include optional fields and hex previews in the report
    pub verbose: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            deadline: ReadDeadline::default(),
            verbose: false,
        }
    }
}

impl ProbeConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hostname.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set both the connect and the read timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.read_timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the read deadline policy.
    pub fn deadline(mut self, deadline: ReadDeadline) -> Self {
        self.deadline = deadline;
        self
    }

    /// Enable or disable verbose reporting.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Get the socket address string for connection.
    ///
    /// IPv6 literals are bracketed.
    pub fn socket_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Check the configuration before dialing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError {
                message: "host must not be empty".to_string(),
            });
        }
        if self.connect_timeout.is_zero() || self.read_timeout.is_zero() {
            return Err(ConfigError {
                message: "timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ProbeConfig::new()
            .host("db.example.com")
            .port(3307)
            .timeout(Duration::from_secs(10))
            .read_timeout(Duration::from_millis(500))
            .deadline(ReadDeadline::Overall)
            .verbose(true);

        assert_eq!(config.host, "db.example.com");
        assert_eq!(config.port, 3307);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.read_timeout, Duration::from_millis(500));
        assert_eq!(config.deadline, ReadDeadline::Overall);
        assert!(config.verbose);
    }

    #[test]
    fn test_default_config() {
        let config = ProbeConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3306);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.read_timeout, Duration::from_secs(3));
        assert_eq!(config.deadline, ReadDeadline::PerRead);
        assert!(!config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ProbeConfig::new().host("db.example.com").port(3307);
        assert_eq!(config.socket_addr(), "db.example.com:3307");

        let config = ProbeConfig::new().host("::1");
        assert_eq!(config.socket_addr(), "[::1]:3306");

        let config = ProbeConfig::new().host("[::1]");
        assert_eq!(config.socket_addr(), "[::1]:3306");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let err = ProbeConfig::new().host("  ").validate().unwrap_err();
        assert_eq!(err.message, "host must not be empty");

        let err = ProbeConfig::new()
            .read_timeout(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert_eq!(err.message, "timeout must be greater than zero");
    }
}

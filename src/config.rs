use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },
}

/// Server configuration, read from `WALKIE_*` environment variables.
///
/// The keepalive ping period is derived as 9/10 of the idle timeout so a
/// probe always goes out before the read deadline can expire.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP/WebSocket listener binds to
    pub bind_addr: SocketAddr,
    /// Read-inactivity deadline; a session with no inbound frames for this
    /// long is considered dead
    pub idle_timeout: Duration,
    /// Capacity of each session's outbound queue
    pub outbound_capacity: usize,
    /// Maximum accepted WebSocket frame size in bytes
    pub max_frame_size: usize,
    /// How often buffered audio is handed to the transcriber
    pub transcribe_window: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".parse().expect("valid default bind addr"),
            idle_timeout: Duration::from_secs(60),
            outbound_capacity: 512,
            max_frame_size: 4096,
            transcribe_window: Duration::from_secs(2),
        }
    }
}

impl Config {
    /// Loads configuration from the environment, falling back to defaults
    /// for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(addr) = std::env::var("WALKIE_BIND_ADDR") {
            config.bind_addr = addr.parse().map_err(|_| ConfigError::InvalidValue {
                var: "WALKIE_BIND_ADDR".to_string(),
                value: addr,
            })?;
        }
        if let Some(secs) = parse_env_u64("WALKIE_IDLE_TIMEOUT_SECS")? {
            config.idle_timeout = Duration::from_secs(secs);
        }
        if let Some(capacity) = parse_env_u64("WALKIE_OUTBOUND_CAPACITY")? {
            config.outbound_capacity = capacity as usize;
        }
        if let Some(size) = parse_env_u64("WALKIE_MAX_FRAME_SIZE")? {
            config.max_frame_size = size as usize;
        }
        if let Some(secs) = parse_env_u64("WALKIE_TRANSCRIBE_WINDOW_SECS")? {
            config.transcribe_window = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Interval between keepalive probes (9/10 of the idle timeout).
    pub fn ping_period(&self) -> Duration {
        self.idle_timeout * 9 / 10
    }
}

fn parse_env_u64(var: &str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                var: var.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
        assert_eq!(config.outbound_capacity, 512);
        assert_eq!(config.max_frame_size, 4096);
    }

    #[test]
    fn test_ping_period_precedes_idle_timeout() {
        let config = Config::default();
        assert!(config.ping_period() < config.idle_timeout);
        assert_eq!(config.ping_period(), Duration::from_secs(54));
    }
}

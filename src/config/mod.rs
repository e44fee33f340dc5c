//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS, comma-separated
    pub client_origin: String,

    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Length of the building phase in seconds
    pub building_phase_secs: u32,
    /// Countdown between both players accepting and race selection
    pub match_countdown_secs: u64,
    /// How long a match invitation stays open
    pub invitation_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Render provides PORT env var, fall back to SERVER_ADDR or default
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        };

        let tick_rate: u32 = number(&lookup, "TICK_RATE", 30)?;
        if tick_rate == 0 {
            return Err(ConfigError::Invalid("TICK_RATE"));
        }

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            client_origin: lookup("CLIENT_ORIGIN")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),

            tick_rate,
            building_phase_secs: number(&lookup, "BUILDING_PHASE_SECS", 120)?,
            match_countdown_secs: number(&lookup, "MATCH_COUNTDOWN_SECS", 3)?,
            invitation_timeout_secs: number(&lookup, "INVITATION_TIMEOUT_SECS", 20)?,
        })
    }
}

fn number<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio_test::{assert_err, assert_ok};

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = assert_ok!(load(&[]));
        assert_eq!(config.server_addr.port(), 8080);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.client_origin, "http://localhost:5173");
        assert_eq!(config.tick_rate, 30);
        assert_eq!(config.building_phase_secs, 120);
        assert_eq!(config.match_countdown_secs, 3);
        assert_eq!(config.invitation_timeout_secs, 20);
    }

    #[test]
    fn port_wins_over_server_addr() {
        let config = assert_ok!(load(&[("PORT", "9000"), ("SERVER_ADDR", "127.0.0.1:7000")]));
        assert_eq!(config.server_addr.port(), 9000);

        let config = assert_ok!(load(&[("SERVER_ADDR", "127.0.0.1:7000")]));
        assert_eq!(config.server_addr.to_string(), "127.0.0.1:7000");
    }

    #[test]
    fn bad_numbers_are_rejected() {
        assert!(matches!(
            load(&[("TICK_RATE", "fast")]),
            Err(ConfigError::Invalid("TICK_RATE"))
        ));
        assert!(matches!(
            load(&[("TICK_RATE", "0")]),
            Err(ConfigError::Invalid("TICK_RATE"))
        ));
        assert!(matches!(
            load(&[("BUILDING_PHASE_SECS", "-1")]),
            Err(ConfigError::Invalid("BUILDING_PHASE_SECS"))
        ));
        assert!(matches!(
            assert_err!(load(&[("SERVER_ADDR", "nowhere")])),
            ConfigError::InvalidAddress
        ));
    }
}

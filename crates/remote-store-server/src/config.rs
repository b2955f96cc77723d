//! Server configuration from environment variables.

use std::net::{AddrParseError, Ipv4Addr, SocketAddr, SocketAddrV4};

use thiserror::Error;

/// Listen address variable.
pub const ADDR_VAR: &str = "FEUD_ADDR";

/// Initial title variable.
pub const TITLE_VAR: &str = "FEUD_TITLE";

/// Address used when `FEUD_ADDR` is unset.
pub const DEFAULT_ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8030));

/// Title used when `FEUD_TITLE` is unset.
pub const DEFAULT_TITLE: &str = "Default Title";

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {var} '{value}': {source}")]
    InvalidAddr {
        var: &'static str,
        value: String,
        #[source]
        source: AddrParseError,
    },
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket listener binds to.
    pub addr: SocketAddr,
    /// Title the game starts with.
    pub title: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    /// Returns error if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using `lookup` to read variables.
    ///
    /// # Errors
    /// Returns error if a variable is set to an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ADDR_VAR).filter(|v| !v.trim().is_empty()) {
            config.addr = value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidAddr {
                    var: ADDR_VAR,
                    value: value.clone(),
                    source,
                })?;
        }

        if let Some(title) = lookup(TITLE_VAR) {
            config.title = title;
        }

        Ok(config)
    }
}

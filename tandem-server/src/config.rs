use std::env;
use tandem_core::IceServerConfig;
use tandem_core::util::{DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2};

/// Relay configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8001,
            ice_servers: vec![IceServerConfig {
                urls: vec![DEFAULT_STUN_ADDR.to_string(), DEFAULT_STUN_ADDR_2.to_string()],
                username: None,
                credential: None,
            }],
        }
    }
}

impl ServerConfig {
    /// Reads `TANDEM_PORT` and the optional `TURN_URL` / `TURN_USERNAME` /
    /// `TURN_CREDENTIAL` triple. A TURN server is appended to the default
    /// STUN list when configured.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(port) = env::var("TANDEM_PORT").ok().and_then(|p| p.parse().ok()) {
            config.port = port;
        }

        if let Ok(turn_url) = env::var("TURN_URL") {
            config.ice_servers.push(IceServerConfig {
                urls: vec![turn_url],
                username: env::var("TURN_USERNAME").ok(),
                credential: env::var("TURN_CREDENTIAL").ok(),
            });
        }

        config
    }
}

// config.rs — plain configuration structs shared by the server and client
// binaries.
//
// Parsing `server.properties`/`client.properties` is deliberately kept out
// of this crate: that belongs to the binaries that own it, same as the
// original implementation keeps `myq2-sys`'s platform/config
// plumbing separate from `myq2-common`'s engine types. What belongs here is
// the *shape* both binaries and the core agree on.

use std::net::IpAddr;
use std::time::Duration;

/// Clients silent for this long are disconnected (entity destroyed,
/// `PlayerDisconnected` broadcast, slot cleared).
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(45);

/// Default UDP port both binaries bind/connect to when unconfigured.
pub const DEFAULT_PORT: u16 = 4242;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_ip: IpAddr,
    pub port: u16,
    pub max_clients: u32,
    pub client_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            max_clients: 64,
            client_timeout: DEFAULT_CLIENT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_ip: IpAddr,
    pub port: u16,
    pub player_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_ip: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
            player_name: "Player".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_defaults() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.client_timeout, Duration::from_secs(45));
    }

    #[test]
    fn client_config_defaults() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.player_name, "Player");
    }
}

// config.rs — `server.properties` loading. A flat `KEY=VALUE` file rather
// than the prior implementation's `Cvar`/console-command system (no
// in-game console here, just a config file read once at startup), kept to
// the same case-insensitive-key, `#`-comment convention as the prior implementation's
// `.cfg` parsing in `cmd.rs`/`files.rs`.

use std::fs;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use wingman_common::error::ConfigError;
use wingman_common::config::ServerConfig;

/// Parse `server.properties`-style text into a [`ServerConfig`], validating
/// `PORT` and `MAX_CLIENTS`. Unknown keys are ignored; missing keys keep
/// their default.
pub fn parse_server_config(text: &str) -> Result<ServerConfig, ConfigError> {
    let mut config = ServerConfig::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else { continue };
        let key = key.trim().to_ascii_uppercase();
        let value = value.trim();

        match key.as_str() {
            "BIND_IP" => {
                if let Ok(ip) = value.parse::<IpAddr>() {
                    config.bind_ip = ip;
                }
            }
            "PORT" => {
                let port: i64 = value.parse().map_err(|_| ConfigError::BadPort(-1))?;
                if port < 1 || port > 65535 {
                    return Err(ConfigError::BadPort(port));
                }
                config.port = port as u16;
            }
            "MAX_CLIENTS" => {
                let max: i64 = value.parse().map_err(|_| ConfigError::BadMaxClients(-1))?;
                if max <= 0 {
                    return Err(ConfigError::BadMaxClients(max));
                }
                config.max_clients = max as u32;
            }
            "CLIENT_TIMEOUT_SECS" => {
                if let Ok(secs) = value.parse::<u64>() {
                    config.client_timeout = Duration::from_secs(secs);
                }
            }
            _ => {}
        }
    }

    Ok(config)
}

/// Load and parse `server.properties` from `path`, falling back to
/// defaults if the file doesn't exist.
pub fn load_server_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    if !path.exists() {
        return Ok(ServerConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::MissingFile {
        path: path.display().to_string(),
        source,
    })?;
    parse_server_config(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_keys() {
        let text = "# comment\nPORT=9000\nMAX_CLIENTS=32\nBIND_IP=127.0.0.1\n";
        let config = parse_server_config(text).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_clients, 32);
        assert_eq!(config.bind_ip, "127.0.0.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn keys_are_case_insensitive() {
        let config = parse_server_config("port=1234\n").unwrap();
        assert_eq!(config.port, 1234);
    }

    #[test]
    fn rejects_out_of_range_port() {
        let err = parse_server_config("PORT=70000\n").unwrap_err();
        assert!(matches!(err, ConfigError::BadPort(70000)));
    }

    #[test]
    fn rejects_zero_max_clients() {
        let err = parse_server_config("MAX_CLIENTS=0\n").unwrap_err();
        assert!(matches!(err, ConfigError::BadMaxClients(0)));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = parse_server_config("FOO=bar\nPORT=4242\n").unwrap();
        assert_eq!(config.port, 4242);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_server_config(Path::new("/nonexistent/server.properties")).unwrap();
        assert_eq!(config.port, wingman_common::config::DEFAULT_PORT);
    }
}

// config.rs — `client.properties` loading. Same flat `KEY=VALUE`,
// case-insensitive, `#`-comment convention as the server's
// `server.properties`, parsed independently since each binary crate owns
// its own config parsing.

use std::fs;
use std::net::IpAddr;
use std::path::Path;

use wingman_common::config::ClientConfig;
use wingman_common::error::ConfigError;

/// Parse `client.properties`-style text into a [`ClientConfig`]. Unknown
/// keys are ignored; missing keys keep their default.
pub fn parse_client_config(text: &str) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else { continue };
        let key = key.trim().to_ascii_uppercase();
        let value = value.trim();

        match key.as_str() {
            "IP" => {
                if let Ok(ip) = value.parse::<IpAddr>() {
                    config.server_ip = ip;
                }
            }
            "PORT" => {
                let port: i64 = value.parse().map_err(|_| ConfigError::BadPort(-1))?;
                if port < 1 || port > 65535 {
                    return Err(ConfigError::BadPort(port));
                }
                config.port = port as u16;
            }
            "NAME" => {
                if !value.is_empty() {
                    config.player_name = value.to_string();
                }
            }
            _ => {}
        }
    }

    Ok(config)
}

/// Load and parse `client.properties` from `path`, falling back to
/// defaults if the file doesn't exist.
pub fn load_client_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    if !path.exists() {
        return Ok(ClientConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::MissingFile {
        path: path.display().to_string(),
        source,
    })?;
    parse_client_config(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_keys() {
        let text = "# comment\nIP=10.0.0.5\nPORT=9000\nNAME=Alice\n";
        let config = parse_client_config(text).unwrap();
        assert_eq!(config.server_ip, "10.0.0.5".parse::<IpAddr>().unwrap());
        assert_eq!(config.port, 9000);
        assert_eq!(config.player_name, "Alice");
    }

    #[test]
    fn keys_are_case_insensitive() {
        let config = parse_client_config("port=1234\n").unwrap();
        assert_eq!(config.port, 1234);
    }

    #[test]
    fn rejects_out_of_range_port() {
        let err = parse_client_config("PORT=70000\n").unwrap_err();
        assert!(matches!(err, ConfigError::BadPort(70000)));
    }

    #[test]
    fn blank_name_keeps_default() {
        let config = parse_client_config("NAME=\n").unwrap();
        assert_eq!(config.player_name, "Player");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_client_config(Path::new("/nonexistent/client.properties")).unwrap();
        assert_eq!(config.port, wingman_common::config::DEFAULT_PORT);
    }
}

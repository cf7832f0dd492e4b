//! Configuration module for cmdwire.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "cmdwire")]
#[command(author = "cmdwire authors")]
#[command(version = "0.1.0")]
#[command(about = "A remote command execution server and client", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub role: Role,
}

/// Which side of the wire this process runs
#[derive(Subcommand, Debug)]
pub enum Role {
    /// Run the command execution server
    Serve {
        /// Address to bind to (e.g., 127.0.0.1:8080)
        #[arg(short = 'l', long)]
        listen: Option<String>,
    },
    /// Connect to a server and prompt for commands
    Connect {
        /// Server address to connect to
        #[arg(short = 'a', long)]
        address: Option<String>,
    },
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_endpoint")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_endpoint(),
        }
    }
}

/// Client-related configuration
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    /// Server address to connect to
    #[serde(default = "default_endpoint")]
    pub address: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: default_endpoint(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_endpoint() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub log_level: String,
}

/// Resolved role with its endpoint
#[derive(Debug, Clone)]
pub enum Mode {
    Serve { listen: String },
    Connect { address: String },
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    /// CLI arguments take precedence over TOML file values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::resolve(CliArgs::parse())
    }

    fn resolve(cli: CliArgs) -> Result<Self, ConfigError> {
        // Load TOML config if specified
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        // Merge CLI args with TOML config (CLI takes precedence)
        let mode = match cli.role {
            Role::Serve { listen } => Mode::Serve {
                listen: listen.unwrap_or(toml_config.server.listen),
            },
            Role::Connect { address } => Mode::Connect {
                address: address.unwrap_or(toml_config.client.address),
            },
        };

        Ok(Config {
            mode,
            log_level: if cli.log_level != "info" {
                cli.log_level
            } else {
                toml_config.logging.level
            },
        })
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TomlConfig::default();
        assert_eq!(config.server.listen, "127.0.0.1:8080");
        assert_eq!(config.client.address, "127.0.0.1:8080");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [server]
            listen = "0.0.0.0:8080"

            [client]
            address = "192.168.1.10:8080"

            [logging]
            level = "debug"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:8080");
        assert_eq!(config.client.address, "192.168.1.10:8080");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = CliArgs {
            config: None,
            log_level: "debug".to_string(),
            role: Role::Serve {
                listen: Some("0.0.0.0:9000".to_string()),
            },
        };

        let config = Config::resolve(cli).unwrap();
        assert_eq!(config.log_level, "debug");
        match config.mode {
            Mode::Serve { listen } => assert_eq!(listen, "0.0.0.0:9000"),
            other => panic!("unexpected mode: {:?}", other),
        }
    }

    #[test]
    fn test_defaults_without_file_or_flags() {
        let cli = CliArgs {
            config: None,
            log_level: "info".to_string(),
            role: Role::Connect { address: None },
        };

        let config = Config::resolve(cli).unwrap();
        assert_eq!(config.log_level, "info");
        match config.mode {
            Mode::Connect { address } => assert_eq!(address, "127.0.0.1:8080"),
            other => panic!("unexpected mode: {:?}", other),
        }
    }
}

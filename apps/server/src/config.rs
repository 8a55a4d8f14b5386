//! Server configuration

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use user_registry::{MailboxPolicy, RegistryConfig, MAX_MAILBOX_CAPACITY};

/// Prefix of every environment variable read by [`ServerConfig::load`]
pub const ENV_PREFIX: &str = "USER_DIRECTORY_";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue {
                key: "LOG_FORMAT",
                value: s.to_string(),
            }),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0:8080")
    pub bind_address: String,

    /// How long a request waits for the user registry, in milliseconds
    pub ask_timeout_ms: u64,

    /// Maximum number of queued registry commands. Unbounded when absent;
    /// when set, commands arriving at a full queue are rejected as unavailable.
    pub mailbox_capacity: Option<usize>,

    /// Whether to enable CORS
    pub enable_cors: bool,

    /// Allowed CORS origins (any origin when empty)
    pub cors_origins: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format
    pub log_format: LogFormat,
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_ask_timeout_ms() -> u64 {
    user_registry::DEFAULT_ASK_TIMEOUT.as_millis() as u64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            ask_timeout_ms: default_ask_timeout_ms(),
            mailbox_capacity: None,
            enable_cors: true,
            cors_origins: Vec::new(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from defaults, an optional config file and the
    /// environment, in increasing order of precedence
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config_path = std::env::var(format!("{ENV_PREFIX}CONFIG"))
            .ok()
            .map(PathBuf::from)
            .or_else(Self::find_config_file);

        Self::load_from(config_path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Load configuration from an optional file and an environment lookup
    pub fn load_from(
        config_path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Override fields from `USER_DIRECTORY_*` variables
    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let var = |name: &str| env(&format!("{ENV_PREFIX}{name}"));

        if let Some(addr) = var("BIND_ADDRESS") {
            self.bind_address = addr;
        }

        if let Some(timeout) = var("ASK_TIMEOUT_MS") {
            self.ask_timeout_ms = parse_value("ASK_TIMEOUT_MS", &timeout)?;
        }

        if let Some(capacity) = var("MAILBOX_CAPACITY") {
            self.mailbox_capacity = if capacity.trim().is_empty() {
                None
            } else {
                Some(parse_value("MAILBOX_CAPACITY", &capacity)?)
            };
        }

        if let Some(val) = var("ENABLE_CORS") {
            self.enable_cors = parse_value("ENABLE_CORS", &val)?;
        }

        if let Some(origins) = var("CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(level) = var("LOG_LEVEL") {
            self.log_level = level;
        }

        if let Some(format) = var("LOG_FORMAT") {
            self.log_format = format.parse()?;
        }

        Ok(())
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let locations = [
            Some(PathBuf::from("user-directory.toml")),
            Some(PathBuf::from("/etc/user-directory/server.toml")),
            dirs::config_dir().map(|p| p.join("user-directory").join("server.toml")),
        ];

        locations.into_iter().flatten().find(|p| p.exists())
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.ask_timeout_ms == 0 {
            return Err(ConfigError::ZeroAskTimeout);
        }

        match self.mailbox_capacity {
            Some(0) => return Err(ConfigError::ZeroMailboxCapacity),
            Some(capacity) if capacity > MAX_MAILBOX_CAPACITY => {
                return Err(ConfigError::MailboxCapacityTooLarge { capacity })
            }
            _ => {}
        }

        Ok(())
    }

    /// The registry ask timeout
    pub fn ask_timeout(&self) -> Duration {
        Duration::from_millis(self.ask_timeout_ms)
    }

    /// Registry wiring derived from this configuration
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            ask_timeout: self.ask_timeout(),
            mailbox: MailboxPolicy::from_capacity(self.mailbox_capacity),
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Ask timeout must be greater than zero")]
    ZeroAskTimeout,

    #[error("Mailbox capacity must be greater than zero (omit it for an unbounded mailbox)")]
    ZeroMailboxCapacity,

    #[error("Mailbox capacity {capacity} exceeds the maximum of {max}", max = MAX_MAILBOX_CAPACITY)]
    MailboxCapacityTooLarge { capacity: usize },

    #[error("Invalid value for {prefix}{key}: {value:?}", prefix = ENV_PREFIX)]
    InvalidValue { key: &'static str, value: String },

    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, io::Write};

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (format!("{ENV_PREFIX}{k}"), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    fn write_config(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "user-directory-test-{}-{}.toml",
            std::process::id(),
            contents.len()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.ask_timeout(), Duration::from_secs(5));
        assert_eq!(config.mailbox_capacity, None);
        assert_eq!(config.registry_config().mailbox, MailboxPolicy::Unbounded);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::load_from(
            None,
            env_from(&[
                ("BIND_ADDRESS", "127.0.0.1:9000"),
                ("ASK_TIMEOUT_MS", "250"),
                ("MAILBOX_CAPACITY", "64"),
                ("CORS_ORIGINS", "https://a.example, https://b.example"),
                ("LOG_FORMAT", "JSON"),
            ]),
        )
        .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.ask_timeout(), Duration::from_millis(250));
        assert_eq!(config.mailbox_capacity, Some(64));
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_env_takes_precedence_over_file() {
        let path = write_config(
            r#"
            bind_address = "127.0.0.1:7000"
            ask_timeout_ms = 1500
            log_level = "debug"
            "#,
        );

        let config =
            ServerConfig::load_from(Some(&path), env_from(&[("ASK_TIMEOUT_MS", "300")])).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.bind_address, "127.0.0.1:7000");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.ask_timeout_ms, 300);
        // Keys absent from the file keep their defaults
        assert!(config.enable_cors);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            ServerConfig::load_from(None, env_from(&[("ASK_TIMEOUT_MS", "0")])),
            Err(ConfigError::ZeroAskTimeout)
        ));
        assert!(matches!(
            ServerConfig::load_from(None, env_from(&[("MAILBOX_CAPACITY", "0")])),
            Err(ConfigError::ZeroMailboxCapacity)
        ));
        assert!(matches!(
            ServerConfig::load_from(
                None,
                env_from(&[("MAILBOX_CAPACITY", "18446744073709551615")])
            ),
            Err(ConfigError::MailboxCapacityTooLarge { .. })
        ));
        let max = MAX_MAILBOX_CAPACITY.to_string();
        assert!(
            ServerConfig::load_from(None, env_from(&[("MAILBOX_CAPACITY", max.as_str())])).is_ok()
        );
        assert!(matches!(
            ServerConfig::load_from(None, env_from(&[("ASK_TIMEOUT_MS", "soon")])),
            Err(ConfigError::InvalidValue {
                key: "ASK_TIMEOUT_MS",
                ..
            })
        ));
        assert!(matches!(
            ServerConfig::load_from(None, env_from(&[("LOG_FORMAT", "xml")])),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(" Json ".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!(matches!(
            "xml".parse::<LogFormat>(),
            Err(ConfigError::InvalidValue {
                key: "LOG_FORMAT",
                ..
            })
        ));
    }
}

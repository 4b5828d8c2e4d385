use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Profile used when none is configured
pub const DEFAULT_PROFILE: &str = "demo";

/// Environment variable holding the relay token when the config has none
pub const TOKEN_ENV_VAR: &str = "WECHATY_TOKEN";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Token authorizing the Io relay
    #[serde(default)]
    pub token: Option<String>,
    /// Messaging client profile (session storage name)
    #[serde(default = "default_profile")]
    pub profile: String,
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token: None,
            profile: default_profile(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily rolling log files; console only when unset
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("client.profile", DEFAULT_PROFILE)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("IOCLIENT_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (IOCLIENT_CLIENT__TOKEN, etc.)
            .add_source(
                Environment::with_prefix("IOCLIENT")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        if config.client.token.is_none() {
            config.client.token = std::env::var(TOKEN_ENV_VAR).ok();
        }
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match self.client.token.as_deref().map(str::trim) {
            None => errors.push(format!(
                "client.token must be set (or export {TOKEN_ENV_VAR})"
            )),
            Some("") => errors.push("client.token must not be empty".to_string()),
            Some(_) => {}
        }

        if self.client.profile.trim().is_empty() {
            errors.push("client.profile must not be empty".to_string());
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "logging.level must be one of {}, got {}",
                LOG_LEVELS.join(", "),
                self.logging.level
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

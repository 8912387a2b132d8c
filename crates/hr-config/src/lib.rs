//! Configuration management for hr.
//!
//! Parses `hr.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [page]
//! url = "http://localhost:3000"
//! path = "/ws/reload"
//!
//! [backoff]
//! floor_ms = 1000
//! ceiling_ms = 10000
//!
//! [agent]
//! greeting = "Hello"
//!
//! [reload]
//! command = ["touch", "reload.stamp"]
//! ```
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `page.url`
//! - `reload.command` (every element)

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override page URL.
    pub page_url: Option<String>,
    /// Override reload socket path.
    pub path: Option<String>,
    /// Override backoff floor.
    pub floor_ms: Option<u64>,
    /// Override backoff ceiling.
    pub ceiling_ms: Option<u64>,
    /// Override greeting.
    pub greeting: Option<String>,
    /// Override reload command.
    pub command: Option<Vec<String>>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "hr.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Watched page.
    pub page: PageConfig,
    /// Reconnect backoff.
    pub backoff: BackoffConfig,
    /// Agent behaviour.
    pub agent: AgentSection,
    /// Reload action.
    pub reload: ReloadConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Watched page configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Page URL; the reload socket lives on its host and port.
    pub url: String,
    /// Path of the reload socket.
    pub path: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_owned(),
            path: "/ws/reload".to_owned(),
        }
    }
}

/// Backoff configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay after a successful open, in milliseconds.
    pub floor_ms: u64,
    /// Upper bound for the delay, in milliseconds.
    pub ceiling_ms: u64,
}

impl BackoffConfig {
    #[must_use]
    pub fn floor(&self) -> Duration {
        Duration::from_millis(self.floor_ms)
    }

    #[must_use]
    pub fn ceiling(&self) -> Duration {
        Duration::from_millis(self.ceiling_ms)
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            floor_ms: 1000,
            ceiling_ms: 10_000,
        }
    }
}

/// Agent configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// Text sent after every successful connect.
    pub greeting: String,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            greeting: "Hello".to_owned(),
        }
    }
}

/// Reload action configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Program and arguments to run on reload. `None` logs and exits.
    pub command: Option<Vec<String>>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`page.url`").
        field: String,
        /// Error message (e.g., "${`DEV_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to be an absolute http:// or https:// URL with a host.
///
/// The scheme is matched case-insensitively, as URL parsing lowercases it.
fn require_http_url(value: &str, field: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::Validation(format!("{field} is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::Validation(format!(
            "{field} must be an http:// or https:// URL with a host"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `hr.toml` in current directory and parents,
    /// falling back to defaults.
    ///
    /// CLI settings are applied after loading; the result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(_) => None,
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_from(&cwd)),
        };
        Self::load_with(config_path.or(discovered.as_deref()), cli_settings)
    }

    fn load_with(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(page_url) = &settings.page_url {
            self.page.url.clone_from(page_url);
        }
        if let Some(path) = &settings.path {
            self.page.path.clone_from(path);
        }
        if let Some(floor_ms) = settings.floor_ms {
            self.backoff.floor_ms = floor_ms;
        }
        if let Some(ceiling_ms) = settings.ceiling_ms {
            self.backoff.ceiling_ms = ceiling_ms;
        }
        if let Some(greeting) = &settings.greeting {
            self.agent.greeting.clone_from(greeting);
        }
        if let Some(command) = &settings.command {
            self.reload.command = Some(command.clone());
        }
    }

    /// Search for the config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.exists())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_page()?;
        self.validate_backoff()?;
        self.validate_reload()?;
        Ok(())
    }

    fn validate_page(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.page.url, "page.url")?;
        require_http_url(&self.page.url, "page.url")?;
        if !self.page.path.starts_with('/') {
            return Err(ConfigError::Validation(
                "page.path must start with '/'".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_backoff(&self) -> Result<(), ConfigError> {
        if self.backoff.floor_ms == 0 {
            return Err(ConfigError::Validation(
                "backoff.floor_ms must be greater than 0".to_owned(),
            ));
        }
        if self.backoff.ceiling_ms < self.backoff.floor_ms {
            return Err(ConfigError::Validation(format!(
                "backoff.ceiling_ms ({}) cannot be less than backoff.floor_ms ({})",
                self.backoff.ceiling_ms, self.backoff.floor_ms
            )));
        }
        Ok(())
    }

    fn validate_reload(&self) -> Result<(), ConfigError> {
        if let Some(command) = &self.reload.command {
            let program = command.first().map(String::as_str).unwrap_or_default();
            require_non_empty(program, "reload.command")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.page.url = expand::expand_env(&self.page.url, "page.url")?;

        if let Some(command) = &mut self.reload.command {
            for arg in command.iter_mut() {
                *arg = expand::expand_env(arg, "reload.command")?;
            }
        }

        Ok(())
    }
}

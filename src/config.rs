//! Configuration for kvcli
//!
//! Layered configuration with sensible defaults:
//!
//! 1. Built-in defaults
//! 2. TOML file (`~/.kv/config.toml`, then `./config.toml`)
//! 3. Environment variables (`KV_HOST`, `KV_PORT`, ...)
//! 4. Command-line flags (applied by the binary through [`ConfigBuilder`])
//!
//! The protocol client only ever sees the resolved [`Settings`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{KvError, Result};

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 9000;

/// Default per-operation timeout (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Directory under the home directory holding the config file
pub const CONFIG_DIR_NAME: &str = ".kv";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Contents written by `kv config init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# KV Storage Engine CLI Configuration

[server]
# Server connection settings
host = "127.0.0.1"
port = 9000
timeout_ms = 3000

[output]
# Output format: text or json
format = "text"

# Enable colored output (only applies to text format)
color = true
"#;

// Environment variables, in precedence order per setting
const ENV_HOST: &[&str] = &["KV_HOST", "KV_SERVER_HOST"];
const ENV_PORT: &[&str] = &["KV_PORT", "KV_SERVER_PORT"];
const ENV_TIMEOUT_MS: &[&str] = &["KV_TIMEOUT_MS", "KV_SERVER_TIMEOUT_MS"];
const ENV_FORMAT: &[&str] = &["KV_FORMAT", "KV_OUTPUT_FORMAT"];
const ENV_COLOR: &[&str] = &["KV_COLOR", "KV_OUTPUT_COLOR"];

/// Resolved connection settings handed to the protocol client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Server host name or IP
    pub host: String,

    /// Server port (1..=65535)
    pub port: u16,

    /// Per-operation timeout; zero disables deadlines
    pub timeout: Duration,
}

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,

    /// Pretty-printed JSON objects
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = KvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(KvError::Config(format!(
                "output format must be 'text' or 'json', got '{}'",
                other
            ))),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Server Configuration
    // -------------------------------------------------------------------------
    pub server: ServerConfig,

    // -------------------------------------------------------------------------
    // Output Configuration
    // -------------------------------------------------------------------------
    pub output: OutputConfig,
}

/// Server connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host name or IP
    pub host: String,

    /// Server port
    pub port: u16,

    /// Per-operation timeout (milliseconds)
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ServerConfig {
    /// Timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Output formatting settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,

    /// Colored text output (ignored for JSON)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load configuration from the first config file found and the process
    /// environment
    ///
    /// A missing config file is not an error. Rejected environment variables
    /// are logged and skipped. Validation is left to the caller, since
    /// command-line flags may still change the result.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path().as_deref(), |name| std::env::var(name).ok())
    }

    /// Load from an explicit file (if any) and environment `lookup`
    pub fn load_from<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(path)?
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                Self::default()
            }
        };
        for e in config.apply_env(lookup) {
            tracing::warn!("Ignoring environment override: {}", e);
        }
        Ok(config)
    }

    /// Parse a TOML config file
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables
    ///
    /// Each variable is applied on its own: a malformed value leaves that
    /// field untouched and is returned as a `Config` error.
    #[must_use = "rejected overrides should be reported"]
    pub fn apply_env<F>(&mut self, lookup: F) -> Vec<KvError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| names.iter().find_map(|&name| lookup(name));
        let mut rejected = Vec::new();

        if let Some(host) = first(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = first(ENV_PORT) {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => rejected.push(KvError::Config(format!(
                    "server port must be between 1 and 65535, got {}",
                    port
                ))),
            }
        }
        if let Some(timeout) = first(ENV_TIMEOUT_MS) {
            match timeout.trim().parse() {
                Ok(timeout_ms) => self.server.timeout_ms = timeout_ms,
                Err(_) => rejected.push(KvError::Config(format!(
                    "server timeout_ms must be a non-negative integer, got {}",
                    timeout
                ))),
            }
        }
        if let Some(format) = first(ENV_FORMAT) {
            match format.parse() {
                Ok(format) => self.output.format = format,
                Err(e) => rejected.push(e),
            }
        }
        if let Some(color) = first(ENV_COLOR) {
            match parse_bool(&color) {
                Ok(color) => self.output.color = color,
                Err(e) => rejected.push(e),
            }
        }

        rejected
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(KvError::Config("server host cannot be empty".to_string()));
        }
        if self.server.port == 0 {
            return Err(KvError::Config(
                "server port must be between 1 and 65535, got 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolved settings for the protocol client
    pub fn settings(&self) -> Settings {
        Settings {
            host: self.server.host.clone(),
            port: self.server.port,
            timeout: self.server.timeout(),
        }
    }

    /// Flattened `key: value` pairs, in a stable order, for display
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("server.host", self.server.host.clone()),
            ("server.port", self.server.port.to_string()),
            ("server.timeout_ms", self.server.timeout_ms.to_string()),
            ("output.format", self.output.format.to_string()),
            ("output.color", self.output.color.to_string()),
        ]
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(KvError::Config(format!(
            "expected a boolean, got '{}'",
            other
        ))),
    }
}

// =============================================================================
// Config File Locations
// =============================================================================

/// Default config file location (`~/.kv/config.toml`)
pub fn default_config_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Candidate config files, in search order
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(2);
    if let Some(path) = default_config_file() {
        paths.push(path);
    }
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    paths
}

/// The config file that `Config::load` would read, if any
pub fn config_path() -> Option<PathBuf> {
    search_paths().into_iter().find(|path| path.is_file())
}

/// Write the default config to `~/.kv/config.toml`
pub fn create_default_config() -> Result<PathBuf> {
    let path = default_config_file()
        .ok_or_else(|| KvError::Config("failed to get home directory".to_string()))?;
    write_default_config(&path)?;
    Ok(path)
}

/// Write the default config to `path`, creating parent directories
///
/// Refuses to overwrite an existing file.
pub fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(KvError::Config(format!(
            "config file already exists at {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
    tracing::debug!("Wrote default config to {}", path.display());
    Ok(())
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from an existing config (e.g. one loaded from disk)
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Set the per-operation timeout (in milliseconds)
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.server.timeout_ms = ms;
        self
    }

    /// Set the output format
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Enable or disable colored output
    pub fn color(mut self, enabled: bool) -> Self {
        self.config.output.color = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::photo::DEFAULT_MAX_SIZE;
use crate::worker::{CollectOptions, SerialSettings, DEFAULT_LINE_TIMEOUT, DEFAULT_SETTLE_DELAY};

/// Configuration for icsig.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (ICSIG_* prefix)
/// 3. Config file (~/.config/icsig/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial device the test fixture is attached to.
    ///
    /// Can be set via:
    /// - CLI: --port /dev/ttyACM0
    /// - ENV: ICSIG_SERIAL_PORT
    /// - Config: serial_port = "/dev/ttyACM0"
    pub serial_port: String,

    /// Serial line speed; the fixture firmware uses 9600.
    pub baud_rate: u32,

    /// Longest wait for a single line from the fixture, in seconds.
    pub line_timeout_secs: u64,

    /// Pause after opening the port while the fixture resets, in milliseconds.
    pub settle_delay_ms: u64,

    /// Path to the SQLite catalog.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: ICSIG_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/icsig/icsig.db
    pub database_path: PathBuf,

    /// Where the last collection session is kept between invocations.
    pub session_path: PathBuf,

    /// Bounding box edge used when exporting reference photos.
    pub photo_max_size: u32,

    pub logging: LoggingConfig,
}

/// Logger settings passed on to twyg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error.
    pub level: String,
    pub coloured: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            coloured: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial_port: default_serial_port(),
            baud_rate: 9600,
            line_timeout_secs: DEFAULT_LINE_TIMEOUT.as_secs(),
            settle_delay_ms: u64::try_from(DEFAULT_SETTLE_DELAY.as_millis()).unwrap_or(2000),
            database_path: default_db_path(),
            session_path: default_session_path(),
            photo_max_size: DEFAULT_MAX_SIZE,
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/icsig/config.toml
    /// Reads environment variables with ICSIG_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new()
            .context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path.to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder.add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("icsig");
        builder.add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build()
            .context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with custom database path.
    ///
    /// This is used when the --db CLI flag is provided.
    pub fn load_with_db_path(db_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.database_path = db_path;
        Ok(config)
    }

    #[must_use]
    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings {
            port: self.serial_port.clone(),
            baud_rate: self.baud_rate,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }

    #[must_use]
    pub fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            line_timeout: Duration::from_secs(self.line_timeout_secs.max(1)),
        }
    }
}

fn default_serial_port() -> String {
    if cfg!(windows) {
        "COM4".to_string()
    } else {
        "/dev/ttyUSB0".to_string()
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("icsig")
}

/// Get the default database path.
///
/// Returns: ~/.local/share/icsig/icsig.db (or platform equivalent)
fn default_db_path() -> PathBuf {
    data_dir().join("icsig.db")
}

fn default_session_path() -> PathBuf {
    data_dir().join("session.json")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/icsig/config.toml
/// - macOS: ~/Library/Application Support/icsig/config.toml
/// - Windows: %APPDATA%\icsig\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("icsig")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# icsig Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (ICSIG_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Serial device the IC test fixture is attached to
#
# Can also be set via:
# - CLI: icsig collect --port /dev/ttyACM0
# - Environment: ICSIG_SERIAL_PORT=/dev/ttyACM0
serial_port = "/dev/ttyUSB0"

# Line speed; must match the fixture firmware
baud_rate = 9600

# Give up if the fixture is silent for this many seconds
line_timeout_secs = 30

# The fixture resets when the port opens; wait this long before reading
settle_delay_ms = 2000

# Path to the SQLite catalog of reference ICs
#
# Can also be set via:
# - CLI: icsig --db /custom/path.db list
# - Environment: ICSIG_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/icsig.db"

# Largest edge, in pixels, of exported reference photos
photo_max_size = 600

[logging]
# trace, debug, info, warn or error
level = "info"
coloured = true
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config())
        .context("Failed to write config file")?;

    Ok(true)
}

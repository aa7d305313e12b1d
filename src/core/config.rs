//! # Configuration
//!
//! Settings resolve in this order, later wins:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.vivu/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! Loading runs before the file logger exists (the logger's level and path
//! come from here), so messages are collected in a `StartupLog` and
//! replayed once the logger is up.

use log::{Level, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::DEFAULT_ENDPOINT;
use crate::core::session::DEFAULT_GREETING;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VivuConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Opening assistant message. An empty string disables it.
    pub greeting: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<String>,
}

pub const DEFAULT_LOG_FILE: &str = "vivu.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub endpoint: String,
    pub greeting: Option<String>,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
}

/// Values given on the command line. `None` = not specified.
#[derive(Debug, Default)]
pub struct CliOverrides<'a> {
    pub endpoint: Option<&'a str>,
    pub no_greeting: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Startup Log
// ============================================================================

/// Log records held back until the logger is initialized.
#[derive(Debug, Default)]
pub struct StartupLog {
    entries: Vec<(Level, String)>,
}

impl StartupLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, level: Level, message: impl Into<String>) {
        self.entries.push((level, message.into()));
    }

    pub fn entries(&self) -> &[(Level, String)] {
        &self.entries
    }

    /// Sends every held record to the `log` facade, oldest first.
    pub fn flush(self) {
        for (level, message) in self.entries {
            log::log!(level, "{}", message);
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.vivu/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".vivu").join("config.toml"))
}

/// Load config from `~/.vivu/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `VivuConfig::default()`.
pub fn load_config(log: &mut StartupLog) -> Result<VivuConfig, ConfigError> {
    let Some(path) = config_path() else {
        log.push(
            Level::Warn,
            "Could not determine home directory, using default config",
        );
        return Ok(VivuConfig::default());
    };
    load_config_from(&path, log)
}

pub fn load_config_from(path: &Path, log: &mut StartupLog) -> Result<VivuConfig, ConfigError> {
    if !path.exists() {
        log.push(
            Level::Info,
            format!("No config file found, generating default at {}", path.display()),
        );
        generate_default_config(path, log);
        return Ok(VivuConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: VivuConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    log.push(Level::Info, format!("Loaded config from {}", path.display()));
    log.push(Level::Debug, format!("Config: {:?}", config));
    Ok(config)
}

fn generate_default_config(path: &Path, log: &mut StartupLog) {
    let default_content = r#"# Vivu Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# greeting = "Xin chào! Where would you like to go?"   # "" disables the greeting

# [backend]
# endpoint = "http://localhost:8000/api/v1/chat"        # Or set VIVU_ENDPOINT

# [logging]
# level = "debug"                                       # off, error, warn, info, debug, trace
# file = "vivu.log"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        log.push(Level::Warn, format!("Failed to create config directory: {e}"));
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        log.push(Level::Warn, format!("Failed to write default config: {e}"));
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(
    config: &VivuConfig,
    cli: &CliOverrides<'_>,
    log: &mut StartupLog,
) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok(), log)
}

fn resolve_with_env(
    config: &VivuConfig,
    cli: &CliOverrides<'_>,
    env: impl Fn(&str) -> Option<String>,
    log: &mut StartupLog,
) -> ResolvedConfig {
    // Endpoint: CLI → env → config → default
    let endpoint = cli
        .endpoint
        .map(|s| s.to_string())
        .or_else(|| env("VIVU_ENDPOINT"))
        .or_else(|| config.backend.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let greeting = if cli.no_greeting {
        None
    } else {
        match config.general.greeting.as_deref() {
            Some("") => None,
            Some(text) => Some(text.to_string()),
            None => Some(DEFAULT_GREETING.to_string()),
        }
    };

    // Log level: env → config → default
    let log_level = env("VIVU_LOG_LEVEL")
        .or_else(|| config.logging.level.clone())
        .map(|raw| parse_level(&raw, log))
        .unwrap_or(DEFAULT_LOG_LEVEL);

    let log_file = config
        .logging
        .file
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string())
        .into();

    ResolvedConfig {
        endpoint,
        greeting,
        log_level,
        log_file,
    }
}

fn parse_level(raw: &str, log: &mut StartupLog) -> LevelFilter {
    match raw.parse::<LevelFilter>() {
        Ok(level) => level,
        Err(_) => {
            log.push(
                Level::Warn,
                format!("Unknown log level {:?}, using {}", raw, DEFAULT_LOG_LEVEL),
            );
            DEFAULT_LOG_LEVEL
        }
    }
}

//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.soul_link/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use crossterm::style::Color;
use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SoulLinkConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub data_file: Option<String>,
    pub log_file: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub column_padding: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ThemeConfig {
    pub highlight_bg: Option<String>,
    pub highlight_fg: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_COLUMN_PADDING: usize = 4;
pub const DEFAULT_LOG_FILE: &str = "soul-link.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;
pub const DEFAULT_HIGHLIGHT_BG: Color = Color::Blue;
pub const DEFAULT_HIGHLIGHT_FG: Color = Color::Black;

// ============================================================================
// Resolved Config (concrete values)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub highlight_bg: Color,
    pub highlight_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            highlight_bg: DEFAULT_HIGHLIGHT_BG,
            highlight_fg: DEFAULT_HIGHLIGHT_FG,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// None when no source named a data file.
    pub data_file: Option<PathBuf>,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
    pub column_padding: usize,
    pub theme: Theme,
}

/// Values given on the command line; `None` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub data_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
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
// Loading
// ============================================================================

/// Returns the path to `~/.soul_link/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".soul_link").join("config.toml"))
}

/// Load config from `~/.soul_link/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `SoulLinkConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<SoulLinkConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(SoulLinkConfig::default());
        }
    };
    load_config_from(&path)
}

/// Same as [`load_config`] for an explicit path.
pub fn load_config_from(path: &Path) -> Result<SoulLinkConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(SoulLinkConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: SoulLinkConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Soul Link Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# data_file = "games.csv"            # CSV or JSON grid; or set SOUL_LINK_DATA
# log_file = "soul-link.log"
# log_level = "debug"                # "off", "error", "warn", "info", "debug", "trace"

# [display]
# column_padding = 4                 # Extra width added to each header label

# [theme]
# highlight_bg = "blue"
# highlight_fg = "black"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &SoulLinkConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Data file: CLI → env → config
    let data_file = cli
        .data_file
        .clone()
        .or_else(|| std::env::var("SOUL_LINK_DATA").ok().map(PathBuf::from))
        .or_else(|| config.general.data_file.as_ref().map(PathBuf::from));

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| config.general.log_file.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    // Log level: env → config → default
    let log_level = std::env::var("SOUL_LINK_LOG_LEVEL")
        .ok()
        .or_else(|| config.general.log_level.clone())
        .map(|level| parse_level(&level))
        .unwrap_or(DEFAULT_LOG_LEVEL);

    let theme = Theme {
        highlight_bg: parse_color(config.theme.highlight_bg.as_deref(), DEFAULT_HIGHLIGHT_BG),
        highlight_fg: parse_color(config.theme.highlight_fg.as_deref(), DEFAULT_HIGHLIGHT_FG),
    };

    ResolvedConfig {
        data_file,
        log_file,
        log_level,
        column_padding: config
            .display
            .column_padding
            .unwrap_or(DEFAULT_COLUMN_PADDING),
        theme,
    }
}

fn parse_level(level: &str) -> LevelFilter {
    level.parse().unwrap_or_else(|_| {
        warn!("Unknown log level '{}', using {}", level, DEFAULT_LOG_LEVEL);
        DEFAULT_LOG_LEVEL
    })
}

fn parse_color(name: Option<&str>, fallback: Color) -> Color {
    let Some(name) = name else {
        return fallback;
    };
    Color::try_from(name).unwrap_or_else(|_| {
        warn!("Unknown color '{}', using {:?}", name, fallback);
        fallback
    })
}

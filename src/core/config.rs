//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.cxview/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CxviewConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub snapshot: Option<PathBuf>,
    pub events: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub context_links: Option<bool>,
    pub max_section_lines: Option<usize>,
    pub list_width: Option<u16>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_MAX_SECTION_LINES: usize = 20;
pub const DEFAULT_LIST_WIDTH: u16 = 44;
/// Narrower than this and rows lose their right-aligned timestamp.
pub const MIN_LIST_WIDTH: u16 = 24;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub snapshot_path: Option<PathBuf>,
    pub events_path: Option<PathBuf>,
    /// Whether `child_context_id=N` references render as navigation controls.
    pub context_links: bool,
    pub max_section_lines: usize,
    pub list_width: u16,
}

/// Values taken from command-line flags. `None` = flag not given.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub snapshot: Option<PathBuf>,
    pub events: Option<PathBuf>,
    pub no_links: bool,
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

/// Returns the path to `~/.cxview/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".cxview").join("config.toml"))
}

/// Load config from an explicit path or `~/.cxview/config.toml`.
///
/// If the default file doesn't exist, generates a commented-out default and
/// returns `CxviewConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config(explicit: Option<&Path>) -> Result<CxviewConfig, ConfigError> {
    let path = match explicit.map(Path::to_path_buf).or_else(config_path) {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(CxviewConfig::default());
        }
    };

    if !path.exists() {
        if explicit.is_some() {
            return Err(ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        }
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(CxviewConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<CxviewConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# cxview configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# snapshot = "/path/to/snapshot.json"   # Or set CXVIEW_SNAPSHOT
# events = "/path/to/events.jsonl"      # Or set CXVIEW_EVENTS

# [ui]
# context_links = true                  # child_context_id=N becomes a link
# max_section_lines = 20                # cap for arguments / output sections
# list_width = 44                       # width of the context list column
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &CxviewConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Snapshot: CLI → env → config
    let snapshot_path = cli
        .snapshot
        .clone()
        .or_else(|| std::env::var("CXVIEW_SNAPSHOT").ok().map(PathBuf::from))
        .or_else(|| config.general.snapshot.clone());

    // Event feed: CLI → env → config
    let events_path = cli
        .events
        .clone()
        .or_else(|| std::env::var("CXVIEW_EVENTS").ok().map(PathBuf::from))
        .or_else(|| config.general.events.clone());

    let context_links = !cli.no_links && config.ui.context_links.unwrap_or(true);

    let max_section_lines = config
        .ui
        .max_section_lines
        .filter(|&n| n > 1)
        .unwrap_or(DEFAULT_MAX_SECTION_LINES);

    let list_width = config
        .ui
        .list_width
        .unwrap_or(DEFAULT_LIST_WIDTH)
        .max(MIN_LIST_WIDTH);

    ResolvedConfig {
        snapshot_path,
        events_path,
        context_links,
        max_section_lines,
        list_width,
    }
}

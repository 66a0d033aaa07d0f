//! TOML-based configuration persistence for the relay server.
//!
//! Reads and writes [`StoredConfig`] to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\PointerRelay\config.toml`
//! - Linux:    `~/.config/pointer-relay/config.toml`
//! - macOS:    `~/Library/Application Support/PointerRelay/config.toml`
//!
//! The same directory also holds the persisted auth token (see the
//! `token_file` module).
//!
//! # Serde default values
//!
//! Every field is annotated with `#[serde(default = "some_fn")]`, so a
//! missing field (or a missing section, or an entirely empty file) falls
//! back to its default.  This keeps old config files working when new
//! settings are added, and makes the first run work before any file exists.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level relay configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub limits: LimitsSection,
    #[serde(default)]
    pub discovery: DiscoverySection,
}

/// Listener address settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    /// IP address to bind the WebSocket listener to.  `"0.0.0.0"` binds all
    /// interfaces.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port for the WebSocket listener.  A `--port` flag on the command
    /// line overrides this value.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Throughput ceilings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LimitsSection {
    /// Pointer-event budget per second, shared across all sessions.
    #[serde(default = "default_max_events_per_second")]
    pub max_events_per_second: u32,
}

/// LAN discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoverySection {
    /// Whether to answer UDP discovery probes from companion apps.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_max_events_per_second() -> u32 {
    relay_core::DEFAULT_MAX_EVENTS_PER_SECOND
}
fn default_true() -> bool {
    true
}

impl Default for StoredConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            limits: LimitsSection::default(),
            discovery: DiscoverySection::default(),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            max_events_per_second: default_max_events_per_second(),
        }
    }
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads [`StoredConfig`] from disk, returning `StoredConfig::default()` if
/// the file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<StoredConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads [`StoredConfig`] from an explicit path.
///
/// Same semantics as [`load_config`]; split out so tests can point it at a
/// temp directory instead of the real platform config dir.
pub fn load_config_from(path: &Path) -> Result<StoredConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: StoredConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the platform-default config file.
///
/// Creates the config directory and file if they do not exist.  Called on
/// first run to write the defaults, so there is always a file to edit.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &StoredConfig) -> Result<(), ConfigError> {
    save_config_to(&config_file_path()?, config)
}

/// Persists `config` to an explicit path.
///
/// Same semantics as [`save_config`]; split out so tests can point it at a
/// temp directory instead of the real platform config dir.
pub fn save_config_to(path: &Path, config: &StoredConfig) -> Result<(), ConfigError> {
    // Ensure directory exists before writing.
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory including the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("PointerRelay"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("pointer-relay"))
    }

    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/PointerRelay
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("PointerRelay")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        // Fallback for unsupported platforms.
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

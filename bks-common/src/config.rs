//! Bootstrap configuration and root folder resolution
//!
//! Resolution order for every bootstrap value:
//! 1. Command-line argument (handled by the binary, passed in here)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! A missing or unreadable TOML file is never fatal: a warning is logged and
//! the remaining tiers are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the root folder
pub const ENV_ROOT_FOLDER: &str = "BKS_ROOT_FOLDER";

/// Environment variable overriding the HTTP port
pub const ENV_PORT: &str = "BKS_PORT";

/// Environment variable overriding the catalog refresh interval (minutes)
pub const ENV_REFRESH_INTERVAL_MINUTES: &str = "BKS_BOOKS_REFRESH_INTERVAL_MINUTES";

/// Environment variable overriding the number of books per refresh
pub const ENV_BOOKS_COUNT: &str = "BKS_BOOKS_COUNT";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "bks.db";

/// Values used when no other tier provides one
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub port: u16,
    pub log_level: String,
    pub refresh_interval_minutes: u64,
    pub books_count: usize,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join("bks"))
            .unwrap_or_else(|| PathBuf::from("./bks_data"));

        Self {
            root_folder,
            port: 5780,
            log_level: "info".to_string(),
            refresh_interval_minutes: 60,
            books_count: 12,
        }
    }
}

/// Bootstrap TOML file contents
///
/// Every field is optional; absent fields fall through to compiled defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub catalog: CatalogToml,
}

/// `[logging]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
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

fn default_log_level() -> String {
    "info".to_string()
}

/// `[catalog]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogToml {
    #[serde(default)]
    pub refresh_interval_minutes: Option<u64>,

    #[serde(default)]
    pub books_count: Option<usize>,
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    Ok(config)
}

/// Locate the platform config file, if one exists
///
/// Linux checks `~/.config/bks/config.toml` then `/etc/bks/config.toml`;
/// other platforms only check the user config directory.
pub fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("bks").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/bks/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load the TOML config with graceful degradation
///
/// `explicit` takes precedence over the platform location. Any failure yields
/// `TomlConfig::default()` with a warning.
pub fn load_bootstrap_config(explicit: Option<&Path>) -> TomlConfig {
    let path = match explicit.map(Path::to_path_buf).or_else(default_config_file) {
        Some(path) => path,
        None => {
            debug!("No TOML config file found, using defaults");
            return TomlConfig::default();
        }
    };

    match load_toml_config(&path) {
        Ok(config) => {
            debug!("Loaded TOML config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Ignoring TOML config {}: {}", path.display(), e);
            TomlConfig::default()
        }
    }
}

/// Resolves the root folder from CLI → ENV → TOML → default
pub struct RootFolderResolver<'a> {
    cli_arg: Option<PathBuf>,
    toml: &'a TomlConfig,
}

impl<'a> RootFolderResolver<'a> {
    pub fn new(cli_arg: Option<PathBuf>, toml: &'a TomlConfig) -> Self {
        Self { cli_arg, toml }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ENV_ROOT_FOLDER) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml.root_folder {
            return path.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Prepares the root folder on disk
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder if missing (idempotent)
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if self.root_folder.exists() && !self.root_folder.is_dir() {
            return Err(Error::Config(format!(
                "Root folder path exists but is not a directory: {}",
                self.root_folder.display()
            )));
        }
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }
}

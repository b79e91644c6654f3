use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Status of config file loading
#[derive(Debug, Clone)]
pub enum ConfigLoadStatus {
    /// Config loaded successfully from existing file
    Loaded,
    /// Created default config file (first run)
    Created,
    /// Error occurred during loading, using defaults.
    /// String is used in Debug output for logging.
    #[allow(dead_code)]
    Error(String),
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Keyword tags offered for toggling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordsConfig {
    pub suggestions: Vec<String>,
}

impl Default for KeywordsConfig {
    fn default() -> Self {
        Self {
            suggestions: ["frontend", "backend", "product", "design", "data", "infra"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl KeywordsConfig {
    /// Drop blank and repeated suggestions, keeping the first occurrence.
    pub fn normalize(&mut self) {
        let mut seen: Vec<String> = Vec::new();
        for keyword in self.suggestions.drain(..) {
            let keyword = keyword.trim().to_string();
            if !keyword.is_empty() && !seen.contains(&keyword) {
                seen.push(keyword);
            }
        }
        self.suggestions = seen;
    }
}

/// Clipboard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Command that reads the text to copy from stdin, e.g. `wl-copy`.
    /// Empty means detect a platform default.
    pub command: String,
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub keywords: KeywordsConfig,
    #[serde(default)]
    pub clipboard: ClipboardConfig,
}

impl Config {
    /// Normalize the config after deserialization.
    pub fn normalize(&mut self) {
        self.keywords.normalize();
    }

    /// Expand `~` to home directory in a path string
    pub fn expand_tilde(path: &str) -> PathBuf {
        if let Some(stripped) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(stripped);
        }
        PathBuf::from(path)
    }
}

/// Loaded configuration with metadata
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_path: PathBuf,
    pub status: ConfigLoadStatus,
}

/// Get the platform-appropriate config directory
fn get_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("dev", "clarify", "clarify").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the full path to the config file
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// Load configuration from file, environment, and defaults.
///
/// `path_override` replaces the platform config path (from `--config`).
pub fn load_config(path_override: Option<&str>) -> LoadedConfig {
    let config_path = match path_override.map(Config::expand_tilde).or_else(get_config_path) {
        Some(path) => path,
        None => {
            warn!("Could not determine config directory, using defaults");
            return LoadedConfig {
                config: apply_env_overrides(Config::default()),
                config_path: PathBuf::from("config.toml"),
                status: ConfigLoadStatus::Error("Could not determine config directory".to_string()),
            };
        }
    };

    debug!("Config path: {:?}", config_path);

    let (config, status) = load_or_create_config(&config_path);
    let config = apply_env_overrides(config);

    LoadedConfig {
        config,
        config_path,
        status,
    }
}

/// Load config from file, or create default if not exists
fn load_or_create_config(config_path: &Path) -> (Config, ConfigLoadStatus) {
    match fs::read_to_string(config_path) {
        Ok(contents) => match toml::from_str::<Config>(&contents) {
            Ok(mut config) => {
                config.normalize();
                info!("Loaded config from {:?}", config_path);
                (config, ConfigLoadStatus::Loaded)
            }
            Err(e) => {
                warn!(
                    "Config file malformed at {:?}: {}. Using defaults.",
                    config_path, e
                );
                (
                    Config::default(),
                    ConfigLoadStatus::Error(format!("Malformed TOML: {}", e)),
                )
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => create_default_config(config_path),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            warn!(
                "Permission denied reading config at {:?}. Using defaults.",
                config_path
            );
            (
                Config::default(),
                ConfigLoadStatus::Error("Permission denied reading config".to_string()),
            )
        }
        Err(e) => {
            warn!(
                "Error reading config at {:?}: {}. Using defaults.",
                config_path, e
            );
            (
                Config::default(),
                ConfigLoadStatus::Error(format!("Read error: {}", e)),
            )
        }
    }
}

/// Create the default config file
fn create_default_config(config_path: &Path) -> (Config, ConfigLoadStatus) {
    let config = Config::default();

    // Ensure parent directory exists
    if let Some(parent) = config_path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!(
            "Could not create config directory {:?}: {}. Continuing without file.",
            parent, e
        );
        return (
            config,
            ConfigLoadStatus::Error(format!("Could not create config directory: {}", e)),
        );
    }

    let toml_content = match toml::to_string_pretty(&config) {
        Ok(s) => s,
        Err(e) => {
            warn!("Could not serialize default config: {}", e);
            return (
                config,
                ConfigLoadStatus::Error(format!("Serialization error: {}", e)),
            );
        }
    };

    match fs::write(config_path, &toml_content) {
        Ok(()) => {
            info!("Created default config at {:?}", config_path);
            (config, ConfigLoadStatus::Created)
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            warn!(
                "Permission denied creating config at {:?}. Continuing without file.",
                config_path
            );
            (
                config,
                ConfigLoadStatus::Error("Permission denied creating config".to_string()),
            )
        }
        Err(e) => {
            warn!(
                "Could not write default config to {:?}: {}. Continuing without file.",
                config_path, e
            );
            (
                config,
                ConfigLoadStatus::Error(format!("Write error: {}", e)),
            )
        }
    }
}

/// Apply environment variable overrides to config
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(level) = env::var("CLARIFY_LOG") {
        debug!("Overriding logging.level from CLARIFY_LOG");
        config.logging.level = level;
    }

    if let Ok(command) = env::var("CLARIFY_CLIPBOARD") {
        debug!("Overriding clipboard.command from CLARIFY_CLIPBOARD");
        config.clipboard.command = command;
    }

    config
}

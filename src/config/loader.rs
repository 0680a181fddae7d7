//! Configuration File Loading
//!
//! Handles loading and saving configuration files from various locations
//! with support for multiple formats and fallback mechanisms.

use super::Config;
use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Log levels accepted in `logging.level`
const KNOWN_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Upper bound for `shutdown.grace_period_ms` (10 minutes)
const MAX_GRACE_PERIOD_MS: u64 = 10 * 60 * 1000;

/// Configuration file loader
pub struct ConfigLoader {
    /// Search paths for configuration files (without extension)
    search_paths: Vec<PathBuf>,
    /// Supported configuration file formats
    supported_formats: Vec<ConfigFormat>,
    /// Current configuration file path (if loaded)
    current_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    fn extension(self) -> &'static str {
        match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }

    fn name(self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }

    /// Format implied by a file extension; TOML when unknown
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Whether to fall back to the default config if none exists
    pub create_default: bool,
    /// Whether to validate configuration after loading
    pub validate: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            create_default: true,
            validate: true,
        }
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self::with_search_paths(Self::get_search_paths())
    }

    /// Loader that only looks at the given base paths
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            supported_formats: vec![ConfigFormat::Toml, ConfigFormat::Json],
            current_path: None,
        }
    }

    /// Load configuration with default options
    pub fn load() -> Result<Config> {
        Self::new().load_with_options(LoadOptions::default())
    }

    /// Load configuration from the search paths with custom options
    pub fn load_with_options(&mut self, options: LoadOptions) -> Result<Config> {
        // Try to find and load existing configuration
        if let Some((path, config)) = self.find_and_load_config()? {
            debug!("Loaded configuration from {}", path.display());
            self.current_path = Some(path);

            if options.validate {
                Self::validate(&config)?;
            }
            return Ok(config);
        }

        // No configuration found, use defaults if requested
        if options.create_default {
            let config = Config::default();
            if options.validate {
                Self::validate(&config)?;
            }
            Ok(config)
        } else {
            Err(Error::ConfigNotFound)
        }
    }

    /// Load and validate a specific configuration file
    pub fn load_from_path(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(Error::ConfigLoadFailed {
                path: path.to_path_buf(),
                reason: "Configuration file does not exist".to_string(),
            });
        }

        let config = Self::load_config_file(path, ConfigFormat::from_path(path))?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Path of the file the configuration was loaded from, if any
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// Save configuration to the current path or default location
    pub fn save(&self, config: &Config) -> Result<PathBuf> {
        let path = self
            .current_path
            .clone()
            .unwrap_or_else(Self::get_default_config_path);

        self.save_to_path(config, &path)?;
        Ok(path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config: &Config, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Determine format from file extension
        let format = ConfigFormat::from_path(path);
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(|e| {
                Error::ConfigSerializationFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                }
            })?,
            ConfigFormat::Toml => {
                toml::to_string_pretty(config).map_err(|e| Error::ConfigSerializationFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                })?
            }
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Find and load configuration from search paths
    fn find_and_load_config(&self) -> Result<Option<(PathBuf, Config)>> {
        for path in &self.search_paths {
            for format in &self.supported_formats {
                let config_path = path.with_extension(format.extension());

                if config_path.exists() {
                    match Self::load_config_file(&config_path, *format) {
                        Ok(config) => return Ok(Some((config_path, config))),
                        Err(e) => {
                            // Log warning but continue searching
                            warn!(
                                "Failed to load config from {}: {}",
                                config_path.display(),
                                e
                            );
                            continue;
                        }
                    }
                }
            }
        }

        Ok(None)
    }

    /// Load a specific configuration file
    fn load_config_file(path: &Path, format: ConfigFormat) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        match format {
            ConfigFormat::Toml => toml::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                format: format.name().to_string(),
                reason: e.to_string(),
            }),
            ConfigFormat::Json => {
                serde_json::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Get default search paths for configuration files
    fn get_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("proctree").join("config"));
        }

        // XDG config home fallback (for platforms that might set it)
        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_config).join("proctree").join("config"));
        }

        // Home directory fallback
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".proctree").join("config"));
        }

        // Current working directory
        if let Ok(cwd) = env::current_dir() {
            paths.push(cwd.join(".proctree").join("config"));
        }

        paths.dedup();
        paths
    }

    /// Get the default configuration path
    fn get_default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("proctree")
            .join("config.toml")
    }

    /// Validate configuration
    pub fn validate(config: &Config) -> Result<()> {
        // Logging validation
        let level = config.logging.level.trim().to_lowercase();
        if level.is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "logging.level".to_string(),
                reason: "Log level cannot be empty".to_string(),
            });
        }
        if !KNOWN_LEVELS.contains(&level.as_str()) {
            return Err(Error::ConfigValidationFailed {
                field: "logging.level".to_string(),
                reason: format!("Unknown log level '{}'", config.logging.level),
            });
        }

        // Shutdown validation
        let shutdown = &config.shutdown;
        if shutdown.poll_interval_ms == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "shutdown.poll_interval_ms".to_string(),
                reason: "Poll interval must be greater than 0".to_string(),
            });
        }

        if shutdown.poll_interval_ms > shutdown.grace_period_ms {
            return Err(Error::ConfigValidationFailed {
                field: "shutdown.poll_interval_ms".to_string(),
                reason: "Poll interval cannot exceed the grace period".to_string(),
            });
        }

        if shutdown.grace_period_ms > MAX_GRACE_PERIOD_MS {
            return Err(Error::ConfigValidationFailed {
                field: "shutdown.grace_period_ms".to_string(),
                reason: "Grace period cannot exceed 10 minutes".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

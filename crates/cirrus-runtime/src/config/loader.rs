//! Configuration loader using figment.
//!
//! # Feature Flags
//!
//! - `toml-config`: enables `cirrus.toml`
//! - `yaml-config`: enables `cirrus.yaml` / `cirrus.yml`
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Programmatic overrides ([`ConfigLoader::merge`])
//! 3. Config file (explicit, or `cirrus.*` found in the search paths)
//! 4. Environment variables (`CIRRUS_*`)
//!
//! # Environment Variable Mapping
//!
//! Environment variables are mapped using the `CIRRUS_` prefix with `__` as separator:
//!
//! - `CIRRUS_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `CIRRUS_LOGGING__FILTERS__CIRRUS_FRAMEWORK=trace` → `logging.filters.cirrus_framework = "trace"`
//!
//! # Example
//!
//! ```rust,ignore
//! use cirrus_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load()?;
//!
//! let config = ConfigLoader::new()
//!     .file("/opt/config/cirrus.toml")
//!     .without_env()
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace};

use super::error::{ConfigError, ConfigResult};
use super::schema::RuntimeConfig;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "CIRRUS_";

/// Base name of searched configuration files.
pub const CONFIG_FILE_STEM: &str = "cirrus";

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    figment: Figment,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader reading defaults, files from the current directory,
    /// and environment variables.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: RuntimeConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<RuntimeConfig> {
        let config: RuntimeConfig = self.build_figment()?.extract()?;

        debug!(
            logging_level = %config.logging.level,
            "Configuration loaded successfully"
        );
        Ok(config)
    }

    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(RuntimeConfig::default()));

        let user_figment = std::mem::take(&mut self.figment);
        figment = figment.merge(user_figment);

        if let Some(path) = self.config_file.take() {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = Self::merge_config_file(figment, &path)?;
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            trace!(prefix = ENV_PREFIX, "Loading environment variables");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment)
    }

    /// Merges a single config file, dispatching on its extension.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => {
                let _ = figment;
                Err(ConfigError::UnsupportedFormat(ext.to_string()))
            }
        }
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if self.search_paths.is_empty() {
            std::env::current_dir().into_iter().collect()
        } else {
            self.search_paths.clone()
        }
    }

    /// File names searched for, in order, given the enabled format features.
    fn candidate_names() -> Vec<String> {
        let mut extensions: Vec<&str> = Vec::new();
        if cfg!(feature = "toml-config") {
            extensions.push("toml");
        }
        if cfg!(feature = "yaml-config") {
            extensions.extend(["yaml", "yml"]);
        }
        extensions
            .into_iter()
            .map(|ext| format!("{CONFIG_FILE_STEM}.{ext}"))
            .collect()
    }

    /// Merges the first configuration file found in the search paths.
    fn load_config_files(&self, figment: Figment) -> Figment {
        let names = Self::candidate_names();
        for search_path in self.resolve_search_paths() {
            for name in &names {
                let path = search_path.join(name);
                if !path.exists() {
                    continue;
                }
                match Self::merge_config_file(figment.clone(), &path) {
                    Ok(merged) => {
                        info!(path = %path.display(), "Loading configuration file");
                        return merged;
                    }
                    Err(err) => debug!(path = %path.display(), error = %err, "Skipping configuration file"),
                }
            }
        }

        trace!("No configuration file found, using defaults");
        figment
    }
}

/// Loads the configuration from the default sources.
pub fn load_config() -> ConfigResult<RuntimeConfig> {
    ConfigLoader::new().load()
}

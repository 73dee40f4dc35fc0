//! Pipeline configuration.
//!
//! One aggregated configuration for the cache, loader, and memory monitor.
//! Values can be set programmatically, loaded from environment variables,
//! or loaded from a TOML file supplied by the settings layer.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use annotator_cache::CacheConfig;
use annotator_loader::{LoaderConfig, DEFAULT_EXTENSIONS};
use annotator_memory::MonitorConfig;
use thiserror::Error;

/// Aggregated configuration for the image pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Number of loader worker threads.
    pub worker_count: usize,
    /// Cache byte budget in megabytes.
    pub max_cache_memory_mb: u64,
    /// Cache entry-count bound.
    pub max_cache_items: usize,
    /// Memory-warning threshold in megabytes of resident memory.
    pub memory_warning_threshold_mb: u64,
    /// Memory-critical threshold in megabytes of resident memory.
    pub memory_critical_threshold_mb: u64,
    /// Maximum accepted image file size in megabytes.
    pub max_image_file_mb: u64,
    /// Preload sliding-window half-width.
    pub preload_lookahead: usize,
    /// Accepted file extensions (lowercase, without the dot).
    pub supported_extensions: Vec<String>,
    /// Cap on the recyclable pixel-buffer free-list.
    pub max_pooled_buffers: usize,
    /// Dimension cap for presentable pixmaps (`None` disables).
    pub max_decode_dimension: Option<u32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            max_cache_memory_mb: 500,
            max_cache_items: 100,
            memory_warning_threshold_mb: 800,
            memory_critical_threshold_mb: 1200,
            max_image_file_mb: 50,
            preload_lookahead: 3,
            supported_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_pooled_buffers: 20,
            max_decode_dimension: Some(4096),
        }
    }
}

impl PipelineConfig {
    /// Set the number of loader workers.
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Set the cache byte budget in megabytes.
    pub fn with_cache_memory_mb(mut self, mb: u64) -> Self {
        self.max_cache_memory_mb = mb;
        self
    }

    /// Set the cache entry-count bound.
    pub fn with_cache_max_items(mut self, items: usize) -> Self {
        self.max_cache_items = items;
        self
    }

    /// Set the memory warning/critical thresholds in megabytes.
    pub fn with_memory_thresholds(mut self, warning_mb: u64, critical_mb: u64) -> Self {
        self.memory_warning_threshold_mb = warning_mb;
        self.memory_critical_threshold_mb = critical_mb;
        self
    }

    /// Set the maximum accepted image file size in megabytes.
    pub fn with_max_image_mb(mut self, mb: u64) -> Self {
        self.max_image_file_mb = mb;
        self
    }

    /// Set the preload lookahead.
    pub fn with_preload_lookahead(mut self, lookahead: usize) -> Self {
        self.preload_lookahead = lookahead;
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// Recognized variables (all optional):
    /// - `ANNOTATOR_WORKER_COUNT`
    /// - `ANNOTATOR_CACHE_MEMORY_MB`
    /// - `ANNOTATOR_CACHE_MAX_ITEMS`
    /// - `ANNOTATOR_MEMORY_WARNING_MB`
    /// - `ANNOTATOR_MEMORY_CRITICAL_MB`
    /// - `ANNOTATOR_MAX_IMAGE_MB`
    /// - `ANNOTATOR_PRELOAD_LOOKAHEAD`
    ///
    /// # Errors
    /// Returns an error if any variable contains an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("ANNOTATOR_WORKER_COUNT") {
            config.worker_count = parse_env("ANNOTATOR_WORKER_COUNT", &val)?;
        }
        if let Ok(val) = std::env::var("ANNOTATOR_CACHE_MEMORY_MB") {
            config.max_cache_memory_mb = parse_env("ANNOTATOR_CACHE_MEMORY_MB", &val)?;
        }
        if let Ok(val) = std::env::var("ANNOTATOR_CACHE_MAX_ITEMS") {
            config.max_cache_items = parse_env("ANNOTATOR_CACHE_MAX_ITEMS", &val)?;
        }
        if let Ok(val) = std::env::var("ANNOTATOR_MEMORY_WARNING_MB") {
            config.memory_warning_threshold_mb = parse_env("ANNOTATOR_MEMORY_WARNING_MB", &val)?;
        }
        if let Ok(val) = std::env::var("ANNOTATOR_MEMORY_CRITICAL_MB") {
            config.memory_critical_threshold_mb = parse_env("ANNOTATOR_MEMORY_CRITICAL_MB", &val)?;
        }
        if let Ok(val) = std::env::var("ANNOTATOR_MAX_IMAGE_MB") {
            config.max_image_file_mb = parse_env("ANNOTATOR_MAX_IMAGE_MB", &val)?;
        }
        if let Ok(val) = std::env::var("ANNOTATOR_PRELOAD_LOOKAHEAD") {
            config.preload_lookahead = parse_env("ANNOTATOR_PRELOAD_LOOKAHEAD", &val)?;
        }

        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// Expected file format:
    /// ```toml
    /// worker_count = 4
    /// cache_memory_mb = 500
    /// cache_max_items = 100
    /// memory_warning_mb = 800
    /// memory_critical_mb = 1200
    /// max_image_mb = 50
    /// preload_lookahead = 3
    /// supported_extensions = "jpg,jpeg,png"
    /// ```
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml(&contents)
    }

    /// Parses configuration from a TOML string.
    fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for line in toml_str.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"');

            match key {
                "worker_count" => config.worker_count = parse_env(key, value)?,
                "cache_memory_mb" => config.max_cache_memory_mb = parse_env(key, value)?,
                "cache_max_items" => config.max_cache_items = parse_env(key, value)?,
                "memory_warning_mb" => {
                    config.memory_warning_threshold_mb = parse_env(key, value)?;
                }
                "memory_critical_mb" => {
                    config.memory_critical_threshold_mb = parse_env(key, value)?;
                }
                "max_image_mb" => config.max_image_file_mb = parse_env(key, value)?,
                "preload_lookahead" => config.preload_lookahead = parse_env(key, value)?,
                "supported_extensions" => {
                    config.supported_extensions = value
                        .split(',')
                        .map(|e| e.trim().to_lowercase())
                        .filter(|e| !e.is_empty())
                        .collect();
                }
                _ => {} // Ignore unknown keys
            }
        }

        Ok(config)
    }

    /// Saves configuration to a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path.as_ref(), self.to_toml()).map_err(ConfigError::Io)
    }

    /// Converts configuration to TOML format.
    fn to_toml(&self) -> String {
        format!(
            "# Annotator Image Pipeline Configuration\n\
             worker_count = {}\n\
             cache_memory_mb = {}\n\
             cache_max_items = {}\n\
             memory_warning_mb = {}\n\
             memory_critical_mb = {}\n\
             max_image_mb = {}\n\
             preload_lookahead = {}\n\
             supported_extensions = \"{}\"\n",
            self.worker_count,
            self.max_cache_memory_mb,
            self.max_cache_items,
            self.memory_warning_threshold_mb,
            self.memory_critical_threshold_mb,
            self.max_image_file_mb,
            self.preload_lookahead,
            self.supported_extensions.join(",")
        )
    }

    /// Cache-crate view of this configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(self.max_cache_memory_mb, self.max_cache_items)
    }

    /// Loader-crate view of this configuration.
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig::default()
            .with_worker_count(self.worker_count)
            .with_max_image_mb(self.max_image_file_mb)
            .with_preload_lookahead(self.preload_lookahead)
            .with_supported_extensions(self.supported_extensions.clone())
            .with_max_decode_dimension(self.max_decode_dimension)
    }

    /// Monitor-crate view of this configuration.
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig::default().with_thresholds(
            self.memory_warning_threshold_mb,
            self.memory_critical_threshold_mb,
        )
    }

    /// Monitor view with a custom poll interval (settings dialogs expose it).
    pub fn monitor_config_with_poll(&self, poll_interval: Duration) -> MonitorConfig {
        self.monitor_config().with_poll_interval(poll_interval)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid value for a configuration parameter
    #[error("invalid value for configuration key: {0}")]
    InvalidValue(String),

    /// I/O error reading or writing a configuration file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

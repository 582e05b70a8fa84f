use crate::error::{Result, ShapeLayerError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Settings an adapter instance is constructed with.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterConfig {
    /// Root that raw `layer_filename` paths must stay inside
    pub data_root: PathBuf,
    /// Directories bundled resources are looked up in, by module name
    pub resource_roots: BTreeMap<String, PathBuf>,
    /// Accept raw paths outside `data_root`
    pub trust_raw_paths: bool,
    pub max_search_results: usize,
    /// Factor applied to the search radius before use
    pub radius_damping: f64,
    pub max_popup_results: usize,
    /// Base URL of the time-series image endpoint
    pub image_url_base: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        LayeredConfig::with_defaults().resolve()
    }
}

/// Layered configuration for shapelayer
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub data_root: ConfigValue<PathBuf>,
    pub resource_roots: ConfigValue<BTreeMap<String, PathBuf>>,
    pub trust_raw_paths: ConfigValue<bool>,
    pub max_search_results: ConfigValue<usize>,
    pub radius_damping: ConfigValue<f64>,
    pub max_popup_results: ConfigValue<usize>,
    pub image_url_base: ConfigValue<String>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            data_root: ConfigValue::new(PathBuf::from("."), ConfigSource::Default),
            resource_roots: ConfigValue::new(BTreeMap::new(), ConfigSource::Default),
            trust_raw_paths: ConfigValue::new(false, ConfigSource::Default),
            max_search_results: ConfigValue::new(3, ConfigSource::Default),
            radius_damping: ConfigValue::new(0.8, ConfigSource::Default),
            max_popup_results: ConfigValue::new(10, ConfigSource::Default),
            image_url_base: ConfigValue::new(
                "/map/adapter/shape/image/".to_string(),
                ConfigSource::Default,
            ),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ShapeLayerError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| ShapeLayerError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(data_root) = file_config.data_root {
            self.data_root.update(data_root, ConfigSource::File);
        }

        if let Some(resource_roots) = file_config.resource_roots {
            self.resource_roots.update(resource_roots, ConfigSource::File);
        }

        if let Some(trust) = file_config.trust_raw_paths {
            self.trust_raw_paths.update(trust, ConfigSource::File);
        }

        if let Some(max) = file_config.max_search_results {
            self.max_search_results.update(positive("max_search_results", max)?, ConfigSource::File);
        }

        if let Some(damping) = file_config.radius_damping {
            self.radius_damping.update(parse_damping(damping)?, ConfigSource::File);
        }

        if let Some(max) = file_config.max_popup_results {
            self.max_popup_results.update(positive("max_popup_results", max)?, ConfigSource::File);
        }

        if let Some(base) = file_config.image_url_base {
            self.image_url_base.update(base, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(self) -> Self {
        self.load_from_vars(|key| env::var(key).ok())
    }

    fn load_from_vars<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = var("SHAPELAYER_DATA_ROOT") {
            self.data_root.update(PathBuf::from(root), ConfigSource::Environment);
        }

        if let Some(raw) = var("SHAPELAYER_MAX_SEARCH_RESULTS") {
            match raw.parse::<usize>().map_err(|e| e.to_string()).and_then(|n| {
                positive("max_search_results", n).map_err(|e| e.to_string())
            }) {
                Ok(n) => self.max_search_results.update(n, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid SHAPELAYER_MAX_SEARCH_RESULTS value '{}': expected positive integer",
                    raw
                ),
            }
        }

        if let Some(raw) = var("SHAPELAYER_RADIUS_DAMPING") {
            match raw.parse::<f64>().ok().and_then(|d| parse_damping(d).ok()) {
                Some(d) => self.radius_damping.update(d, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid SHAPELAYER_RADIUS_DAMPING value '{}': expected number in (0, 1]",
                    raw
                ),
            }
        }

        if let Some(raw) = var("SHAPELAYER_MAX_POPUP_RESULTS") {
            match raw.parse::<usize>() {
                Ok(n) if n > 0 => self.max_popup_results.update(n, ConfigSource::Environment),
                _ => tracing::warn!(
                    "Invalid SHAPELAYER_MAX_POPUP_RESULTS value '{}': expected positive integer",
                    raw
                ),
            }
        }

        if let Some(base) = var("SHAPELAYER_IMAGE_URL_BASE") {
            self.image_url_base.update(base, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(root) = overrides.data_root {
            self.data_root.update(root, ConfigSource::Cli);
        }

        if let Some(trust) = overrides.trust_raw_paths {
            self.trust_raw_paths.update(trust, ConfigSource::Cli);
        }

        if let Some(max) = overrides.max_search_results {
            self.max_search_results.update(max, ConfigSource::Cli);
        }

        if let Some(damping) = overrides.radius_damping {
            self.radius_damping.update(damping, ConfigSource::Cli);
        }
    }

    /// Flatten into the plain settings handed to adapters.
    pub fn resolve(&self) -> AdapterConfig {
        AdapterConfig {
            data_root: self.data_root.value.clone(),
            resource_roots: self.resource_roots.value.clone(),
            trust_raw_paths: self.trust_raw_paths.value,
            max_search_results: self.max_search_results.value,
            radius_damping: self.radius_damping.value,
            max_popup_results: self.max_popup_results.value,
            image_url_base: self.image_url_base.value.clone(),
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "data_root".to_string(),
            (self.data_root.value.display().to_string(), self.data_root.source),
        );

        let roots: Vec<String> = self
            .resource_roots
            .value
            .iter()
            .map(|(module, dir)| format!("{}={}", module, dir.display()))
            .collect();
        map.insert("resource_roots".to_string(), (roots.join(", "), self.resource_roots.source));

        map.insert(
            "trust_raw_paths".to_string(),
            (self.trust_raw_paths.value.to_string(), self.trust_raw_paths.source),
        );

        map.insert(
            "max_search_results".to_string(),
            (self.max_search_results.value.to_string(), self.max_search_results.source),
        );

        map.insert(
            "radius_damping".to_string(),
            (self.radius_damping.value.to_string(), self.radius_damping.source),
        );

        map.insert(
            "max_popup_results".to_string(),
            (self.max_popup_results.value.to_string(), self.max_popup_results.source),
        );

        map.insert(
            "image_url_base".to_string(),
            (self.image_url_base.value.clone(), self.image_url_base.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    data_root: Option<PathBuf>,
    resource_roots: Option<BTreeMap<String, PathBuf>>,
    trust_raw_paths: Option<bool>,
    max_search_results: Option<usize>,
    radius_damping: Option<f64>,
    max_popup_results: Option<usize>,
    image_url_base: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub data_root: Option<PathBuf>,
    pub trust_raw_paths: Option<bool>,
    pub max_search_results: Option<usize>,
    pub radius_damping: Option<f64>,
}

fn positive(key: &str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(ShapeLayerError::ConfigInvalid {
            key: key.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

/// Radius damping must lie in (0, 1].
pub fn parse_damping(value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(ShapeLayerError::ConfigInvalid {
            key: "radius_damping".to_string(),
            reason: format!("Invalid radius damping: {}. Use a number in (0, 1]", value),
        })
    }
}

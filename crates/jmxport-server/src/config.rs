use anyhow::{bail, Context, Result};
use jmxport_collector::{FlattenOptions, ScrapeFilter};
use jmxport_security::AuthenticationConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "jmxport.toml";

/// Route of the liveness endpoint
pub const HEALTHY_PATH: &str = "/-/healthy";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Route serving the metrics
    pub metrics_path: String,

    /// JSON attribute snapshot re-read on every scrape.
    /// Without one only the exporter's own metrics are served.
    pub snapshot: Option<PathBuf>,

    /// Lower-case metric names
    pub lowercase_output_name: bool,

    /// Lower-case label names
    pub lowercase_output_label_names: bool,

    /// Bean name patterns to export; empty exports every bean
    #[serde(alias = "includeObjectNames", alias = "whitelistObjectNames")]
    pub include_object_names: Vec<String>,

    /// Bean name patterns never exported, even when included
    #[serde(alias = "excludeObjectNames", alias = "blacklistObjectNames")]
    pub exclude_object_names: Vec<String>,

    /// Attributes dropped from the beans matching each pattern
    #[serde(alias = "excludeObjectNameAttributes")]
    pub exclude_object_name_attributes: BTreeMap<String, Vec<String>>,

    /// Basic authentication; disabled when absent
    pub authentication: Option<AuthenticationConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9404,
            metrics_path: "/metrics".to_string(),
            snapshot: None,
            lowercase_output_name: false,
            lowercase_output_label_names: false,
            include_object_names: Vec::new(),
            exclude_object_names: Vec::new(),
            exclude_object_name_attributes: BTreeMap::new(),
            authentication: None,
        }
    }
}

impl ServerConfig {
    /// Load `path`, or [`DEFAULT_CONFIG_FILE`] if present, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)?
                } else {
                    tracing::info!("No config file found, using defaults");
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<()> {
        if !self.metrics_path.starts_with('/') {
            bail!("metrics_path must start with '/': {}", self.metrics_path);
        }
        if self.metrics_path == HEALTHY_PATH {
            bail!("metrics_path must not be {}", HEALTHY_PATH);
        }
        self.scrape_filter()?;
        Ok(())
    }

    /// Bean and attribute selection for the scraper
    pub fn scrape_filter(&self) -> Result<ScrapeFilter> {
        let mut filter = ScrapeFilter::new()
            .include(&self.include_object_names)
            .context("Invalid include_object_names")?
            .exclude(&self.exclude_object_names)
            .context("Invalid exclude_object_names")?;
        for (pattern, attributes) in &self.exclude_object_name_attributes {
            filter = filter
                .exclude_attributes(pattern, attributes.iter().cloned())
                .context("Invalid exclude_object_name_attributes")?;
        }
        Ok(filter)
    }

    /// Naming options for the flattener
    pub fn flatten_options(&self) -> FlattenOptions {
        FlattenOptions {
            lowercase_output_name: self.lowercase_output_name,
            lowercase_output_label_names: self.lowercase_output_label_names,
        }
    }

    /// Get the full bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

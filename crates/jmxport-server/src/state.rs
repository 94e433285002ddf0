use anyhow::{Context, Result};
use jmxport_collector::{ScrapeSource, Scraper, SnapshotSource, StaticSource};
use jmxport_security::Authenticator;
use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state
pub struct AppState {
    /// Where beans come from on every scrape
    pub source: Arc<dyn ScrapeSource>,

    /// Flattens beans into samples
    pub scraper: Scraper,

    /// Basic-auth check (optional - disabled when not configured)
    pub authenticator: Option<Arc<dyn Authenticator>>,

    /// Route serving the metrics
    pub metrics_path: String,
}

impl AppState {
    /// Create new app state without authentication
    pub fn new(source: Arc<dyn ScrapeSource>, scraper: Scraper) -> Self {
        Self {
            source,
            scraper,
            authenticator: None,
            metrics_path: "/metrics".to_string(),
        }
    }

    /// Require Basic auth checked by `authenticator`
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Serve metrics on `path` instead of `/metrics`
    pub fn with_metrics_path(mut self, path: impl Into<String>) -> Self {
        self.metrics_path = path.into();
        self
    }

    /// Build the state described by `config`.
    ///
    /// Fails on invalid bean name patterns or authentication settings.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let source: Arc<dyn ScrapeSource> = match &config.snapshot {
            Some(path) => Arc::new(SnapshotSource::new(path.clone())),
            None => Arc::new(StaticSource::new(Vec::new())),
        };
        let scraper = Scraper::new(config.flatten_options()).with_filter(config.scrape_filter()?);
        let mut state = Self::new(source, scraper).with_metrics_path(config.metrics_path.clone());

        if let Some(authentication) = &config.authentication {
            let verifier = authentication
                .build()
                .context("Invalid authentication configuration")?;
            state = state.with_authenticator(Arc::new(verifier));
        }
        Ok(state)
    }

    /// Check if authentication is enabled
    pub fn is_auth_enabled(&self) -> bool {
        self.authenticator.is_some()
    }
}

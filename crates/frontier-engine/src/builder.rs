//! Builder pattern for the service.

use std::path::Path;
use std::sync::Arc;

use frontier_portfolio::AssetClassStatistics;
use frontier_traits::HoldingsSource;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::EfficientFrontierService;

/// Builder for constructing an [`EfficientFrontierService`].
pub struct EfficientFrontierServiceBuilder {
    config: Option<EngineConfig>,
    source: Option<Arc<dyn HoldingsSource>>,
    statistics: Option<Arc<AssetClassStatistics>>,
}

impl EfficientFrontierServiceBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            source: None,
            statistics: None,
        }
    }

    /// Set the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the engine configuration from a TOML file.
    pub fn with_config_file(self, path: impl AsRef<Path>) -> EngineResult<Self> {
        Ok(self.with_config(EngineConfig::from_toml_file(path)?))
    }

    /// Set the holdings source.
    pub fn with_source(mut self, source: Arc<dyn HoldingsSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the asset-class assumptions.
    pub fn with_statistics(mut self, statistics: Arc<AssetClassStatistics>) -> Self {
        self.statistics = Some(statistics);
        self
    }

    /// Load the asset-class assumptions from a TOML file.
    pub fn with_statistics_file(self, path: impl AsRef<Path>) -> EngineResult<Self> {
        let statistics = AssetClassStatistics::from_toml_file(path)?;
        Ok(self.with_statistics(Arc::new(statistics)))
    }

    /// Build the service.
    ///
    /// Assumptions default to the built-in standard table.
    pub fn build(self) -> EngineResult<EfficientFrontierService> {
        let config = self.config.unwrap_or_default();

        let source = self
            .source
            .ok_or_else(|| EngineError::ConfigError("holdings source not configured".into()))?;

        let statistics = self
            .statistics
            .unwrap_or_else(|| Arc::new(AssetClassStatistics::standard()));

        EfficientFrontierService::new(source, statistics, config)
    }
}

impl Default for EfficientFrontierServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

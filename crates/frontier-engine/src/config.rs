//! Engine configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use frontier_portfolio::{validate_risk_free_rate, OptimizerSettings};

use crate::error::{EngineError, EngineResult};

/// Configuration for [`EfficientFrontierService`](crate::EfficientFrontierService).
///
/// Every field has a default, so a TOML file only needs the values it changes:
///
/// ```toml
/// cache_ttl_secs = 600
/// default_risk_free_rate = 0.04
///
/// [optimizer]
/// qp_max_iterations = 50000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine name, used in logs
    pub name: String,

    /// How long a cached result stays valid
    pub cache_ttl_secs: u64,

    /// Risk-free rate used when a request does not supply one
    pub default_risk_free_rate: f64,

    /// Frontier points used when a request does not supply a count
    pub default_frontier_points: usize,

    /// Largest return gap for the current portfolio to count as on the frontier
    pub frontier_tolerance: f64,

    /// Solver tolerances and caps
    pub optimizer: OptimizerSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "frontier-engine".to_string(),
            cache_ttl_secs: 3600,
            default_risk_free_rate: 0.045,
            default_frontier_points: 50,
            frontier_tolerance: 1e-3,
            optimizer: OptimizerSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML configuration.
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| EngineError::config(format!("invalid engine configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), "loaded engine configuration");
        Ok(config)
    }

    /// Sets the cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs();
        self
    }

    /// Sets the default risk-free rate.
    pub fn with_default_risk_free_rate(mut self, rate: f64) -> Self {
        self.default_risk_free_rate = rate;
        self
    }

    /// Sets the optimizer settings.
    pub fn with_optimizer(mut self, settings: OptimizerSettings) -> Self {
        self.optimizer = settings;
        self
    }

    /// Cache TTL as a duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Checks every value is usable.
    pub fn validate(&self) -> EngineResult<()> {
        if self.cache_ttl_secs == 0 {
            return Err(EngineError::config("cache_ttl_secs must be at least 1"));
        }
        validate_risk_free_rate(self.default_risk_free_rate)
            .map_err(|e| EngineError::config(format!("default_risk_free_rate: {e}")))?;
        if self.default_frontier_points < 2 {
            return Err(EngineError::config(format!(
                "default_frontier_points must be at least 2, got {}",
                self.default_frontier_points
            )));
        }
        if !(self.frontier_tolerance.is_finite() && self.frontier_tolerance > 0.0) {
            return Err(EngineError::config(format!(
                "frontier_tolerance must be positive, got {}",
                self.frontier_tolerance
            )));
        }
        self.optimizer
            .validate()
            .map_err(|e| EngineError::config(format!("optimizer: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.default_frontier_points, 50);
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            cache_ttl_secs = 60

            [optimizer]
            risk_parity_max_sweeps = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.optimizer.risk_parity_max_sweeps, 10);
        assert_eq!(config.optimizer.qp_max_iterations, 20_000);
        assert!((config.default_risk_free_rate - 0.045).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = EngineConfig::from_toml_str("default_frontier_points = 1").unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));

        let err = EngineConfig::default()
            .with_default_risk_free_rate(1.5)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("default_risk_free_rate"));

        assert!(EngineConfig::from_toml_str("cache_ttl_secs = 0").is_err());
        assert!(EngineConfig::from_toml_str("cache_ttl_secs = \"soon\"").is_err());
    }
}

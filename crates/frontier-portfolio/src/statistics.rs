//! Static asset-class assumptions.
//!
//! [`AssetClassStatistics`] is the only source of expected returns,
//! volatilities and correlations. It is built once per process (from the
//! built-in table or a TOML file), validated in full at construction, and
//! passed explicitly to whoever needs it.
//!
//! # File format
//!
//! ```toml
//! [classes.uk_equity]
//! expected_return = 0.07
//! volatility = 0.16
//!
//! [classes.bond]
//! expected_return = 0.035
//! volatility = 0.06
//!
//! [[correlations]]
//! a = "uk_equity"
//! b = "bond"
//! value = 0.20
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use frontier_math::linear_algebra::symmetric_eigenvalue_range;

use crate::error::{OptimizationError, PortfolioResult};
use crate::types::{AssetClass, AssetClassProfile};

/// Smallest eigenvalue tolerated for the class correlation matrix.
const PSD_TOLERANCE: f64 = -1e-10;

/// Tolerance for duplicate correlation entries to count as symmetric.
const SYMMETRY_TOLERANCE: f64 = 1e-12;

/// One off-diagonal correlation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    /// First class.
    pub a: AssetClass,
    /// Second class.
    pub b: AssetClass,
    /// Correlation in [-1, 1].
    pub value: f64,
}

/// Serialized form of an assumption table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticsTable {
    /// Profile per class.
    pub classes: BTreeMap<AssetClass, AssetClassProfile>,
    /// Cross-class correlations; every pair of distinct classes must appear.
    #[serde(default)]
    pub correlations: Vec<CorrelationEntry>,
}

/// Validated asset-class assumptions.
#[derive(Debug, Clone)]
pub struct AssetClassStatistics {
    profiles: BTreeMap<AssetClass, AssetClassProfile>,
    /// Keyed by the ordered pair `(min, max)`.
    correlations: BTreeMap<(AssetClass, AssetClass), f64>,
}

impl AssetClassStatistics {
    /// Builds and validates a table.
    pub fn new(
        profiles: impl IntoIterator<Item = (AssetClass, AssetClassProfile)>,
        correlations: impl IntoIterator<Item = CorrelationEntry>,
    ) -> PortfolioResult<Self> {
        let profiles: BTreeMap<_, _> = profiles.into_iter().collect();
        let mut table = BTreeMap::new();

        for entry in correlations {
            for class in [&entry.a, &entry.b] {
                if !profiles.contains_key(class) {
                    return Err(OptimizationError::configuration(format!(
                        "correlation references asset class '{class}' which has no profile"
                    )));
                }
            }
            if !entry.value.is_finite() || !(-1.0..=1.0).contains(&entry.value) {
                return Err(OptimizationError::configuration(format!(
                    "correlation({}, {}) = {} is outside [-1, 1]",
                    entry.a, entry.b, entry.value
                )));
            }
            if entry.a == entry.b {
                if (entry.value - 1.0).abs() > SYMMETRY_TOLERANCE {
                    return Err(OptimizationError::configuration(format!(
                        "self-correlation of '{}' must be 1, got {}",
                        entry.a, entry.value
                    )));
                }
                continue;
            }

            let key = ordered(&entry.a, &entry.b);
            if let Some(existing) = table.insert(key, entry.value) {
                if (existing - entry.value).abs() > SYMMETRY_TOLERANCE {
                    return Err(OptimizationError::configuration(format!(
                        "correlation table is not symmetric: ({}, {}) given as both {existing} and {}",
                        entry.a, entry.b, entry.value
                    )));
                }
            }
        }

        let statistics = Self {
            profiles,
            correlations: table,
        };
        statistics.validate()?;
        Ok(statistics)
    }

    /// The built-in assumptions for the six standard classes.
    #[must_use]
    pub fn standard() -> Self {
        let profiles = [
            (AssetClass::UK_EQUITY, 0.07, 0.16),
            (AssetClass::US_EQUITY, 0.08, 0.17),
            (AssetClass::INTERNATIONAL_EQUITY, 0.075, 0.18),
            (AssetClass::BOND, 0.035, 0.06),
            (AssetClass::CASH, 0.02, 0.01),
            (AssetClass::ALTERNATIVE, 0.06, 0.12),
        ]
        .into_iter()
        .map(|(class, r, v)| (AssetClass::new(class), AssetClassProfile::new(r, v)))
        .collect();

        let correlations = [
            (AssetClass::UK_EQUITY, AssetClass::US_EQUITY, 0.80),
            (AssetClass::UK_EQUITY, AssetClass::INTERNATIONAL_EQUITY, 0.85),
            (AssetClass::US_EQUITY, AssetClass::INTERNATIONAL_EQUITY, 0.82),
            (AssetClass::UK_EQUITY, AssetClass::BOND, 0.20),
            (AssetClass::US_EQUITY, AssetClass::BOND, 0.15),
            (AssetClass::INTERNATIONAL_EQUITY, AssetClass::BOND, 0.15),
            (AssetClass::UK_EQUITY, AssetClass::CASH, 0.0),
            (AssetClass::US_EQUITY, AssetClass::CASH, 0.0),
            (AssetClass::INTERNATIONAL_EQUITY, AssetClass::CASH, 0.0),
            (AssetClass::BOND, AssetClass::CASH, 0.10),
            (AssetClass::CASH, AssetClass::ALTERNATIVE, 0.0),
            (AssetClass::UK_EQUITY, AssetClass::ALTERNATIVE, 0.50),
            (AssetClass::US_EQUITY, AssetClass::ALTERNATIVE, 0.50),
            (AssetClass::INTERNATIONAL_EQUITY, AssetClass::ALTERNATIVE, 0.55),
            (AssetClass::BOND, AssetClass::ALTERNATIVE, 0.20),
        ]
        .into_iter()
        .map(|(a, b, value)| (ordered(&AssetClass::new(a), &AssetClass::new(b)), value))
        .collect();

        Self {
            profiles,
            correlations,
        }
    }

    /// Builds a table from its serialized form.
    pub fn from_table(table: StatisticsTable) -> PortfolioResult<Self> {
        Self::new(table.classes, table.correlations)
    }

    /// Parses and validates a TOML assumption table.
    pub fn from_toml_str(content: &str) -> PortfolioResult<Self> {
        let table: StatisticsTable = toml::from_str(content).map_err(|e| {
            OptimizationError::configuration(format!("invalid assumption table: {e}"))
        })?;
        Self::from_table(table)
    }

    /// Reads, parses and validates a TOML assumption file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> PortfolioResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            OptimizationError::configuration(format!(
                "cannot read assumption file {}: {e}",
                path.display()
            ))
        })?;
        let statistics = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            classes = statistics.profiles.len(),
            "loaded asset-class assumptions"
        );
        Ok(statistics)
    }

    /// Converts back to the serialized form.
    #[must_use]
    pub fn to_table(&self) -> StatisticsTable {
        StatisticsTable {
            classes: self.profiles.clone(),
            correlations: self
                .correlations
                .iter()
                .map(|((a, b), &value)| CorrelationEntry {
                    a: a.clone(),
                    b: b.clone(),
                    value,
                })
                .collect(),
        }
    }

    /// Return and volatility assumption for a class.
    pub fn profile(&self, class: &AssetClass) -> PortfolioResult<AssetClassProfile> {
        self.profiles.get(class).copied().ok_or_else(|| {
            OptimizationError::configuration(format!("no profile for asset class '{class}'"))
        })
    }

    /// Correlation between two classes; 1 for a class with itself.
    pub fn correlation(&self, a: &AssetClass, b: &AssetClass) -> PortfolioResult<f64> {
        self.profile(a)?;
        self.profile(b)?;
        if a == b {
            return Ok(1.0);
        }
        self.correlations.get(&ordered(a, b)).copied().ok_or_else(|| {
            OptimizationError::configuration(format!("no correlation for ({a}, {b})"))
        })
    }

    /// Configured classes in key order.
    pub fn classes(&self) -> impl Iterator<Item = &AssetClass> {
        self.profiles.keys()
    }

    /// Returns true if the class has a profile.
    #[must_use]
    pub fn contains(&self, class: &AssetClass) -> bool {
        self.profiles.contains_key(class)
    }

    /// Class-level correlation matrix for `classes`, in the given order.
    pub fn correlation_matrix(&self, classes: &[AssetClass]) -> PortfolioResult<DMatrix<f64>> {
        let n = classes.len();
        let mut matrix = DMatrix::identity(n, n);
        for i in 0..n {
            for j in i + 1..n {
                let rho = self.correlation(&classes[i], &classes[j])?;
                matrix[(i, j)] = rho;
                matrix[(j, i)] = rho;
            }
        }
        Ok(matrix)
    }

    /// Re-checks every load-time invariant.
    pub fn validate(&self) -> PortfolioResult<()> {
        if self.profiles.is_empty() {
            return Err(OptimizationError::configuration(
                "assumption table has no asset classes",
            ));
        }

        for (class, profile) in &self.profiles {
            if !profile.expected_return.is_finite() {
                return Err(OptimizationError::configuration(format!(
                    "expected return of '{class}' is not finite"
                )));
            }
            if !(profile.volatility.is_finite() && profile.volatility > 0.0) {
                return Err(OptimizationError::configuration(format!(
                    "volatility of '{class}' must be positive, got {}",
                    profile.volatility
                )));
            }
        }

        let classes: Vec<AssetClass> = self.profiles.keys().cloned().collect();
        let matrix = self.correlation_matrix(&classes)?;
        let (smallest, _) = symmetric_eigenvalue_range(&matrix)?;
        if smallest < PSD_TOLERANCE {
            tracing::error!(
                smallest_eigenvalue = smallest,
                matrix = %matrix,
                "class correlation matrix is not positive semi-definite"
            );
            return Err(OptimizationError::configuration(format!(
                "class correlation matrix is not positive semi-definite (smallest eigenvalue {smallest:.3e})"
            )));
        }

        Ok(())
    }
}

impl Default for AssetClassStatistics {
    fn default() -> Self {
        Self::standard()
    }
}

fn ordered(a: &AssetClass, b: &AssetClass) -> (AssetClass, AssetClass) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn class(key: &str) -> AssetClass {
        AssetClass::new(key)
    }

    fn entry(a: &str, b: &str, value: f64) -> CorrelationEntry {
        CorrelationEntry {
            a: class(a),
            b: class(b),
            value,
        }
    }

    fn two_class_profiles() -> Vec<(AssetClass, AssetClassProfile)> {
        vec![
            (class("x"), AssetClassProfile::new(0.05, 0.10)),
            (class("y"), AssetClassProfile::new(0.03, 0.05)),
        ]
    }

    #[test]
    fn test_standard_table_is_valid() {
        let stats = AssetClassStatistics::standard();
        assert!(stats.validate().is_ok());
        assert_eq!(stats.classes().count(), 6);

        for key in AssetClass::STANDARD {
            assert!(stats.contains(&class(key)));
        }
    }

    #[test]
    fn test_lookup_is_symmetric() {
        let stats = AssetClassStatistics::standard();
        let uk = class("uk_equity");
        let bond = class("bond");

        assert_relative_eq!(stats.correlation(&uk, &bond).unwrap(), 0.20);
        assert_relative_eq!(stats.correlation(&bond, &uk).unwrap(), 0.20);
        assert_relative_eq!(stats.correlation(&uk, &uk).unwrap(), 1.0);
        assert_relative_eq!(stats.profile(&uk).unwrap().volatility, 0.16);
    }

    #[test]
    fn test_unknown_class_is_configuration_error() {
        let stats = AssetClassStatistics::standard();
        let crypto = class("crypto");

        assert!(matches!(
            stats.profile(&crypto),
            Err(OptimizationError::Configuration { .. })
        ));
        assert!(matches!(
            stats.correlation(&crypto, &class("bond")),
            Err(OptimizationError::Configuration { .. })
        ));
    }

    #[test]
    fn test_rejects_non_positive_volatility() {
        let profiles = vec![
            (class("x"), AssetClassProfile::new(0.05, 0.0)),
            (class("y"), AssetClassProfile::new(0.03, 0.05)),
        ];
        let err = AssetClassStatistics::new(profiles, [entry("x", "y", 0.1)]).unwrap_err();
        assert!(err.to_string().contains("volatility"));
    }

    #[test]
    fn test_rejects_missing_pair() {
        let err = AssetClassStatistics::new(two_class_profiles(), []).unwrap_err();
        assert!(err.to_string().contains("no correlation"));
    }

    #[test]
    fn test_rejects_out_of_range_and_asymmetric_entries() {
        let err =
            AssetClassStatistics::new(two_class_profiles(), [entry("x", "y", 1.2)]).unwrap_err();
        assert!(err.to_string().contains("outside [-1, 1]"));

        let err = AssetClassStatistics::new(
            two_class_profiles(),
            [entry("x", "y", 0.3), entry("y", "x", 0.4)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("not symmetric"));

        // The same value in both directions is fine
        assert!(AssetClassStatistics::new(
            two_class_profiles(),
            [entry("x", "y", 0.3), entry("y", "x", 0.3)],
        )
        .is_ok());
    }

    #[test]
    fn test_rejects_non_psd_table() {
        // Pairwise valid but jointly impossible
        let profiles = vec![
            (class("a"), AssetClassProfile::new(0.05, 0.1)),
            (class("b"), AssetClassProfile::new(0.05, 0.1)),
            (class("c"), AssetClassProfile::new(0.05, 0.1)),
        ];
        let err = AssetClassStatistics::new(
            profiles,
            [
                entry("a", "b", 0.9),
                entry("a", "c", 0.9),
                entry("b", "c", -0.9),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("positive semi-definite"));
    }

    #[test]
    fn test_toml_round_trip() {
        let content = r#"
            [classes.uk_equity]
            expected_return = 0.07
            volatility = 0.16

            [classes."Bond"]
            expected_return = 0.035
            volatility = 0.06

            [[correlations]]
            a = "uk_equity"
            b = "bond"
            value = 0.2
        "#;

        let stats = AssetClassStatistics::from_toml_str(content).unwrap();
        assert_relative_eq!(
            stats.correlation(&class("bond"), &class("uk_equity")).unwrap(),
            0.2
        );

        let table = stats.to_table();
        assert_eq!(table.classes.len(), 2);
        assert_eq!(table.correlations.len(), 1);
    }

    #[test]
    fn test_malformed_toml_is_configuration_error() {
        let err = AssetClassStatistics::from_toml_str("[classes.x]\nvolatility = 'high'").unwrap_err();
        assert!(matches!(err, OptimizationError::Configuration { .. }));
    }
}

//! Asset classes and their return/risk assumptions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Asset class key such as `uk_equity` or `bond`.
///
/// Keys are normalized on construction: trimmed, lower-cased, with spaces and
/// hyphens mapped to `_`, so `"UK Equity"` and `"uk-equity"` are the same
/// class. Any key is a legal value; whether it has assumptions is decided by
/// [`AssetClassStatistics`](crate::statistics::AssetClassStatistics).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AssetClass(String);

impl AssetClass {
    /// UK listed equities.
    pub const UK_EQUITY: &'static str = "uk_equity";
    /// US listed equities.
    pub const US_EQUITY: &'static str = "us_equity";
    /// Non-UK, non-US equities.
    pub const INTERNATIONAL_EQUITY: &'static str = "international_equity";
    /// Government and investment-grade bonds.
    pub const BOND: &'static str = "bond";
    /// Cash and money-market funds.
    pub const CASH: &'static str = "cash";
    /// Property, commodities and other alternatives.
    pub const ALTERNATIVE: &'static str = "alternative";

    /// The six classes covered by the built-in assumption table.
    pub const STANDARD: [&'static str; 6] = [
        Self::UK_EQUITY,
        Self::US_EQUITY,
        Self::INTERNATIONAL_EQUITY,
        Self::BOND,
        Self::CASH,
        Self::ALTERNATIVE,
    ];

    /// Creates a class from a raw key, normalizing it.
    pub fn new(key: impl AsRef<str>) -> Self {
        let normalized = key
            .as_ref()
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        Self(normalized)
    }

    /// Returns the normalized key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for one of the [`STANDARD`](Self::STANDARD) classes.
    #[must_use]
    pub fn is_standard(&self) -> bool {
        Self::STANDARD.contains(&self.0.as_str())
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetClass {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AssetClass {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<AssetClass> for String {
    fn from(class: AssetClass) -> Self {
        class.0
    }
}

impl FromStr for AssetClass {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

/// Annualized return and volatility assumption for one asset class.
///
/// Both are decimal fractions: `0.07` is 7% a year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetClassProfile {
    /// Expected annual return.
    pub expected_return: f64,
    /// Annual standard deviation of returns.
    pub volatility: f64,
}

impl AssetClassProfile {
    /// Creates a profile.
    #[must_use]
    pub const fn new(expected_return: f64, volatility: f64) -> Self {
        Self {
            expected_return,
            volatility,
        }
    }

    /// Variance implied by the volatility.
    #[must_use]
    pub fn variance(&self) -> f64 {
        self.volatility * self.volatility
    }
}

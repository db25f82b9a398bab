//! Holdings collaborator traits.
//!
//! The optimization core never owns holdings. It reads them through
//! [`HoldingsSource`] at the start of every request and is told about
//! mutations through [`HoldingsListener`]:
//!
//! - [`HoldingsSource`]: user-scoped account and holding reads
//! - [`HoldingsListener`]: synchronous notification after create/update/delete
//!
//! Both are synchronous; the collaborator is an ordinary data store.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TraitResult;
use crate::ids::{AccountId, HoldingId, UserId};

// =============================================================================
// RECORDS
// =============================================================================

/// An investment account as seen by the optimization core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account identifier
    pub id: AccountId,
    /// Owning user
    pub user_id: UserId,
    /// Display name
    #[serde(default)]
    pub name: String,
}

impl AccountRecord {
    /// Creates an account record.
    pub fn new(id: impl Into<AccountId>, user_id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            name: name.into(),
        }
    }
}

/// A holding as seen by the optimization core (read-only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRecord {
    /// Holding identifier
    pub id: HoldingId,
    /// Owning account
    pub account_id: AccountId,
    /// Asset class key, e.g. `uk_equity` or `bond`
    pub asset_type: String,
    /// Current market value (non-negative)
    pub current_value: Decimal,
    /// Optional display name or ticker
    #[serde(default)]
    pub name: Option<String>,
    /// Dividend yield as a decimal fraction (context only)
    #[serde(default)]
    pub dividend_yield: Option<Decimal>,
    /// Purchase price per unit (plausibility checks only)
    #[serde(default)]
    pub purchase_price: Option<Decimal>,
    /// Current price per unit (plausibility checks only)
    #[serde(default)]
    pub current_price: Option<Decimal>,
}

impl HoldingRecord {
    /// Creates a holding record with only the fields the optimizer needs.
    pub fn new(
        id: impl Into<HoldingId>,
        account_id: impl Into<AccountId>,
        asset_type: impl Into<String>,
        current_value: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            account_id: account_id.into(),
            asset_type: asset_type.into(),
            current_value,
            name: None,
            dividend_yield: None,
            purchase_price: None,
            current_price: None,
        }
    }

    /// Sets the unit prices.
    #[must_use]
    pub fn with_prices(mut self, purchase_price: Decimal, current_price: Decimal) -> Self {
        self.purchase_price = Some(purchase_price);
        self.current_price = Some(current_price);
        self
    }

    /// Sets the dividend yield.
    #[must_use]
    pub fn with_dividend_yield(mut self, dividend_yield: Decimal) -> Self {
        self.dividend_yield = Some(dividend_yield);
        self
    }

    /// Describes why the record's values are implausible, if they are.
    ///
    /// Prices are never used as a return series; they only flag records whose
    /// value cannot be trusted.
    pub fn plausibility_issue(&self) -> Option<String> {
        if self.current_value.is_sign_negative() && !self.current_value.is_zero() {
            return Some(format!("negative current value {}", self.current_value));
        }
        for (label, price) in [
            ("purchase price", self.purchase_price),
            ("current price", self.current_price),
        ] {
            if let Some(p) = price {
                if p.is_sign_negative() && !p.is_zero() {
                    return Some(format!("negative {label} {p}"));
                }
            }
        }
        if let Some(p) = self.current_price {
            if p.is_zero() && self.current_value > Decimal::ZERO {
                return Some(format!(
                    "positive value {} with zero current price",
                    self.current_value
                ));
            }
        }
        None
    }
}

// =============================================================================
// ACCOUNT FILTER
// =============================================================================

/// Optional restriction of a request to a set of accounts.
///
/// `Only` with an empty set selects no accounts; it never means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountFilter {
    /// Every account the user owns.
    #[default]
    All,
    /// Exactly these accounts.
    Only(BTreeSet<AccountId>),
}

impl AccountFilter {
    /// Builds an `Only` filter from any collection of ids.
    pub fn only<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<AccountId>,
    {
        Self::Only(ids.into_iter().map(Into::into).collect())
    }

    /// Returns true if the account passes the filter.
    pub fn matches(&self, account_id: &AccountId) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(account_id),
        }
    }

    /// Returns the explicit account set, if any.
    pub fn accounts(&self) -> Option<&BTreeSet<AccountId>> {
        match self {
            Self::All => None,
            Self::Only(ids) => Some(ids),
        }
    }
}

impl From<Option<Vec<AccountId>>> for AccountFilter {
    fn from(ids: Option<Vec<AccountId>>) -> Self {
        ids.map_or(Self::All, Self::only)
    }
}

// =============================================================================
// SOURCE AND LISTENER
// =============================================================================

/// User-scoped read access to accounts and holdings.
pub trait HoldingsSource: Send + Sync {
    /// Returns the source name for logging.
    fn source_name(&self) -> &'static str;

    /// Lists the accounts owned by a user.
    fn accounts(&self, user_id: &UserId) -> TraitResult<Vec<AccountRecord>>;

    /// Lists the user's holdings in accounts passing `filter`.
    ///
    /// Implementations must never return holdings from accounts the user
    /// does not own, whatever the filter contains.
    fn holdings(&self, user_id: &UserId, filter: &AccountFilter)
        -> TraitResult<Vec<HoldingRecord>>;
}

/// Kind of holdings mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingChangeKind {
    /// A holding was created
    Created,
    /// A holding was updated
    Updated,
    /// A holding was deleted
    Deleted,
}

/// Notification emitted after a holdings mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingsEvent {
    /// Owner of the mutated holding
    pub user_id: UserId,
    /// Account of the mutated holding
    pub account_id: AccountId,
    /// The mutated holding
    pub holding_id: HoldingId,
    /// What happened
    pub kind: HoldingChangeKind,
}

/// Receives holdings mutation notifications.
///
/// Called synchronously by the holdings store after each mutation commits;
/// implementations must not block for long.
pub trait HoldingsListener: Send + Sync {
    /// Handles a mutation.
    fn on_holdings_changed(&self, event: &HoldingsEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_filter_semantics() {
        let a = AccountId::from("a");
        let b = AccountId::from("b");

        assert!(AccountFilter::All.matches(&a));

        let only_a = AccountFilter::only(["a"]);
        assert!(only_a.matches(&a));
        assert!(!only_a.matches(&b));

        let none = AccountFilter::Only(BTreeSet::new());
        assert!(!none.matches(&a));
        assert_ne!(none, AccountFilter::All);
    }

    #[test]
    fn test_filter_from_option() {
        assert_eq!(AccountFilter::from(None), AccountFilter::All);
        let filter = AccountFilter::from(Some(vec![AccountId::from("b"), AccountId::from("a")]));
        let ids: Vec<&str> = filter.accounts().unwrap().iter().map(AccountId::as_str).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_plausibility() {
        let ok = HoldingRecord::new("h1", "a", "bond", dec!(1000)).with_prices(dec!(9), dec!(10));
        assert!(ok.plausibility_issue().is_none());

        let zero_price = HoldingRecord::new("h2", "a", "bond", dec!(1000)).with_prices(dec!(9), dec!(0));
        assert!(zero_price.plausibility_issue().is_some());

        let negative = HoldingRecord::new("h3", "a", "bond", dec!(-5));
        assert!(negative.plausibility_issue().unwrap().contains("negative"));
    }

    #[test]
    fn test_record_deserializes_with_defaults() {
        let json = r#"{"id":"h1","account_id":"a1","asset_type":"uk_equity","current_value":2500.5}"#;
        let record: HoldingRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.current_value, dec!(2500.5));
        assert!(record.dividend_yield.is_none());
    }
}

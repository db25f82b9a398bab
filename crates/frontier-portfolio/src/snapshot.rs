//! The analysis universe for one request.

use std::collections::BTreeSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use frontier_traits::{AccountFilter, AccountId, HoldingId, HoldingRecord, HoldingsSource, UserId};

use crate::error::{OptimizationError, PortfolioResult};
use crate::types::AssetClass;

/// One eligible holding and its portfolio weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Holding identifier.
    pub holding_id: HoldingId,
    /// Owning account.
    pub account_id: AccountId,
    /// Normalized asset class.
    pub asset_class: AssetClass,
    /// Current market value.
    pub current_value: Decimal,
    /// `current_value / total_value`.
    pub weight: f64,
}

/// Holdings of one user (optionally restricted to some accounts) with weights.
///
/// Entries are ordered by holding id. A snapshot always has at least two
/// entries and its weights sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    user_id: UserId,
    entries: Vec<SnapshotEntry>,
    total_value: Decimal,
    excluded: usize,
}

impl HoldingsSnapshot {
    /// Loads the user's holdings through `source`.
    ///
    /// Every account named by an `Only` filter must belong to the user;
    /// the first one that does not fails the request.
    pub fn load(
        source: &dyn HoldingsSource,
        user_id: &UserId,
        filter: &AccountFilter,
    ) -> PortfolioResult<Self> {
        if let Some(requested) = filter.accounts() {
            let owned: BTreeSet<AccountId> = source
                .accounts(user_id)?
                .into_iter()
                .filter(|account| &account.user_id == user_id)
                .map(|account| account.id)
                .collect();
            if let Some(foreign) = requested.iter().find(|id| !owned.contains(*id)) {
                tracing::warn!(
                    user = %user_id,
                    account = %foreign,
                    "account filter names an account the user does not own"
                );
                return Err(OptimizationError::authorization(foreign.as_str()));
            }
        }

        let holdings: Vec<HoldingRecord> = source
            .holdings(user_id, filter)?
            .into_iter()
            .filter(|h| filter.matches(&h.account_id))
            .collect();

        tracing::debug!(
            user = %user_id,
            source = source.source_name(),
            holdings = holdings.len(),
            "loaded holdings"
        );
        Self::from_holdings(user_id.clone(), holdings)
    }

    /// Builds a snapshot from already-loaded holdings.
    ///
    /// Holdings with non-positive or implausible values are discarded.
    pub fn from_holdings(
        user_id: UserId,
        holdings: impl IntoIterator<Item = HoldingRecord>,
    ) -> PortfolioResult<Self> {
        let mut excluded = 0;
        let mut eligible = Vec::new();

        for holding in holdings {
            if let Some(issue) = holding.plausibility_issue() {
                tracing::warn!(user = %user_id, holding = %holding.id, %issue, "excluding implausible holding");
                excluded += 1;
                continue;
            }
            if holding.current_value <= Decimal::ZERO {
                tracing::debug!(user = %user_id, holding = %holding.id, "excluding holding with no value");
                excluded += 1;
                continue;
            }
            eligible.push(holding);
        }

        match eligible.len() {
            0 => return Err(OptimizationError::insufficient_data("no holdings")),
            1 => {
                return Err(OptimizationError::insufficient_data(
                    "need at least two holdings to optimize",
                ))
            }
            _ => {}
        }

        eligible.sort_by(|a, b| a.id.cmp(&b.id));
        let total_value: Decimal = eligible.iter().map(|h| h.current_value).sum();
        let total = to_f64(total_value)?;

        let entries = eligible
            .into_iter()
            .map(|h| {
                Ok(SnapshotEntry {
                    weight: to_f64(h.current_value)? / total,
                    asset_class: AssetClass::new(&h.asset_type),
                    holding_id: h.id,
                    account_id: h.account_id,
                    current_value: h.current_value,
                })
            })
            .collect::<PortfolioResult<Vec<_>>>()?;

        Ok(Self {
            user_id,
            entries,
            total_value,
            excluded,
        })
    }

    /// The requesting user.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Eligible holdings in id order.
    #[must_use]
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    /// Number of eligible holdings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a constructed snapshot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total value of the eligible holdings.
    #[must_use]
    pub fn total_value(&self) -> Decimal {
        self.total_value
    }

    /// Number of holdings discarded as ineligible.
    #[must_use]
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    /// Current weights in entry order.
    #[must_use]
    pub fn weights(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.weight).collect()
    }

    /// Holding ids in entry order.
    #[must_use]
    pub fn holding_ids(&self) -> Vec<HoldingId> {
        self.entries.iter().map(|e| e.holding_id.clone()).collect()
    }

    /// Asset classes in entry order.
    #[must_use]
    pub fn asset_classes(&self) -> Vec<AssetClass> {
        self.entries.iter().map(|e| e.asset_class.clone()).collect()
    }
}

fn to_f64(value: Decimal) -> PortfolioResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| OptimizationError::numerical(format!("cannot represent {value} as f64")))
}

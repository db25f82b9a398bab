//! In-memory holdings store.
//!
//! Serves as the [`HoldingsSource`] for the CLI and tests, and notifies
//! subscribed [`HoldingsListener`]s after every committed mutation.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use frontier_traits::{
    AccountFilter, AccountId, AccountRecord, HoldingChangeKind, HoldingId, HoldingRecord,
    HoldingsEvent, HoldingsListener, HoldingsSource, TraitError, TraitResult, UserId,
};

/// Serialized contents of a store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoldingsFile {
    /// Accounts
    #[serde(default)]
    pub accounts: Vec<AccountRecord>,
    /// Holdings
    #[serde(default)]
    pub holdings: Vec<HoldingRecord>,
}

/// Thread-safe in-memory accounts and holdings.
#[derive(Default)]
pub struct InMemoryHoldingsStore {
    accounts: RwLock<BTreeMap<AccountId, AccountRecord>>,
    holdings: RwLock<BTreeMap<HoldingId, HoldingRecord>>,
    listeners: RwLock<Vec<Weak<dyn HoldingsListener>>>,
}

impl InMemoryHoldingsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from file contents without emitting notifications.
    pub fn from_file(file: HoldingsFile) -> TraitResult<Self> {
        let store = Self::new();
        for account in file.accounts {
            store.add_account(account)?;
        }
        {
            let accounts = store.accounts.read();
            let mut holdings = store.holdings.write();
            for holding in file.holdings {
                if !accounts.contains_key(&holding.account_id) {
                    return Err(TraitError::NotFound(format!(
                        "account {} of holding {}",
                        holding.account_id, holding.id
                    )));
                }
                if holdings.contains_key(&holding.id) {
                    return Err(TraitError::AlreadyExists(holding.id.to_string()));
                }
                holdings.insert(holding.id.clone(), holding);
            }
        }
        Ok(store)
    }

    /// Parses a JSON holdings file.
    pub fn from_json_str(content: &str) -> TraitResult<Self> {
        let file: HoldingsFile =
            serde_json::from_str(content).map_err(|e| TraitError::ParseError(e.to_string()))?;
        Self::from_file(file)
    }

    /// Reads a JSON holdings file.
    pub fn from_json_file(path: impl AsRef<Path>) -> TraitResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| TraitError::SourceNotAvailable(format!("{}: {e}", path.display())))?;
        let store = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.display(),
            holdings = store.holdings.read().len(),
            "loaded holdings file"
        );
        Ok(store)
    }

    /// Registers a listener. Dropped listeners are pruned on the next mutation.
    pub fn subscribe(&self, listener: Weak<dyn HoldingsListener>) {
        self.listeners.write().push(listener);
    }

    /// Adds an account.
    pub fn add_account(&self, account: AccountRecord) -> TraitResult<()> {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(&account.id) {
            return Err(TraitError::AlreadyExists(account.id.to_string()));
        }
        accounts.insert(account.id.clone(), account);
        Ok(())
    }

    /// Looks up a holding.
    pub fn get_holding(&self, holding_id: &HoldingId) -> Option<HoldingRecord> {
        self.holdings.read().get(holding_id).cloned()
    }

    /// Adds a holding to an existing account.
    pub fn create_holding(&self, holding: HoldingRecord) -> TraitResult<()> {
        let owner = self.owner_of(&holding.account_id)?;
        {
            let mut holdings = self.holdings.write();
            if holdings.contains_key(&holding.id) {
                return Err(TraitError::AlreadyExists(holding.id.to_string()));
            }
            holdings.insert(holding.id.clone(), holding.clone());
        }
        self.notify(owner, &holding, HoldingChangeKind::Created);
        Ok(())
    }

    /// Replaces an existing holding.
    ///
    /// Moving a holding between accounts notifies the owners of both.
    pub fn update_holding(&self, holding: HoldingRecord) -> TraitResult<()> {
        let owner = self.owner_of(&holding.account_id)?;
        let previous = {
            let mut holdings = self.holdings.write();
            let slot = holdings
                .get_mut(&holding.id)
                .ok_or_else(|| TraitError::NotFound(holding.id.to_string()))?;
            std::mem::replace(slot, holding.clone())
        };

        if previous.account_id != holding.account_id {
            if let Ok(previous_owner) = self.owner_of(&previous.account_id) {
                if previous_owner != owner {
                    self.notify(previous_owner, &previous, HoldingChangeKind::Updated);
                }
            }
        }
        self.notify(owner, &holding, HoldingChangeKind::Updated);
        Ok(())
    }

    /// Removes a holding.
    pub fn delete_holding(&self, holding_id: &HoldingId) -> TraitResult<HoldingRecord> {
        let removed = self
            .holdings
            .write()
            .remove(holding_id)
            .ok_or_else(|| TraitError::NotFound(holding_id.to_string()))?;

        if let Ok(owner) = self.owner_of(&removed.account_id) {
            self.notify(owner, &removed, HoldingChangeKind::Deleted);
        }
        Ok(removed)
    }

    fn owner_of(&self, account_id: &AccountId) -> TraitResult<UserId> {
        self.accounts
            .read()
            .get(account_id)
            .map(|a| a.user_id.clone())
            .ok_or_else(|| TraitError::NotFound(format!("account {account_id}")))
    }

    // Called with no store lock held, so listeners may read the store.
    fn notify(&self, user_id: UserId, holding: &HoldingRecord, kind: HoldingChangeKind) {
        let event = HoldingsEvent {
            user_id,
            account_id: holding.account_id.clone(),
            holding_id: holding.id.clone(),
            kind,
        };

        let live: Vec<Arc<dyn HoldingsListener>> = {
            let mut listeners = self.listeners.write();
            listeners.retain(|l| l.strong_count() > 0);
            listeners.iter().filter_map(|l| l.upgrade()).collect()
        };
        for listener in live {
            listener.on_holdings_changed(&event);
        }
    }
}

impl std::fmt::Debug for InMemoryHoldingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryHoldingsStore")
            .field("accounts", &self.accounts.read().len())
            .field("holdings", &self.holdings.read().len())
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}

impl HoldingsSource for InMemoryHoldingsStore {
    fn source_name(&self) -> &'static str {
        "in-memory"
    }

    fn accounts(&self, user_id: &UserId) -> TraitResult<Vec<AccountRecord>> {
        Ok(self
            .accounts
            .read()
            .values()
            .filter(|a| &a.user_id == user_id)
            .cloned()
            .collect())
    }

    fn holdings(&self, user_id: &UserId, filter: &AccountFilter) -> TraitResult<Vec<HoldingRecord>> {
        let accounts = self.accounts.read();
        let holdings = self.holdings.read();
        Ok(holdings
            .values()
            .filter(|h| {
                accounts
                    .get(&h.account_id)
                    .is_some_and(|a| &a.user_id == user_id)
            })
            .filter(|h| filter.matches(&h.account_id))
            .cloned()
            .collect())
    }
}

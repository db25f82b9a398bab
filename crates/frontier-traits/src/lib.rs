//! # Frontier Traits
//!
//! Interfaces between the Frontier optimization engine and the system that
//! owns users, accounts and holdings.
//!
//! This crate contains ONLY identifiers, records and trait definitions.
//! Implementations live in the engine (an in-memory store) or in the host
//! application.
//!
//! ## Module Structure
//!
//! - [`ids`]: user, account and holding identifiers
//! - [`holdings`]: holding/account records, the account filter, the
//!   [`HoldingsSource`] read seam and the [`HoldingsListener`] mutation hook
//! - [`error`]: collaborator error type
//!
//! ## Dependency Injection
//!
//! ```ignore
//! let store = Arc::new(InMemoryHoldingsStore::new());
//! let service = Arc::new(EfficientFrontierService::new(store.clone(), statistics, config)?);
//! store.subscribe(service.clone());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod holdings;
pub mod ids;

// Re-export commonly used types
pub use error::{TraitError, TraitResult};
pub use holdings::{
    AccountFilter, AccountRecord, HoldingChangeKind, HoldingRecord, HoldingsEvent,
    HoldingsListener, HoldingsSource,
};
pub use ids::*;

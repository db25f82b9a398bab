//! Built-in demo book used when no holdings file is given.

use rust_decimal_macros::dec;

use frontier_engine::InMemoryHoldingsStore;
use frontier_traits::{AccountRecord, HoldingRecord, TraitResult};

/// A four-class book for user `demo` split over an ISA and a GIA.
pub fn store() -> TraitResult<InMemoryHoldingsStore> {
    let store = InMemoryHoldingsStore::new();
    store.add_account(AccountRecord::new("demo-isa", "demo", "Stocks & Shares ISA"))?;
    store.add_account(AccountRecord::new("demo-gia", "demo", "General Investment Account"))?;

    for holding in [
        HoldingRecord::new("ftse-tracker", "demo-isa", "uk_equity", dec!(25000)),
        HoldingRecord::new("sp500-tracker", "demo-isa", "us_equity", dec!(30000)),
        HoldingRecord::new("gilt-fund", "demo-gia", "bond", dec!(20000)),
        HoldingRecord::new("world-ex-us", "demo-gia", "international_equity", dec!(25000)),
    ] {
        store.create_holding(holding)?;
    }
    Ok(store)
}

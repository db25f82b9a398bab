//! Integration tests for the efficient frontier service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::thread;

use frontier_engine::{
    EfficientFrontierService, EfficientFrontierServiceBuilder, EngineConfig, EngineError,
    InMemoryHoldingsStore,
};
use frontier_portfolio::OptimizationError;
use frontier_traits::{
    AccountFilter, AccountRecord, HoldingId, HoldingRecord, HoldingsListener, HoldingsSource,
    TraitResult, UserId,
};
use approx::assert_relative_eq;
use rust_decimal_macros::dec;

// =============================================================================
// FIXTURES
// =============================================================================

/// Counts reads so tests can tell whether holdings were loaded.
struct CountingSource {
    inner: Arc<InMemoryHoldingsStore>,
    reads: AtomicUsize,
}

impl HoldingsSource for CountingSource {
    fn source_name(&self) -> &'static str {
        "counting"
    }

    fn accounts(&self, user_id: &UserId) -> TraitResult<Vec<AccountRecord>> {
        self.inner.accounts(user_id)
    }

    fn holdings(&self, user_id: &UserId, filter: &AccountFilter) -> TraitResult<Vec<HoldingRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.holdings(user_id, filter)
    }
}

fn balanced_store() -> Arc<InMemoryHoldingsStore> {
    let store = InMemoryHoldingsStore::new();
    store.add_account(AccountRecord::new("isa", "alice", "ISA")).unwrap();
    store.add_account(AccountRecord::new("gia", "alice", "General")).unwrap();
    store.add_account(AccountRecord::new("bob-isa", "bob", "ISA")).unwrap();
    store.add_account(AccountRecord::new("carol-isa", "carol", "ISA")).unwrap();
    for holding in [
        HoldingRecord::new("h1", "isa", "uk_equity", dec!(2500)),
        HoldingRecord::new("h2", "isa", "us_equity", dec!(3000)),
        HoldingRecord::new("h3", "gia", "bond", dec!(2000)),
        HoldingRecord::new("h4", "gia", "international_equity", dec!(2500)),
        HoldingRecord::new("b1", "bob-isa", "cash", dec!(1000)),
        HoldingRecord::new("b2", "bob-isa", "bond", dec!(1000)),
        HoldingRecord::new("c1", "carol-isa", "bond", dec!(1000)),
    ] {
        store.create_holding(holding).unwrap();
    }
    Arc::new(store)
}

fn service_over(store: &Arc<InMemoryHoldingsStore>) -> (Arc<EfficientFrontierService>, Arc<CountingSource>) {
    let source = Arc::new(CountingSource {
        inner: store.clone(),
        reads: AtomicUsize::new(0),
    });
    let service = Arc::new(
        EfficientFrontierServiceBuilder::new()
            .with_source(source.clone())
            .with_config(EngineConfig::default())
            .build()
            .unwrap(),
    );
    let weak = Arc::downgrade(&service);
    let listener: Weak<dyn HoldingsListener> = weak;
    store.subscribe(listener);
    (service, source)
}

fn alice() -> UserId {
    UserId::from("alice")
}

fn optimization_error(err: EngineError) -> OptimizationError {
    match err {
        EngineError::Optimization(e) => e,
        other => panic!("expected an optimization error, got {other}"),
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

#[test]
fn test_frontier_report_for_balanced_book() {
    let store = balanced_store();
    let (service, _) = service_over(&store);

    let report = service
        .efficient_frontier(&alice(), &AccountFilter::All, Some(0.045), Some(50))
        .unwrap();

    assert_eq!(report.holdings.len(), 4);
    assert_eq!(report.total_value, dec!(10000));
    assert_eq!(report.frontier.len(), 50);
    assert_eq!(report.capital_allocation_line.len(), 50);
    assert!(!report.frontier_collapsed);

    let weights: f64 = report.tangency.weights.iter().sum();
    assert_relative_eq!(weights, 1.0, epsilon = 1e-6);
    assert!(report.tangency.sharpe_ratio.unwrap() >= report.current.sharpe_ratio.unwrap() - 1e-9);
    assert!(report.minimum_variance.expected_risk <= report.current.expected_risk);

    // The CAL starts at the risk-free rate and covers the whole frontier
    let cal_start = report.capital_allocation_line[0];
    assert_eq!(cal_start.risk, 0.0);
    assert_relative_eq!(cal_start.expected_return, 0.045, epsilon = 1e-15);
    let cal_end = report.capital_allocation_line.last().unwrap();
    assert!(report.frontier.iter().all(|p| p.expected_risk <= cal_end.risk + 1e-12));

    assert!(!report.improvement.on_frontier);
    assert_eq!(report.correlation.pairs, 6);
    assert!(report.diversification.diversification_ratio > 1.0);
}

#[test]
fn test_defaults_come_from_config() {
    let store = balanced_store();
    let (service, _) = service_over(&store);

    let report = service
        .efficient_frontier(&alice(), &AccountFilter::All, None, None)
        .unwrap();

    assert_eq!(report.frontier.len(), 50);
    assert_relative_eq!(report.risk_free_rate, 0.045);
}

#[test]
fn test_single_optimizations() {
    let store = balanced_store();
    let (service, _) = service_over(&store);
    let all = AccountFilter::All;

    let min_var = service.minimize_variance(&alice(), &all, None, None).unwrap();
    let tangency = service
        .maximize_sharpe(&alice(), &all, Some(0.02), None, Some(0.6))
        .unwrap();
    let target = service
        .target_return(&alice(), &all, 0.06, None, None)
        .unwrap();
    let parity = service.risk_parity(&alice(), &all).unwrap();

    assert!(min_var.expected_risk <= parity.expected_risk + 1e-12);
    assert!(tangency.weights.iter().all(|&w| w <= 0.6 + 1e-9));
    assert_relative_eq!(target.expected_return, 0.06, epsilon = 1e-6);

    let spread = parity
        .risk_contributions
        .iter()
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), &rc| (lo.min(rc), hi.max(rc)));
    assert!(spread.1 / spread.0 <= 1.5);
}

#[test]
fn test_correlation_report() {
    let store = balanced_store();
    let (service, _) = service_over(&store);

    let report = service
        .correlation_matrix(&alice(), &AccountFilter::only(["isa"]))
        .unwrap();

    assert_eq!(report.labels.len(), 2);
    assert_eq!(report.matrix, vec![vec![1.0, 0.8], vec![0.8, 1.0]]);
    assert_relative_eq!(report.summary.average, 0.8);
}

#[test]
fn test_current_position_report() {
    let store = balanced_store();
    let (service, _) = service_over(&store);

    let report = service
        .current_position(&alice(), &AccountFilter::All)
        .unwrap();

    assert_relative_eq!(report.risk_free_rate, 0.045);
    assert!(report.improvement.additional_return > 0.0);
    let weights: f64 = report.holdings.iter().map(|h| h.weight).sum();
    assert_relative_eq!(weights, 1.0, epsilon = 1e-12);
}

#[test]
fn test_identical_returns_collapse_the_frontier() {
    let store = InMemoryHoldingsStore::new();
    store.add_account(AccountRecord::new("dana-isa", "dana", "ISA")).unwrap();
    store
        .create_holding(HoldingRecord::new("d1", "dana-isa", "bond", dec!(1000)))
        .unwrap();
    store
        .create_holding(HoldingRecord::new("d2", "dana-isa", "bond", dec!(1000)))
        .unwrap();
    let (service, _) = service_over(&Arc::new(store));

    let report = service
        .efficient_frontier(&UserId::from("dana"), &AccountFilter::All, Some(0.045), Some(50))
        .unwrap();

    assert!(report.frontier_collapsed);
    assert_eq!(report.frontier.len(), 1);
    assert_relative_eq!(report.frontier[0].expected_return, 0.035, epsilon = 1e-9);

    // Every portfolio earns less than the risk-free rate
    assert_relative_eq!(report.tangency.sharpe_ratio.unwrap(), -1.0 / 6.0, epsilon = 1e-3);

    assert!(report.improvement.on_frontier);
    assert_relative_eq!(report.improvement.additional_return, 0.0, epsilon = 1e-9);
    assert_relative_eq!(report.improvement.risk_reduction, 0.0, epsilon = 1e-6);

    assert_eq!(report.capital_allocation_line.len(), 50);
    let cal_start = report.capital_allocation_line[0];
    assert_eq!(cal_start.risk, 0.0);
    assert_relative_eq!(cal_start.expected_return, 0.045, epsilon = 1e-15);
    let cal_end = report.capital_allocation_line.last().unwrap();
    assert!(cal_end.risk >= report.tangency.expected_risk - 1e-12);
}

// =============================================================================
// ERRORS
// =============================================================================

#[test]
fn test_validation_happens_before_loading() {
    let store = balanced_store();
    let (service, source) = service_over(&store);

    let err = service
        .target_return(&alice(), &AccountFilter::All, 1.5, None, None)
        .unwrap_err();
    assert!(matches!(optimization_error(err), OptimizationError::Validation { .. }));

    let err = service
        .efficient_frontier(&alice(), &AccountFilter::All, Some(0.045), Some(1))
        .unwrap_err();
    assert!(matches!(optimization_error(err), OptimizationError::Validation { .. }));

    let err = service
        .minimize_variance(&alice(), &AccountFilter::All, Some(0.5), Some(0.4))
        .unwrap_err();
    assert!(matches!(optimization_error(err), OptimizationError::Validation { .. }));

    assert_eq!(source.reads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_foreign_account_is_unauthorized() {
    let store = balanced_store();
    let (service, _) = service_over(&store);

    let err = service
        .risk_parity(&alice(), &AccountFilter::only(["bob-isa"]))
        .unwrap_err();
    assert_eq!(
        optimization_error(err),
        OptimizationError::authorization("bob-isa")
    );
}

#[test]
fn test_failures_are_not_cached() {
    let store = balanced_store();
    let (service, source) = service_over(&store);
    let carol = UserId::from("carol");

    for _ in 0..2 {
        let err = service
            .minimize_variance(&carol, &AccountFilter::All, None, None)
            .unwrap_err();
        assert!(matches!(
            optimization_error(err),
            OptimizationError::InsufficientData { .. }
        ));
    }

    assert!(service.cache().is_empty());
    assert_eq!(source.reads.load(Ordering::SeqCst), 2);
}

#[test]
fn test_infeasible_bounds() {
    let store = balanced_store();
    let (service, _) = service_over(&store);

    let err = service
        .maximize_sharpe(&alice(), &AccountFilter::All, None, None, Some(0.2))
        .unwrap_err();
    assert!(matches!(
        optimization_error(err),
        OptimizationError::InfeasibleConstraints { .. }
    ));
}

// =============================================================================
// CACHE
// =============================================================================

#[test]
fn test_repeated_requests_are_byte_identical() {
    let store = balanced_store();
    let (service, source) = service_over(&store);

    let first = service
        .efficient_frontier(&alice(), &AccountFilter::All, Some(0.045), Some(20))
        .unwrap();
    let second = service
        .efficient_frontier(&alice(), &AccountFilter::All, Some(0.045), Some(20))
        .unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(source.reads.load(Ordering::SeqCst), 1);
    assert_eq!(service.cache().stats().hits, 1);
}

#[test]
fn test_account_order_and_negative_zero_share_entries() {
    let store = balanced_store();
    let (service, source) = service_over(&store);

    service
        .maximize_sharpe(&alice(), &AccountFilter::only(["isa", "gia"]), Some(0.0), None, None)
        .unwrap();
    service
        .maximize_sharpe(&alice(), &AccountFilter::only(["gia", "isa"]), Some(-0.0), None, None)
        .unwrap();

    assert_eq!(source.reads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_holdings_change_invalidates_user() {
    let store = balanced_store();
    let (service, source) = service_over(&store);
    let bob = UserId::from("bob");

    let before = service.minimize_variance(&alice(), &AccountFilter::All, None, None).unwrap();
    service.minimize_variance(&bob, &AccountFilter::All, None, None).unwrap();
    assert_eq!(service.cache().len(), 2);

    store
        .create_holding(HoldingRecord::new("h5", "gia", "alternative", dec!(4000)))
        .unwrap();

    // Only alice's entry is dropped
    assert_eq!(service.cache().len(), 1);
    let misses = service.cache().stats().misses;

    let after = service.minimize_variance(&alice(), &AccountFilter::All, None, None).unwrap();
    assert_eq!(service.cache().stats().misses, misses + 1);
    assert_eq!(after.weights.len(), 5);
    assert_ne!(before.weights.len(), after.weights.len());
    assert_eq!(source.reads.load(Ordering::SeqCst), 3);

    store.delete_holding(&HoldingId::from("h5")).unwrap();
    assert_eq!(service.cache().len(), 1);
}

/// Rewrites `h1` during the first read, after the holdings were fetched but
/// before the service sees them.
struct MutatingSource {
    inner: Arc<InMemoryHoldingsStore>,
    reads: AtomicUsize,
}

impl HoldingsSource for MutatingSource {
    fn source_name(&self) -> &'static str {
        "mutating"
    }

    fn accounts(&self, user_id: &UserId) -> TraitResult<Vec<AccountRecord>> {
        self.inner.accounts(user_id)
    }

    fn holdings(&self, user_id: &UserId, filter: &AccountFilter) -> TraitResult<Vec<HoldingRecord>> {
        let read = self.reads.fetch_add(1, Ordering::SeqCst);
        let holdings = self.inner.holdings(user_id, filter)?;
        if read == 0 {
            self.inner
                .update_holding(HoldingRecord::new("h1", "isa", "uk_equity", dec!(9000)))?;
        }
        Ok(holdings)
    }
}

#[test]
fn test_mutation_during_computation_is_not_cached() {
    let store = InMemoryHoldingsStore::new();
    store.add_account(AccountRecord::new("isa", "alice", "ISA")).unwrap();
    store
        .create_holding(HoldingRecord::new("h1", "isa", "uk_equity", dec!(1000)))
        .unwrap();
    store
        .create_holding(HoldingRecord::new("h2", "isa", "bond", dec!(1000)))
        .unwrap();
    let store = Arc::new(store);

    let source = Arc::new(MutatingSource {
        inner: store.clone(),
        reads: AtomicUsize::new(0),
    });
    let service = Arc::new(
        EfficientFrontierServiceBuilder::new()
            .with_source(source.clone())
            .build()
            .unwrap(),
    );
    let weak = Arc::downgrade(&service);
    let listener: Weak<dyn HoldingsListener> = weak;
    store.subscribe(listener);

    let first = service.current_position(&alice(), &AccountFilter::All).unwrap();
    assert_relative_eq!(first.holdings[0].weight, 0.5);
    assert!(service.cache().is_empty());

    let second = service.current_position(&alice(), &AccountFilter::All).unwrap();
    assert_eq!(source.reads.load(Ordering::SeqCst), 2);
    assert_relative_eq!(second.holdings[0].weight, 0.9, epsilon = 1e-12);
    assert_relative_eq!(second.holdings[1].weight, 0.1, epsilon = 1e-12);

    // Nothing changed since the second read, so its result is kept
    service.current_position(&alice(), &AccountFilter::All).unwrap();
    assert_eq!(source.reads.load(Ordering::SeqCst), 2);
}

#[test]
fn test_clear_cache() {
    let store = balanced_store();
    let (service, _) = service_over(&store);

    service.risk_parity(&alice(), &AccountFilter::All).unwrap();
    service.risk_parity(&UserId::from("bob"), &AccountFilter::All).unwrap();

    assert_eq!(service.clear_cache(&alice()), 1);
    assert_eq!(service.clear_all_cache(), 1);
    assert!(service.cache().is_empty());
}

#[test]
fn test_service_is_shareable_across_threads() {
    let store = balanced_store();
    let (service, _) = service_over(&store);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                service
                    .maximize_sharpe(&alice(), &AccountFilter::All, Some(0.01 * i as f64), None, None)
                    .map(|r| r.weights.len())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 4);
    }
}

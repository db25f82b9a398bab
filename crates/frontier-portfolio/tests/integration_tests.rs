//! Integration tests for frontier-portfolio.
//!
//! These tests run the full pipeline from a holdings source to optimized
//! allocations with realistic portfolios.

use frontier_portfolio::prelude::*;
use frontier_portfolio::statistics::CorrelationEntry;
use frontier_traits::{AccountRecord, TraitResult};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// =============================================================================
// TEST FIXTURES
// =============================================================================

/// Holdings store backed by vectors.
struct FixedSource {
    accounts: Vec<AccountRecord>,
    holdings: Vec<HoldingRecord>,
}

impl HoldingsSource for FixedSource {
    fn source_name(&self) -> &'static str {
        "fixed"
    }

    fn accounts(&self, user_id: &UserId) -> TraitResult<Vec<AccountRecord>> {
        Ok(self
            .accounts
            .iter()
            .filter(|a| &a.user_id == user_id)
            .cloned()
            .collect())
    }

    fn holdings(&self, user_id: &UserId, filter: &AccountFilter) -> TraitResult<Vec<HoldingRecord>> {
        let owned = self.accounts(user_id)?;
        Ok(self
            .holdings
            .iter()
            .filter(|h| owned.iter().any(|a| a.id == h.account_id))
            .filter(|h| filter.matches(&h.account_id))
            .cloned()
            .collect())
    }
}

/// The four-holding book: uk 25%, us 30%, bond 20%, international 25%.
fn balanced_source() -> FixedSource {
    FixedSource {
        accounts: vec![
            AccountRecord::new("isa", "alice", "ISA"),
            AccountRecord::new("gia", "alice", "General"),
            AccountRecord::new("bob-isa", "bob", "ISA"),
        ],
        holdings: vec![
            HoldingRecord::new("h1", "isa", "uk_equity", dec!(2500)),
            HoldingRecord::new("h2", "isa", "us_equity", dec!(3000)),
            HoldingRecord::new("h3", "gia", "bond", dec!(2000)),
            HoldingRecord::new("h4", "gia", "international_equity", dec!(2500)),
            HoldingRecord::new("b1", "bob-isa", "cash", dec!(100000)),
        ],
    }
}

fn load_model(source: &FixedSource, filter: &AccountFilter) -> (HoldingsSnapshot, CovarianceModel) {
    let snapshot = HoldingsSnapshot::load(source, &UserId::from("alice"), filter).unwrap();
    let stats = AssetClassStatistics::standard();
    let model = CovarianceMatrixBuilder::new(&stats).build(&snapshot).unwrap();
    (snapshot, model)
}

fn assert_feasible(weights: &[f64], bounds: &WeightBounds) {
    let sum: f64 = weights.iter().sum();
    assert!((sum - 1.0).abs() < 1e-6, "weights sum to {sum}");
    for &w in weights {
        assert!(
            w >= bounds.min_weight() - 1e-9 && w <= bounds.max_weight() + 1e-9,
            "weight {w} outside bounds"
        );
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

#[test]
fn test_snapshot_only_sees_own_holdings() {
    let source = balanced_source();
    let (snapshot, _) = load_model(&source, &AccountFilter::All);

    assert_eq!(snapshot.len(), 4);
    assert_eq!(snapshot.total_value(), dec!(10000));
    let weights = snapshot.weights();
    assert!((weights[1] - 0.30).abs() < 1e-12);
}

#[test]
fn test_account_filter_restricts_universe() {
    let source = balanced_source();
    let (snapshot, _) = load_model(&source, &AccountFilter::only(["gia"]));

    let ids: Vec<&str> = snapshot.entries().iter().map(|e| e.holding_id.as_str()).collect();
    assert_eq!(ids, vec!["h3", "h4"]);
    assert_eq!(snapshot.total_value(), dec!(4500));
}

#[test]
fn test_foreign_account_is_rejected() {
    let source = balanced_source();
    let err = HoldingsSnapshot::load(
        &source,
        &UserId::from("alice"),
        &AccountFilter::only(["isa", "bob-isa"]),
    )
    .unwrap_err();

    assert_eq!(err, OptimizationError::authorization("bob-isa"));
}

#[test]
fn test_single_account_with_one_holding_is_insufficient() {
    let source = FixedSource {
        accounts: vec![AccountRecord::new("isa", "alice", "ISA")],
        holdings: vec![
            HoldingRecord::new("h1", "isa", "bond", dec!(1000)),
            HoldingRecord::new("h2", "isa", "cash", Decimal::ZERO),
        ],
    };
    let err =
        HoldingsSnapshot::load(&source, &UserId::from("alice"), &AccountFilter::All).unwrap_err();
    assert!(matches!(err, OptimizationError::InsufficientData { .. }));
}

// =============================================================================
// OPTIMIZERS
// =============================================================================

#[test]
fn test_balanced_book_end_to_end() {
    let source = balanced_source();
    let (snapshot, model) = load_model(&source, &AccountFilter::All);
    let optimizer = MeanVarianceOptimizer::default();
    let bounds = WeightBounds::default();

    let min_var = optimizer.minimize_variance(&model, &bounds).unwrap();
    let tangency = optimizer.maximize_sharpe(&model, 0.045, &bounds).unwrap();
    let frontier = optimizer
        .frontier(&model, &bounds, 50)
        .unwrap()
        .with_risk_free_rate(0.045);

    assert_feasible(&min_var.weights, &bounds);
    assert_feasible(&tangency.weights, &bounds);
    assert_eq!(frontier.points.len(), 50);

    // Bonds dominate the minimum-variance book
    assert!(min_var.weights[2] > 0.5);

    let current = nalgebra::DVector::from_vec(snapshot.weights());
    assert!(min_var.expected_risk <= model.portfolio_risk(&current) + 1e-9);

    // No frontier point beats the tangency Sharpe ratio
    let best = tangency.sharpe_ratio.unwrap();
    for point in &frontier.points {
        assert_feasible(&point.weights, &bounds);
        assert!(point.sharpe_ratio.unwrap() <= best + 1e-6);
    }

    // Returns increase and risk does not decrease along the frontier
    for pair in frontier.points.windows(2) {
        assert!(pair[1].expected_return > pair[0].expected_return - 1e-9);
        assert!(pair[1].expected_risk > pair[0].expected_risk - 1e-7);
    }
    let last = frontier.points.last().unwrap();
    assert!((last.expected_return - 0.08).abs() < 1e-6);
}

#[test]
fn test_target_return_validation_happens_first() {
    let source = balanced_source();
    let (_, model) = load_model(&source, &AccountFilter::All);
    let optimizer = MeanVarianceOptimizer::default();

    let err = optimizer
        .target_return(&model, 1.5, &WeightBounds::default())
        .unwrap_err();
    assert!(matches!(err, OptimizationError::Validation { .. }));
}

#[test]
fn test_target_return_meets_target() {
    let source = balanced_source();
    let (_, model) = load_model(&source, &AccountFilter::All);
    let optimizer = MeanVarianceOptimizer::default();
    let bounds = WeightBounds::default();

    let result = optimizer.target_return(&model, 0.06, &bounds).unwrap();

    assert!(result.converged);
    assert!((result.expected_return - 0.06).abs() < 1e-6);
    assert_feasible(&result.weights, &bounds);
}

#[test]
fn test_risk_parity_equalizes_contributions() {
    let source = balanced_source();
    let (_, model) = load_model(&source, &AccountFilter::All);
    let optimizer = MeanVarianceOptimizer::default();

    let result = optimizer
        .risk_parity(&model, &WeightBounds::default())
        .unwrap();

    assert!(result.converged);
    let mean = result.expected_risk / 4.0;
    for rc in &result.risk_contributions {
        assert!((rc - mean).abs() / mean <= 0.011, "contribution {rc} vs mean {mean}");
    }
}

#[test]
fn test_tight_bounds_are_infeasible() {
    let source = balanced_source();
    let (_, model) = load_model(&source, &AccountFilter::All);
    let optimizer = MeanVarianceOptimizer::default();
    let bounds = WeightBounds::new(0.0, 0.2).unwrap();

    let err = optimizer.minimize_variance(&model, &bounds).unwrap_err();
    assert!(matches!(err, OptimizationError::InfeasibleConstraints { .. }));
}

#[test]
fn test_uncorrelated_pair_beats_either_asset() {
    let stats = AssetClassStatistics::new(
        [
            (AssetClass::new("a"), AssetClassProfile::new(0.06, 0.20)),
            (AssetClass::new("b"), AssetClassProfile::new(0.04, 0.10)),
        ],
        [CorrelationEntry {
            a: AssetClass::new("a"),
            b: AssetClass::new("b"),
            value: 0.0,
        }],
    )
    .unwrap();
    let snapshot = HoldingsSnapshot::from_holdings(
        UserId::from("alice"),
        vec![
            HoldingRecord::new("h1", "isa", "a", dec!(500)),
            HoldingRecord::new("h2", "isa", "b", dec!(500)),
        ],
    )
    .unwrap();
    let model = CovarianceMatrixBuilder::new(&stats).build(&snapshot).unwrap();

    let result = MeanVarianceOptimizer::default()
        .minimize_variance(&model, &WeightBounds::default())
        .unwrap();

    // w_a = σ_b² / (σ_a² + σ_b²) = 0.2
    assert!((result.weights[0] - 0.2).abs() < 1e-6);
    assert!(result.expected_risk < 0.10);
    assert!(result.expected_risk < 0.20);
}

// =============================================================================
// ANALYTICS
// =============================================================================

#[test]
fn test_correlation_matrix_is_symmetric_with_unit_diagonal() {
    let source = balanced_source();
    let (_, model) = load_model(&source, &AccountFilter::All);
    let corr = model.correlation();

    for i in 0..model.len() {
        assert_eq!(corr[(i, i)], 1.0);
        for j in 0..model.len() {
            assert_eq!(corr[(i, j)], corr[(j, i)]);
        }
    }

    let summary = correlation_summary(&model).unwrap();
    assert_eq!(summary.pairs, 6);
    assert_eq!(summary.max.correlation, 0.85);
}

#[test]
fn test_current_book_has_room_to_improve() {
    let source = balanced_source();
    let (snapshot, model) = load_model(&source, &AccountFilter::All);
    let optimizer = MeanVarianceOptimizer::default();
    let bounds = WeightBounds::default();
    let current = nalgebra::DVector::from_vec(snapshot.weights());

    let tangency = optimizer.maximize_sharpe(&model, 0.045, &bounds).unwrap();
    let found =
        improvement_opportunities(&optimizer, &model, &bounds, &current, &tangency, 0.045, 1e-3)
            .unwrap();

    assert!(!found.on_frontier);
    assert!(found.additional_return > 0.0);
    assert!(found.risk_reduction > 0.0);
    assert!(found.sharpe_improvement.unwrap() > 0.0);

    let summary = summarize_portfolio(&model, &current, 0.045);
    let total: f64 = summary.allocations.iter().map(|a| a.risk_share).sum();
    assert!((total - 1.0).abs() < 1e-12);
}

#[test]
fn test_assumptions_load_from_toml() {
    let toml = r#"
        [classes.growth]
        expected_return = 0.09
        volatility = 0.2

        [classes.defensive]
        expected_return = 0.03
        volatility = 0.05

        [[correlations]]
        a = "growth"
        b = "defensive"
        value = 0.1
    "#;
    let stats = AssetClassStatistics::from_toml_str(toml).unwrap();

    assert!(stats.contains(&AssetClass::new("Growth")));
    let rho = stats
        .correlation(&AssetClass::new("growth"), &AssetClass::new("defensive"))
        .unwrap();
    assert!((rho - 0.1).abs() < 1e-15);
}

//! CLI command implementations.

pub mod correlation;
pub mod current;
mod demo;
pub mod frontier;
pub mod optimize;

use std::sync::{Arc, Weak};

use clap::Args;

use frontier_engine::{
    EfficientFrontierService, EfficientFrontierServiceBuilder, EngineConfig, EngineError,
    InMemoryHoldingsStore,
};
use frontier_portfolio::AssetClassStatistics;
use frontier_traits::{AccountFilter, AccountId, HoldingsListener, UserId};

use crate::cli::Cli;
use crate::error::{CliError, CliResult};

// =============================================================================
// ARGUMENTS
// =============================================================================

/// Arguments for the frontier command.
#[derive(Args, Debug, Clone)]
pub struct FrontierArgs {
    /// Annual risk-free rate as a decimal (configured default if omitted)
    #[arg(short, long)]
    pub risk_free_rate: Option<f64>,

    /// Number of frontier points (configured default if omitted)
    #[arg(short, long)]
    pub points: Option<usize>,
}

/// Per-holding weight bounds.
#[derive(Args, Debug, Clone, Default)]
pub struct BoundsArgs {
    /// Minimum weight per holding
    #[arg(long)]
    pub min_weight: Option<f64>,

    /// Maximum weight per holding
    #[arg(long)]
    pub max_weight: Option<f64>,
}

/// Arguments for the max-sharpe command.
#[derive(Args, Debug, Clone)]
pub struct MaxSharpeArgs {
    /// Annual risk-free rate as a decimal (configured default if omitted)
    #[arg(short, long)]
    pub risk_free_rate: Option<f64>,

    #[command(flatten)]
    pub bounds: BoundsArgs,
}

/// Arguments for the target-return command.
#[derive(Args, Debug, Clone)]
pub struct TargetReturnArgs {
    /// Required expected return as a decimal, e.g. 0.06
    #[arg(short, long, allow_negative_numbers = true)]
    pub target: f64,

    #[command(flatten)]
    pub bounds: BoundsArgs,
}

// =============================================================================
// SESSION
// =============================================================================

/// A configured service plus the request scope taken from global flags.
pub struct Session {
    /// Service answering every command
    pub service: Arc<EfficientFrontierService>,
    /// Requesting user
    pub user: UserId,
    /// Account restriction
    pub filter: AccountFilter,
    // Keeps the store alive for the lifetime of the subscription
    _store: Arc<InMemoryHoldingsStore>,
}

impl Session {
    /// Loads inputs named by the global flags and builds the service.
    pub fn open(cli: &Cli) -> CliResult<Self> {
        let store = match &cli.holdings {
            Some(path) => InMemoryHoldingsStore::from_json_file(path)
                .map_err(|e| CliError::input("holdings", path, e))?,
            None => {
                tracing::debug!("no holdings file given, using the demo book");
                demo::store().map_err(|e| CliError::Rejected(e.to_string()))?
            }
        };
        let store = Arc::new(store);

        let mut builder = EfficientFrontierServiceBuilder::new().with_source(store.clone());
        if let Some(path) = &cli.config {
            let config = EngineConfig::from_toml_file(path)
                .map_err(|e| CliError::input("configuration", path, e))?;
            builder = builder.with_config(config);
        }
        if let Some(path) = &cli.assumptions {
            let statistics = AssetClassStatistics::from_toml_file(path)
                .map_err(|e| CliError::input("assumptions", path, e))?;
            builder = builder.with_statistics(Arc::new(statistics));
        }

        let service = Arc::new(builder.build().map_err(reject)?);
        let weak = Arc::downgrade(&service);
        let listener: Weak<dyn HoldingsListener> = weak;
        store.subscribe(listener);

        let filter = AccountFilter::from(
            cli.accounts
                .as_ref()
                .map(|ids| ids.iter().map(|id| AccountId::from(id.trim())).collect::<Vec<_>>()),
        );

        Ok(Self {
            service,
            user: UserId::from(cli.user.as_str()),
            filter,
            _store: store,
        })
    }
}

/// Converts a service error into a CLI rejection carrying its error code.
pub fn reject(err: EngineError) -> CliError {
    tracing::debug!(error = ?err, "request rejected");
    match err.as_optimization() {
        Some(e) => CliError::Rejected(format!("{} [{}]", e, e.code())),
        None => CliError::Rejected(err.to_string()),
    }
}

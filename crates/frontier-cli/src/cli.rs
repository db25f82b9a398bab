//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{BoundsArgs, FrontierArgs, MaxSharpeArgs, TargetReturnArgs};

/// Frontier - Mean-variance portfolio optimization CLI
#[derive(Parser)]
#[command(name = "frontier")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log solver and cache activity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON holdings file ({"accounts": [...], "holdings": [...]}); the demo book if omitted
    #[arg(long, env = "FRONTIER_HOLDINGS", global = true)]
    pub holdings: Option<PathBuf>,

    /// TOML asset-class assumptions; the standard table if omitted
    #[arg(long, env = "FRONTIER_ASSUMPTIONS", global = true)]
    pub assumptions: Option<PathBuf>,

    /// TOML engine configuration
    #[arg(long, env = "FRONTIER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// User whose holdings are analysed
    #[arg(short, long, default_value = "demo", global = true)]
    pub user: String,

    /// Restrict the analysis to these accounts (comma separated)
    #[arg(short, long, value_delimiter = ',', global = true)]
    pub accounts: Option<Vec<String>>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Efficient frontier, tangency portfolio and Capital Allocation Line
    Frontier(FrontierArgs),

    /// Minimum-variance portfolio
    MinVariance(BoundsArgs),

    /// Maximum Sharpe ratio (tangency) portfolio
    MaxSharpe(MaxSharpeArgs),

    /// Least-risk portfolio with a given expected return
    TargetReturn(TargetReturnArgs),

    /// Equal risk contribution portfolio
    RiskParity,

    /// Holding-level correlation matrix
    Correlation,

    /// Current portfolio and improvement opportunities
    Current,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
}

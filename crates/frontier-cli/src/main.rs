//! Frontier CLI - Command-line interface for portfolio optimization.
//!
//! # Usage
//!
//! ```bash
//! # Efficient frontier of the built-in demo book
//! frontier frontier --risk-free-rate 0.045 --points 50
//!
//! # Minimum-variance portfolio of two accounts, capped at 40% per holding
//! frontier --holdings holdings.json --user alice --accounts isa,gia min-variance --max-weight 0.4
//!
//! # Correlation matrix as JSON
//! frontier --format json correlation
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};
use commands::Session;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over the flags
    let default_filter = if cli.verbose {
        "frontier=debug,frontier_engine=debug,frontier_portfolio=debug,frontier_math=debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let session = Session::open(&cli)?;
    let format = cli.format;

    // Execute command
    match cli.command {
        Commands::Frontier(args) => commands::frontier::execute(&session, args, format)?,
        Commands::MinVariance(args) => commands::optimize::min_variance(&session, args, format)?,
        Commands::MaxSharpe(args) => commands::optimize::max_sharpe(&session, args, format)?,
        Commands::TargetReturn(args) => commands::optimize::target_return(&session, args, format)?,
        Commands::RiskParity => commands::optimize::risk_parity(&session, format)?,
        Commands::Correlation => commands::correlation::execute(&session, format)?,
        Commands::Current => commands::current::execute(&session, format)?,
    }

    Ok(())
}

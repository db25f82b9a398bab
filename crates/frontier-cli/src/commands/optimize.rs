//! Single-objective optimization commands.

use crate::cli::OutputFormat;
use crate::output;

use super::{reject, BoundsArgs, MaxSharpeArgs, Session, TargetReturnArgs};

/// Executes the min-variance command.
pub fn min_variance(session: &Session, args: BoundsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let result = session
        .service
        .minimize_variance(&session.user, &session.filter, args.min_weight, args.max_weight)
        .map_err(reject)?;
    output::print_result("Minimum Variance Portfolio", &result, format)
}

/// Executes the max-sharpe command.
pub fn max_sharpe(session: &Session, args: MaxSharpeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let result = session
        .service
        .maximize_sharpe(
            &session.user,
            &session.filter,
            args.risk_free_rate,
            args.bounds.min_weight,
            args.bounds.max_weight,
        )
        .map_err(reject)?;
    output::print_result("Maximum Sharpe Portfolio", &result, format)
}

/// Executes the target-return command.
pub fn target_return(
    session: &Session,
    args: TargetReturnArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let result = session
        .service
        .target_return(
            &session.user,
            &session.filter,
            args.target,
            args.bounds.min_weight,
            args.bounds.max_weight,
        )
        .map_err(reject)?;
    output::print_result(
        &format!("Target Return Portfolio ({})", output::percent(args.target)),
        &result,
        format,
    )
}

/// Executes the risk-parity command.
pub fn risk_parity(session: &Session, format: OutputFormat) -> anyhow::Result<()> {
    let result = session
        .service
        .risk_parity(&session.user, &session.filter)
        .map_err(reject)?;
    output::print_result("Risk Parity Portfolio", &result, format)
}

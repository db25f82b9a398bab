//! Frontier command implementation.

use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::output::{self, percent, ratio, KeyValue};

use super::{reject, FrontierArgs, Session};

#[derive(Tabled)]
struct PointRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Return")]
    expected_return: String,
    #[tabled(rename = "Risk")]
    expected_risk: String,
    #[tabled(rename = "Sharpe")]
    sharpe: String,
}

#[derive(Tabled)]
struct PortfolioRow {
    #[tabled(rename = "Portfolio")]
    portfolio: &'static str,
    #[tabled(rename = "Return")]
    expected_return: String,
    #[tabled(rename = "Risk")]
    expected_risk: String,
    #[tabled(rename = "Sharpe")]
    sharpe: String,
}

/// Executes the frontier command.
pub fn execute(session: &Session, args: FrontierArgs, format: OutputFormat) -> anyhow::Result<()> {
    let report = session
        .service
        .efficient_frontier(&session.user, &session.filter, args.risk_free_rate, args.points)
        .map_err(reject)?;

    if format == OutputFormat::Json {
        return output::print_json(&report);
    }

    output::print_header(&format!("Efficient Frontier: {}", report.user_id));
    output::print_rows(&[
        KeyValue::new("Portfolio Value", report.total_value.round_dp(2).to_string()),
        KeyValue::new("Holdings", report.holdings.len().to_string()),
        KeyValue::new("Excluded Holdings", report.excluded_holdings.to_string()),
        KeyValue::from_percent("Risk-Free Rate", report.risk_free_rate),
    ]);

    output::print_header("Key Portfolios");
    let portfolios = [
        ("Current", report.current.expected_return, report.current.expected_risk, report.current.sharpe_ratio),
        ("Minimum Variance", report.minimum_variance.expected_return, report.minimum_variance.expected_risk, report.minimum_variance.sharpe_ratio),
        ("Tangency", report.tangency.expected_return, report.tangency.expected_risk, report.tangency.sharpe_ratio),
    ];
    let rows: Vec<PortfolioRow> = portfolios
        .into_iter()
        .map(|(name, ret, risk, sharpe)| PortfolioRow {
            portfolio: name,
            expected_return: percent(ret),
            expected_risk: percent(risk),
            sharpe: ratio(sharpe),
        })
        .collect();
    output::print_rows(&rows);

    output::print_header("Frontier");
    if report.frontier_collapsed {
        output::print_warning("every feasible portfolio has the same expected return");
    }
    let points: Vec<PointRow> = report
        .frontier
        .iter()
        .enumerate()
        .map(|(i, p)| PointRow {
            index: i + 1,
            expected_return: percent(p.expected_return),
            expected_risk: percent(p.expected_risk),
            sharpe: ratio(p.sharpe_ratio),
        })
        .collect();
    output::print_rows(&points);

    output::print_header("Improvement");
    let improvement = &report.improvement;
    output::print_rows(&[
        KeyValue::new("On Frontier", improvement.on_frontier.to_string()),
        KeyValue::from_percent("Additional Return at Current Risk", improvement.additional_return),
        KeyValue::from_percent("Risk Reduction at Current Return", improvement.risk_reduction),
        KeyValue::new("Sharpe Improvement", ratio(improvement.sharpe_improvement)),
        KeyValue::new(
            "Effective Bets",
            format!("{:.2}", report.diversification.effective_bets),
        ),
    ]);

    Ok(())
}

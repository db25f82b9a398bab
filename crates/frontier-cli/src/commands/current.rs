//! Current position command implementation.

use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::output::{self, percent, ratio, AllocationRow, KeyValue};

use super::{reject, Session};

#[derive(Tabled)]
struct ClassRow {
    #[tabled(rename = "Asset Class")]
    asset_class: String,
    #[tabled(rename = "Holdings")]
    count: usize,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Risk Share")]
    risk_share: String,
}

/// Executes the current command.
pub fn execute(session: &Session, format: OutputFormat) -> anyhow::Result<()> {
    let report = session
        .service
        .current_position(&session.user, &session.filter)
        .map_err(reject)?;

    if format == OutputFormat::Json {
        return output::print_json(&report);
    }

    let current = &report.current;
    output::print_header(&format!("Current Portfolio: {}", report.user_id));
    output::print_rows(&[
        KeyValue::new("Portfolio Value", report.total_value.round_dp(2).to_string()),
        KeyValue::from_percent("Expected Return", current.expected_return),
        KeyValue::from_percent("Expected Risk", current.expected_risk),
        KeyValue::new("Sharpe Ratio", ratio(current.sharpe_ratio)),
        KeyValue::new("Tangency Sharpe", ratio(report.tangency.sharpe_ratio)),
    ]);

    output::print_header("Holdings");
    let rows: Vec<AllocationRow> = current.allocations.iter().map(Into::into).collect();
    output::print_rows(&rows);

    output::print_header("By Asset Class");
    let classes: Vec<ClassRow> = current
        .by_class
        .iter()
        .map(|(class, bucket)| ClassRow {
            asset_class: class.to_string(),
            count: bucket.count,
            weight: percent(bucket.weight),
            risk_share: percent(bucket.risk_share),
        })
        .collect();
    output::print_rows(&classes);

    let improvement = &report.improvement;
    output::print_header("Improvement");
    if improvement.on_frontier {
        println!("The portfolio is on the efficient frontier.");
    } else {
        output::print_rows(&[
            KeyValue::from_percent("Additional Return at Current Risk", improvement.additional_return),
            KeyValue::from_percent("Risk Reduction at Current Return", improvement.risk_reduction),
            KeyValue::new("Sharpe Improvement", ratio(improvement.sharpe_improvement)),
        ]);
    }
    if report.excluded_holdings > 0 {
        output::print_warning(&format!(
            "{} holding(s) were excluded from the analysis",
            report.excluded_holdings
        ));
    }

    Ok(())
}

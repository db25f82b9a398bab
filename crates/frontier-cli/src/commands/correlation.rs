//! Correlation command implementation.

use crate::cli::OutputFormat;
use crate::output::{self, KeyValue};

use super::{reject, Session};

/// Executes the correlation command.
pub fn execute(session: &Session, format: OutputFormat) -> anyhow::Result<()> {
    let report = session
        .service
        .correlation_matrix(&session.user, &session.filter)
        .map_err(reject)?;

    if format == OutputFormat::Json {
        return output::print_json(&report);
    }

    output::print_header(&format!("Correlation Matrix: {}", report.user_id));
    let labels: Vec<String> = report
        .labels
        .iter()
        .map(|l| format!("{} ({})", l.holding_id, l.asset_class))
        .collect();
    output::print_matrix(&labels, &report.matrix);

    let summary = &report.summary;
    output::print_header("Summary");
    output::print_rows(&[
        KeyValue::new("Average Correlation", format!("{:.4}", summary.average)),
        KeyValue::new(
            "Most Correlated",
            format!("{} / {} ({:.2})", summary.max.first, summary.max.second, summary.max.correlation),
        ),
        KeyValue::new(
            "Least Correlated",
            format!("{} / {} ({:.2})", summary.min.first, summary.min.second, summary.min.correlation),
        ),
        KeyValue::new("Pairs", summary.pairs.to_string()),
        KeyValue::new(
            "Diversification Ratio",
            format!("{:.4}", report.diversification.diversification_ratio),
        ),
    ]);

    Ok(())
}

//! Output formatting utilities.

use colored::Colorize;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use frontier_portfolio::{HoldingContribution, OptimizationResult};

use crate::cli::OutputFormat;

/// Prints rows as a table.
pub fn print_rows<T: Tabled>(data: &[T]) {
    if data.is_empty() {
        println!("No results.");
        return;
    }

    let table = Table::new(data)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::left()))
        .to_string();

    println!("{}", table);
}

/// Prints a report as pretty JSON.
pub fn print_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Prints a square matrix with row and column labels.
pub fn print_matrix(labels: &[String], rows: &[Vec<f64>]) {
    let mut builder = Builder::default();
    builder.push_record(std::iter::once(String::new()).chain(labels.iter().cloned()));
    for (label, row) in labels.iter().zip(rows) {
        builder.push_record(
            std::iter::once(label.clone()).chain(row.iter().map(|v| format!("{v:.2}"))),
        );
    }
    println!("{}", builder.build().with(Style::rounded()));
}

/// Formats a decimal fraction as a percentage.
pub fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Formats an optional Sharpe ratio.
pub fn ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}

/// Prints a warning message.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

/// A key-value pair for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct KeyValue {
    #[tabled(rename = "Metric")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl KeyValue {
    /// Creates a new key-value pair.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a key-value pair formatted as percentage.
    pub fn from_percent(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, percent(value))
    }
}

/// One holding of an allocation.
#[derive(Debug, Clone, Tabled)]
pub struct AllocationRow {
    #[tabled(rename = "Holding")]
    pub holding: String,
    #[tabled(rename = "Asset Class")]
    pub asset_class: String,
    #[tabled(rename = "Weight")]
    pub weight: String,
    #[tabled(rename = "Risk Share")]
    pub risk_share: String,
}

impl From<&HoldingContribution> for AllocationRow {
    fn from(c: &HoldingContribution) -> Self {
        Self {
            holding: c.holding_id.to_string(),
            asset_class: c.asset_class.to_string(),
            weight: percent(c.weight),
            risk_share: percent(c.risk_share),
        }
    }
}

/// Key metrics of an optimization result.
pub fn result_summary(result: &OptimizationResult) -> Vec<KeyValue> {
    vec![
        KeyValue::new("Objective", result.objective.name()),
        KeyValue::from_percent("Expected Return", result.expected_return),
        KeyValue::from_percent("Expected Risk", result.expected_risk),
        KeyValue::new("Sharpe Ratio", ratio(result.sharpe_ratio)),
        KeyValue::new("Converged", result.converged.to_string()),
        KeyValue::new("Iterations", result.iterations.to_string()),
    ]
}

/// Prints an optimization result in the requested format.
pub fn print_result(title: &str, result: &OptimizationResult, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            print_header(title);
            print_rows(&result_summary(result));
            print_header("Allocation");
            let rows: Vec<AllocationRow> = result.allocations.iter().map(Into::into).collect();
            print_rows(&rows);
            if !result.converged {
                print_warning("solver stopped at its iteration cap; weights are the best found");
            }
            Ok(())
        }
        OutputFormat::Json => print_json(result),
    }
}

/// Prints a header for a section.
pub fn print_header(title: &str) {
    println!("\n{}", title.bold().underline());
}

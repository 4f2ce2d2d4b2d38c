//! Rendering of report outputs and raw table rows as text tables, bar charts, JSON or CSV.

use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, Client, LedgerEntry, Payable, Receivable};
use crate::report::{CategoryValue, ClientRevenue, Outcome, ReportOutput, SupplierTotal};
use crate::Result;
use anyhow::Context;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

const BAR: char = '█';

/// The output format for `report` and `list`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Aligned text tables, with bar charts for reports.
    #[default]
    Table,
    /// A pretty-printed JSON document.
    Json,
    /// Comma-separated values with a header row.
    Csv,
}

serde_plain::derive_display_from_serialize!(Format);
serde_plain::derive_fromstr_from_deserialize!(Format);

/// Text that is ready to be written to stdout.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Rendered(String);

impl Rendered {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for Rendered {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rendered({} chars)", self.0.len())
    }
}

impl Display for Rendered {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A column heading.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    name: &'static str,
    numeric: bool,
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        numeric: false,
    }
}

const fn number(name: &'static str) -> Column {
    Column {
        name,
        numeric: true,
    }
}

/// A row type that can be laid out in a table.
pub trait Tabular {
    const COLUMNS: &'static [Column];

    /// Display values for each of `COLUMNS`, in order.
    fn cells(&self) -> Vec<String>;

    /// Plain values for CSV output. Defaults to `cells`.
    fn csv_cells(&self) -> Vec<String> {
        self.cells()
    }

    /// The label and length of this row's bar in a chart, for rows that are charted.
    fn bar(&self) -> Option<(String, Amount)> {
        None
    }
}

impl Tabular for SupplierTotal {
    const COLUMNS: &'static [Column] = &[text("Supplier"), number("Total")];

    fn cells(&self) -> Vec<String> {
        vec![self.supplier().to_string(), self.total().to_string()]
    }

    fn csv_cells(&self) -> Vec<String> {
        vec![self.supplier().to_string(), self.total().plain()]
    }

    fn bar(&self) -> Option<(String, Amount)> {
        Some((self.supplier().to_string(), self.total()))
    }
}

impl Tabular for ClientRevenue {
    const COLUMNS: &'static [Column] = &[text("Client"), number("Revenue")];

    fn cells(&self) -> Vec<String> {
        vec![self.client_name().to_string(), self.revenue().to_string()]
    }

    fn csv_cells(&self) -> Vec<String> {
        vec![self.client_name().to_string(), self.revenue().plain()]
    }

    fn bar(&self) -> Option<(String, Amount)> {
        Some((self.client_name().to_string(), self.revenue()))
    }
}

impl Tabular for CategoryValue {
    const COLUMNS: &'static [Column] = &[text("Category"), number("Value")];

    fn cells(&self) -> Vec<String> {
        vec![self.category().to_string(), self.value().to_string()]
    }

    fn csv_cells(&self) -> Vec<String> {
        vec![self.category().to_string(), self.value().plain()]
    }

    fn bar(&self) -> Option<(String, Amount)> {
        Some((self.category().to_string(), self.value()))
    }
}

impl Tabular for Client {
    const COLUMNS: &'static [Column] = &[number("Id"), text("Name")];

    fn cells(&self) -> Vec<String> {
        vec![self.id().to_string(), self.name().to_string()]
    }
}

impl Tabular for Payable {
    const COLUMNS: &'static [Column] = &[
        number("Id"),
        text("Supplier"),
        number("Value"),
        text("Due Date"),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id().to_string(),
            self.supplier().to_string(),
            self.value().to_string(),
            self.due_date().unwrap_or_default().to_string(),
        ]
    }

    fn csv_cells(&self) -> Vec<String> {
        let mut cells = self.cells();
        cells[2] = self.value().plain();
        cells
    }
}

impl Tabular for Receivable {
    const COLUMNS: &'static [Column] = &[
        number("Id"),
        number("Client Id"),
        number("Value"),
        text("Status"),
        text("Due Date"),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id().to_string(),
            self.client_id().to_string(),
            self.value().to_string(),
            self.status().to_string(),
            self.due_date().unwrap_or_default().to_string(),
        ]
    }

    fn csv_cells(&self) -> Vec<String> {
        let mut cells = self.cells();
        cells[2] = self.value().plain();
        cells
    }
}

impl Tabular for LedgerEntry {
    const COLUMNS: &'static [Column] = &[
        number("Id"),
        text("Type"),
        number("Value"),
        text("Date"),
        text("Description"),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id().to_string(),
            self.kind().to_string(),
            self.value().to_string(),
            self.date().to_string(),
            self.description().unwrap_or_default().to_string(),
        ]
    }

    fn csv_cells(&self) -> Vec<String> {
        let mut cells = self.cells();
        cells[2] = self.value().plain();
        cells
    }
}

/// Renders a batch of report outputs. `chart_width` of `None` disables bar charts.
pub fn reports(
    outputs: &[ReportOutput],
    format: Format,
    chart_width: Option<usize>,
) -> Result<Rendered> {
    let rendered = match format {
        Format::Json => serde_json::to_string_pretty(outputs)
            .context("Unable to serialize reports to JSON")
            .pub_result(ErrorType::Render)?,
        Format::Table => outputs
            .iter()
            .map(|output| table_section(output, chart_width))
            .collect::<Vec<_>>()
            .join("\n"),
        Format::Csv => outputs
            .iter()
            .map(csv_section)
            .collect::<Result<Vec<_>>>()?
            .join("\n"),
    };
    Ok(Rendered(rendered))
}

/// Renders raw rows.
pub fn records<T>(rows: &[T], format: Format) -> Result<Rendered>
where
    T: Tabular + Serialize,
{
    let rendered = match format {
        Format::Json => serde_json::to_string_pretty(rows)
            .context("Unable to serialize rows to JSON")
            .pub_result(ErrorType::Render)?,
        Format::Table => table(rows),
        Format::Csv => csv(rows)?,
    };
    Ok(Rendered(rendered))
}

/// The heading shown above a report.
pub fn title(output: &ReportOutput) -> String {
    match output {
        ReportOutput::RevenueVsExpense { period, .. } => {
            format!("{} - {period}", output.report().title())
        }
        _ => output.report().title().to_string(),
    }
}

fn table_section(output: &ReportOutput, chart_width: Option<usize>) -> String {
    let heading = format!("## {}\n\n", title(output));
    let notice = output.report().empty_notice();
    let body = match output {
        ReportOutput::PayablesBySupplier { outcome } => outcome_table(outcome, notice, chart_width),
        ReportOutput::TopClients { outcome } => outcome_table(outcome, notice, chart_width),
        ReportOutput::RevenueVsExpense { outcome, .. } => {
            outcome_table(outcome, notice, chart_width)
        }
    };
    heading + &body
}

fn outcome_table<T: Tabular>(outcome: &Outcome<T>, notice: &str, chart_width: Option<usize>) -> String {
    match outcome {
        Outcome::Empty => format!("{notice}\n"),
        Outcome::Rows(rows) => {
            let mut s = table(rows);
            if let Some(width) = chart_width {
                let bars: Vec<(String, Amount)> = rows.iter().filter_map(Tabular::bar).collect();
                if !bars.is_empty() {
                    s.push('\n');
                    s.push_str(&bar_chart(&bars, width));
                }
            }
            s
        }
    }
}

fn csv_section(output: &ReportOutput) -> Result<String> {
    match output {
        ReportOutput::PayablesBySupplier { outcome } => csv(outcome.rows()),
        ReportOutput::TopClients { outcome } => csv(outcome.rows()),
        ReportOutput::RevenueVsExpense { outcome, .. } => csv(outcome.rows()),
    }
}

/// Lays out `rows` as a markdown table. Numeric columns are right-aligned.
fn table<T: Tabular>(rows: &[T]) -> String {
    let columns = T::COLUMNS;
    let cells: Vec<Vec<String>> = rows.iter().map(Tabular::cells).collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(ix, column)| {
            cells
                .iter()
                .filter_map(|row| row.get(ix))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(column.name.chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let line = |values: Vec<String>| -> String {
        let padded: Vec<String> = columns
            .iter()
            .zip(&widths)
            .zip(values)
            .map(|((column, width), value)| {
                if column.numeric {
                    format!("{value:>width$}")
                } else {
                    format!("{value:<width$}")
                }
            })
            .collect();
        format!("| {} |\n", padded.join(" | "))
    };

    let mut s = line(columns.iter().map(|c| c.name.to_string()).collect());
    let rule: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(column, width)| {
            let dashes = "-".repeat(*width);
            if column.numeric {
                format!("{dashes}:")
            } else {
                format!("{dashes}-")
            }
        })
        .collect();
    s.push_str(&format!("|-{}|\n", rule.join("|-")));
    for row in cells {
        s.push_str(&line(row));
    }
    s
}

/// Draws one horizontal bar per entry, scaled so that the largest value spans `width`
/// characters. Zero and negative values get no bar.
fn bar_chart(bars: &[(String, Amount)], width: usize) -> String {
    let label_width = bars
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or_default();
    let max = bars
        .iter()
        .map(|(_, amount)| amount.value())
        .max()
        .unwrap_or_default();

    let mut s = String::new();
    for (label, amount) in bars {
        let length = bar_length(amount.value(), max, width);
        let bar: String = std::iter::repeat(BAR).take(length).collect();
        let line = format!("{label:<label_width$} {bar} {amount}");
        s.push_str(line.trim_end());
        s.push('\n');
    }
    s
}

fn bar_length(value: Decimal, max: Decimal, width: usize) -> usize {
    if max <= Decimal::ZERO || value <= Decimal::ZERO {
        return 0;
    }
    value
        .checked_div(max)
        .and_then(|ratio| ratio.checked_mul(Decimal::from(width)))
        .and_then(|length| length.round().to_usize())
        .unwrap_or_default()
}

fn csv<T: Tabular>(rows: &[T]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(T::COLUMNS.iter().map(|c| c.name))
        .context("Unable to write CSV header")
        .pub_result(ErrorType::Render)?;
    for row in rows {
        writer
            .write_record(row.csv_cells())
            .context("Unable to write CSV row")
            .pub_result(ErrorType::Render)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish CSV output: {}", e.error()))
        .pub_result(ErrorType::Render)?;
    String::from_utf8(bytes)
        .context("CSV output is not valid UTF-8")
        .pub_result(ErrorType::Render)
}

//! The aggregation engine.
//!
//! Three reports are computed from the rows of a `LedgerStore`:
//! - payables grouped by supplier,
//! - the five clients with the most received revenue,
//! - revenue against expense for one calendar month.
//!
//! Each report yields an `Outcome`, which is either a list of rows or `Empty`. `Empty` means that
//! no row qualified for the report. It is not an error, and it is not the same as a report whose
//! sums happen to be zero.

mod rows;

use crate::config::Labels;
use crate::error::{ErrorType, IntoResult};
use crate::db::Db;
use crate::model::{Amount, ClientReceipt, LedgerEntry, Payable, Period};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::warn;

pub use rows::{Category, CategoryValue, ClientRevenue, SupplierTotal};

/// The maximum number of clients in the top clients report.
pub const TOP_CLIENTS: usize = 5;

/// The read operations the engine needs from the ledger store.
#[async_trait::async_trait]
pub trait LedgerStore: Send {
    /// All payables.
    async fn payables(&mut self) -> Result<Vec<Payable>>;

    /// Receivables with the given `status`, joined with their client. Receivables that reference
    /// a missing client are not returned.
    async fn receipts(&mut self, status: &str) -> Result<Vec<ClientReceipt>>;

    /// Ledger entries dated within `period`.
    async fn ledger_entries(&mut self, period: &Period) -> Result<Vec<LedgerEntry>>;
}

/// The reports that can be requested.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Report {
    /// Total owed to each supplier.
    PayablesBySupplier,
    /// The five clients with the highest received revenue.
    TopClients,
    /// Revenue and expense booked in one month.
    RevenueVsExpense,
}

serde_plain::derive_display_from_serialize!(Report);

impl Report {
    /// Every report, in the order they are presented.
    pub const ALL: [Report; 3] = [
        Report::PayablesBySupplier,
        Report::TopClients,
        Report::RevenueVsExpense,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Report::PayablesBySupplier => "Payables by Supplier",
            Report::TopClients => "Top 5 Clients by Revenue",
            Report::RevenueVsExpense => "Revenue vs Expense",
        }
    }

    /// The message shown in place of a report that has no qualifying rows.
    pub fn empty_notice(&self) -> &'static str {
        match self {
            Report::PayablesBySupplier => "No payables registered.",
            Report::TopClients => "No received revenue registered.",
            Report::RevenueVsExpense => "No financial movement recorded for this month.",
        }
    }
}

/// Either the rows of a report or the explicit marker that nothing qualified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "rows", rename_all = "snake_case")]
pub enum Outcome<T> {
    Empty,
    Rows(Vec<T>),
}

impl<T> Outcome<T> {
    /// `Empty` when `rows` is empty.
    pub fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            Outcome::Empty
        } else {
            Outcome::Rows(rows)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }

    pub fn rows(&self) -> &[T] {
        match self {
            Outcome::Empty => &[],
            Outcome::Rows(rows) => rows,
        }
    }
}

/// The computed result of one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum ReportOutput {
    PayablesBySupplier {
        outcome: Outcome<SupplierTotal>,
    },
    TopClients {
        outcome: Outcome<ClientRevenue>,
    },
    RevenueVsExpense {
        period: Period,
        outcome: Outcome<CategoryValue>,
    },
}

impl ReportOutput {
    pub fn report(&self) -> Report {
        match self {
            ReportOutput::PayablesBySupplier { .. } => Report::PayablesBySupplier,
            ReportOutput::TopClients { .. } => Report::TopClients,
            ReportOutput::RevenueVsExpense { .. } => Report::RevenueVsExpense,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ReportOutput::PayablesBySupplier { outcome } => outcome.is_empty(),
            ReportOutput::TopClients { outcome } => outcome.is_empty(),
            ReportOutput::RevenueVsExpense { outcome, .. } => outcome.is_empty(),
        }
    }
}

/// Computes `reports` in order against the database at `db`.
///
/// A single read-only session is opened before the first report and closed after the last one,
/// whether the batch succeeds or fails. The first failing report aborts the batch.
pub(crate) async fn run(
    db: &Db,
    reports: &[Report],
    period: Period,
    labels: &Labels,
) -> Result<Vec<ReportOutput>> {
    let mut session = db.session().await?;
    let outcome = compute_all(&mut session, reports, period, labels).await;
    let closed = session.close().await;
    match (outcome, closed) {
        (Ok(outputs), Ok(())) => Ok(outputs),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!("Unable to close the ledger store session: {close_err:#}");
            Err(e)
        }
    }
}

/// Computes each of `reports` against `store`, in order.
pub async fn compute_all<S>(
    store: &mut S,
    reports: &[Report],
    period: Period,
    labels: &Labels,
) -> Result<Vec<ReportOutput>>
where
    S: LedgerStore + ?Sized,
{
    let mut outputs = Vec::with_capacity(reports.len());
    for report in reports {
        let output = compute(store, *report, period, labels)
            .await
            .with_context(|| format!("Unable to compute the {} report", report.title()))?;
        outputs.push(output);
    }
    Ok(outputs)
}

/// Computes one report against `store`. `period` is only used by `Report::RevenueVsExpense`.
pub async fn compute<S>(
    store: &mut S,
    report: Report,
    period: Period,
    labels: &Labels,
) -> Result<ReportOutput>
where
    S: LedgerStore + ?Sized,
{
    Ok(match report {
        Report::PayablesBySupplier => {
            let payables = store.payables().await?;
            ReportOutput::PayablesBySupplier {
                outcome: payables_by_supplier(&payables)?,
            }
        }
        Report::TopClients => {
            let receipts = store.receipts(labels.received_status()).await?;
            ReportOutput::TopClients {
                outcome: top_clients_by_revenue(&receipts)?,
            }
        }
        Report::RevenueVsExpense => {
            let entries = store.ledger_entries(&period).await?;
            ReportOutput::RevenueVsExpense {
                period,
                outcome: revenue_vs_expense(&entries, labels)?,
            }
        }
    })
}

/// Groups payables by supplier and sums their values.
///
/// Rows are ordered by total, largest first, then by supplier name. The outcome is `Empty` only
/// when there are no payables at all.
pub fn payables_by_supplier(payables: &[Payable]) -> Result<Outcome<SupplierTotal>> {
    let mut totals: BTreeMap<&str, Amount> = BTreeMap::new();
    for payable in payables {
        accumulate(totals.entry(payable.supplier()).or_default(), payable.value())?;
    }

    let mut rows: Vec<SupplierTotal> = totals
        .into_iter()
        .map(|(supplier, total)| SupplierTotal::new(supplier, total))
        .collect();
    rows.sort_by(|a, b| {
        descending(a.total(), b.total()).then_with(|| a.supplier().cmp(b.supplier()))
    });
    Ok(Outcome::from_rows(rows))
}

/// Sums received revenue per client and keeps the `TOP_CLIENTS` largest.
///
/// `receipts` must already be restricted to received receivables. Ties are broken by client id,
/// lowest first, so the cut-off at the last place is deterministic.
pub fn top_clients_by_revenue(receipts: &[ClientReceipt]) -> Result<Outcome<ClientRevenue>> {
    let mut revenue: BTreeMap<i64, (&str, Amount)> = BTreeMap::new();
    for receipt in receipts {
        let (_, sum) = revenue
            .entry(receipt.client_id())
            .or_insert((receipt.client_name(), Amount::ZERO));
        accumulate(sum, receipt.value())?;
    }

    let mut ranked: Vec<(i64, &str, Amount)> = revenue
        .into_iter()
        .map(|(id, (name, sum))| (id, name, sum))
        .collect();
    ranked.sort_by(|a, b| descending(a.2, b.2).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(TOP_CLIENTS);

    Ok(Outcome::from_rows(
        ranked
            .into_iter()
            .map(|(_, name, sum)| ClientRevenue::new(name, sum))
            .collect(),
    ))
}

/// Sums revenue and expense entries and reshapes them into one row per category.
///
/// `entries` must already be restricted to the reporting period. Entries whose type is neither
/// the revenue nor the expense label are ignored. The outcome is `Empty` when both sums are zero;
/// otherwise it always has a `Revenue` row followed by an `Expense` row, even if one is zero.
pub fn revenue_vs_expense(
    entries: &[LedgerEntry],
    labels: &Labels,
) -> Result<Outcome<CategoryValue>> {
    let mut revenue = Amount::ZERO;
    let mut expense = Amount::ZERO;
    for entry in entries {
        if entry.kind() == labels.revenue_type() {
            accumulate(&mut revenue, entry.value())?;
        } else if entry.kind() == labels.expense_type() {
            accumulate(&mut expense, entry.value())?;
        }
    }

    if revenue.is_zero() && expense.is_zero() {
        return Ok(Outcome::Empty);
    }
    Ok(Outcome::Rows(vec![
        CategoryValue::new(Category::Revenue, revenue),
        CategoryValue::new(Category::Expense, expense),
    ]))
}

/// Adds `value` to `sum`. Stored values large enough to overflow a `Decimal` make the rows
/// unusable for reporting.
fn accumulate(sum: &mut Amount, value: Amount) -> Result<()> {
    let total = sum
        .checked_add(value)
        .ok_or_else(|| anyhow::anyhow!("The sum of {sum} and {value} is out of range"))
        .pub_result(ErrorType::MalformedQuery)?;
    *sum = total;
    Ok(())
}

fn descending(a: Amount, b: Amount) -> Ordering {
    b.cmp(&a)
}

#[cfg(test)]
mod tests;

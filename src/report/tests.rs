use super::*;
use crate::error::{error_type, ErrorType, IntoResult};
use crate::test::TestEnv;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// An in-memory store that applies the same filters as the SQLite session.
#[derive(Default)]
struct FakeStore {
    payables: Vec<Payable>,
    receivables: Vec<(ClientReceipt, &'static str)>,
    entries: Vec<LedgerEntry>,
    unavailable: bool,
    calls: usize,
}

impl FakeStore {
    fn check(&mut self) -> Result<()> {
        self.calls += 1;
        if self.unavailable {
            return Err(anyhow::anyhow!("unable to open database file"))
                .pub_result(ErrorType::StoreUnavailable);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl LedgerStore for FakeStore {
    async fn payables(&mut self) -> Result<Vec<Payable>> {
        self.check()?;
        Ok(self.payables.clone())
    }

    async fn receipts(&mut self, status: &str) -> Result<Vec<ClientReceipt>> {
        self.check()?;
        Ok(self
            .receivables
            .iter()
            .filter(|(_, s)| *s == status)
            .map(|(r, _)| r.clone())
            .collect())
    }

    async fn ledger_entries(&mut self, period: &Period) -> Result<Vec<LedgerEntry>> {
        self.check()?;
        Ok(self
            .entries
            .iter()
            .filter(|e| {
                NaiveDate::parse_from_str(&e.date()[..10], "%Y-%m-%d")
                    .map(|d| period.contains(d))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}

fn labels() -> Labels {
    Labels::default()
}

fn october() -> Period {
    Period::from_str("2026-10").unwrap()
}

fn amount(s: &str) -> Amount {
    Amount::from_str(s).unwrap()
}

#[test]
fn test_payables_grouped_and_sorted() {
    let payables = vec![
        Payable::new(1, "Acme", 100),
        Payable::new(2, "Acme", 50),
        Payable::new(3, "Zenith", 30),
    ];
    let outcome = payables_by_supplier(&payables).unwrap();
    assert_eq!(
        outcome,
        Outcome::Rows(vec![
            SupplierTotal::new("Acme", 150),
            SupplierTotal::new("Zenith", 30),
        ])
    );
}

#[test]
fn test_payables_sorted_by_total_not_name() {
    let payables = vec![
        Payable::new(1, "Alpha", 10),
        Payable::new(2, "Beta", 500),
        Payable::new(3, "Gamma", 75),
    ];
    let suppliers: Vec<String> = payables_by_supplier(&payables)
        .unwrap()
        .rows()
        .iter()
        .map(|r| r.supplier().to_string())
        .collect();
    assert_eq!(suppliers, vec!["Beta", "Gamma", "Alpha"]);
}

#[test]
fn test_payables_equal_totals_ordered_by_supplier() {
    let payables = vec![Payable::new(1, "Zenith", 40), Payable::new(2, "Acme", 40)];
    let rows = payables_by_supplier(&payables).unwrap();
    assert_eq!(rows.rows()[0].supplier(), "Acme");
    assert_eq!(rows.rows()[1].supplier(), "Zenith");
}

#[test]
fn test_payables_totals_preserve_grand_total() {
    let payables = vec![
        Payable::new(1, "Acme", amount("10.10")),
        Payable::new(2, "Beta", amount("0.20")),
        Payable::new(3, "Acme", amount("5.05")),
        Payable::new(4, "Coral", amount("99.99")),
        Payable::new(5, "Beta", amount("0.01")),
    ];
    let outcome = payables_by_supplier(&payables).unwrap();
    let bucketed: Decimal = outcome.rows().iter().map(|r| r.total().value()).sum();
    let raw: Decimal = payables.iter().map(|p| p.value().value()).sum();
    assert_eq!(bucketed, raw);
    assert_eq!(outcome.rows().len(), 3);
}

#[test]
fn test_payables_total_out_of_range_is_malformed() {
    let payables = vec![
        Payable::new(1, "Acme", amount("5.0e+28")),
        Payable::new(2, "Acme", amount("5.0e+28")),
    ];
    let err = payables_by_supplier(&payables).unwrap_err();
    assert_eq!(error_type(&err), Some(ErrorType::MalformedQuery));
    assert!(err.to_string().contains("out of range"));
}

#[test]
fn test_top_clients_revenue_out_of_range_is_malformed() {
    let receipts = vec![
        ClientReceipt::new(1, "Ana", amount("5.0e+28")),
        ClientReceipt::new(1, "Ana", amount("5.0e+28")),
    ];
    let err = top_clients_by_revenue(&receipts).unwrap_err();
    assert_eq!(error_type(&err), Some(ErrorType::MalformedQuery));
}

#[test]
fn test_revenue_out_of_range_is_malformed() {
    let entries = vec![
        LedgerEntry::new(1, "Revenue", amount("5.0e+28"), "2026-10-01"),
        LedgerEntry::new(2, "Revenue", amount("5.0e+28"), "2026-10-02"),
    ];
    let err = revenue_vs_expense(&entries, &labels()).unwrap_err();
    assert_eq!(error_type(&err), Some(ErrorType::MalformedQuery));
}

#[test]
fn test_no_payables_is_empty() {
    assert_eq!(payables_by_supplier(&[]).unwrap(), Outcome::Empty);
}

#[test]
fn test_zero_valued_payables_are_not_empty() {
    let outcome = payables_by_supplier(&[Payable::new(1, "Acme", 0)]).unwrap();
    assert_eq!(outcome, Outcome::Rows(vec![SupplierTotal::new("Acme", 0)]));
}

#[test]
fn test_top_clients_keeps_five() {
    let receipts: Vec<ClientReceipt> = [500, 400, 300, 200, 100, 50]
        .into_iter()
        .enumerate()
        .map(|(ix, value)| ClientReceipt::new(ix as i64 + 1, format!("Client {}", ix + 1), value))
        .collect();
    let outcome = top_clients_by_revenue(&receipts).unwrap();
    let revenue: Vec<Amount> = outcome.rows().iter().map(ClientRevenue::revenue).collect();
    assert_eq!(
        revenue,
        [500, 400, 300, 200, 100]
            .into_iter()
            .map(Amount::from)
            .collect::<Vec<_>>()
    );
    assert!(outcome.rows().iter().all(|r| r.client_name() != "Client 6"));
}

#[test]
fn test_top_clients_sums_per_client() {
    let receipts = vec![
        ClientReceipt::new(1, "Ana", 100),
        ClientReceipt::new(2, "Bruno", 150),
        ClientReceipt::new(1, "Ana", 80),
    ];
    let outcome = top_clients_by_revenue(&receipts).unwrap();
    assert_eq!(
        outcome,
        Outcome::Rows(vec![
            ClientRevenue::new("Ana", 180),
            ClientRevenue::new("Bruno", 150),
        ])
    );
}

#[test]
fn test_top_clients_same_name_different_ids_stay_apart() {
    let receipts = vec![
        ClientReceipt::new(1, "Silva", 100),
        ClientReceipt::new(2, "Silva", 100),
    ];
    assert_eq!(top_clients_by_revenue(&receipts).unwrap().rows().len(), 2);
}

#[test]
fn test_top_clients_tie_at_cutoff_prefers_lower_id() {
    // Clients 6 and 9 tie for fifth place; 6 wins regardless of input order.
    let receipts = vec![
        ClientReceipt::new(9, "Ivo", 100),
        ClientReceipt::new(1, "A", 900),
        ClientReceipt::new(2, "B", 800),
        ClientReceipt::new(3, "C", 700),
        ClientReceipt::new(4, "D", 600),
        ClientReceipt::new(6, "Fia", 100),
    ];
    let outcome = top_clients_by_revenue(&receipts).unwrap();
    assert_eq!(outcome.rows().len(), TOP_CLIENTS);
    assert_eq!(outcome.rows()[4].client_name(), "Fia");
}

#[test]
fn test_no_receipts_is_empty() {
    assert_eq!(top_clients_by_revenue(&[]).unwrap(), Outcome::Empty);
}

#[test]
fn test_revenue_vs_expense_both_zero_is_empty() {
    let entries = vec![
        LedgerEntry::new(1, "Revenue", 0, "2026-10-02"),
        LedgerEntry::new(2, "Expense", 0, "2026-10-03"),
    ];
    assert_eq!(revenue_vs_expense(&entries, &labels()).unwrap(), Outcome::Empty);
    assert_eq!(revenue_vs_expense(&[], &labels()).unwrap(), Outcome::Empty);
}

#[test]
fn test_revenue_vs_expense_zero_revenue_still_reported() {
    let entries = vec![LedgerEntry::new(1, "Expense", 120, "2026-10-05")];
    assert_eq!(
        revenue_vs_expense(&entries, &labels()).unwrap(),
        Outcome::Rows(vec![
            CategoryValue::new(Category::Revenue, 0),
            CategoryValue::new(Category::Expense, 120),
        ])
    );
}

#[test]
fn test_revenue_vs_expense_ignores_unknown_types() {
    let entries = vec![
        LedgerEntry::new(1, "Revenue", 300, "2026-10-05"),
        LedgerEntry::new(2, "Transfer", 999, "2026-10-06"),
        LedgerEntry::new(3, "Expense", amount("20.5"), "2026-10-07"),
        LedgerEntry::new(4, "Expense", amount("4.5"), "2026-10-08"),
    ];
    let outcome = revenue_vs_expense(&entries, &labels()).unwrap();
    assert_eq!(
        outcome.rows(),
        &[
            CategoryValue::new(Category::Revenue, 300),
            CategoryValue::new(Category::Expense, 25),
        ]
    );
}

#[test]
fn test_revenue_vs_expense_custom_labels() {
    let labels = Labels::new("Recebido", "Receita", "Despesa");
    let entries = vec![
        LedgerEntry::new(1, "Receita", 10, "2026-10-05"),
        LedgerEntry::new(2, "Revenue", 99, "2026-10-05"),
    ];
    assert_eq!(
        revenue_vs_expense(&entries, &labels).unwrap().rows()[0],
        CategoryValue::new(Category::Revenue, 10)
    );
}

#[tokio::test]
async fn test_compute_top_clients_ignores_other_statuses() {
    let mut store = FakeStore {
        receivables: vec![
            (ClientReceipt::new(1, "Ana", 100), "Received"),
            (ClientReceipt::new(2, "Bruno", 5000), "Pending"),
            (ClientReceipt::new(3, "Caio", 7000), "Overdue"),
        ],
        ..Default::default()
    };
    let output = compute(&mut store, Report::TopClients, october(), &labels())
        .await
        .unwrap();
    assert_eq!(
        output,
        ReportOutput::TopClients {
            outcome: Outcome::Rows(vec![ClientRevenue::new("Ana", 100)]),
        }
    );
}

#[tokio::test]
async fn test_compute_only_pending_is_empty() {
    let mut store = FakeStore {
        receivables: vec![(ClientReceipt::new(2, "Bruno", 5000), "Pending")],
        ..Default::default()
    };
    let output = compute(&mut store, Report::TopClients, october(), &labels())
        .await
        .unwrap();
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_compute_revenue_vs_expense_uses_period() {
    let mut store = FakeStore {
        entries: vec![
            LedgerEntry::new(1, "Revenue", 1000, "2026-09-30"),
            LedgerEntry::new(2, "Revenue", 200, "2026-10-15"),
            LedgerEntry::new(3, "Expense", 80, "2026-10-31"),
            LedgerEntry::new(4, "Expense", 3000, "2026-11-01"),
        ],
        ..Default::default()
    };
    let output = compute(&mut store, Report::RevenueVsExpense, october(), &labels())
        .await
        .unwrap();
    assert_eq!(
        output,
        ReportOutput::RevenueVsExpense {
            period: october(),
            outcome: Outcome::Rows(vec![
                CategoryValue::new(Category::Revenue, 200),
                CategoryValue::new(Category::Expense, 80),
            ]),
        }
    );
}

#[tokio::test]
async fn test_compute_only_adjacent_months_is_empty() {
    let mut store = FakeStore {
        entries: vec![
            LedgerEntry::new(1, "Revenue", 1000, "2026-09-30"),
            LedgerEntry::new(2, "Expense", 3000, "2026-11-01"),
        ],
        ..Default::default()
    };
    let output = compute(&mut store, Report::RevenueVsExpense, october(), &labels())
        .await
        .unwrap();
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_compute_all_in_order_and_idempotent() {
    let mut store = FakeStore {
        payables: vec![Payable::new(1, "Acme", 10)],
        ..Default::default()
    };
    let first = compute_all(&mut store, &Report::ALL, october(), &labels())
        .await
        .unwrap();
    let second = compute_all(&mut store, &Report::ALL, october(), &labels())
        .await
        .unwrap();
    assert_eq!(first, second);
    let reports: Vec<Report> = first.iter().map(ReportOutput::report).collect();
    assert_eq!(reports, Report::ALL.to_vec());
    assert!(!first[0].is_empty());
    assert!(first[1].is_empty());
    assert!(first[2].is_empty());
}

#[tokio::test]
async fn test_compute_all_stops_at_store_failure() {
    let mut store = FakeStore {
        unavailable: true,
        ..Default::default()
    };
    let err = compute_all(&mut store, &Report::ALL, october(), &labels())
        .await
        .unwrap_err();
    assert_eq!(error_type(&err), Some(ErrorType::StoreUnavailable));
    assert_eq!(store.calls, 1);
}

#[tokio::test]
async fn test_run_releases_session_when_a_later_report_fails() {
    let env = TestEnv::new().await;
    env.insert_payable("Acme", "100").await;
    env.execute_sql("DROP TABLE receivables").await;
    let config = env.config();

    let err = run(config.db(), &Report::ALL, october(), config.labels())
        .await
        .unwrap_err();
    assert_eq!(error_type(&err), Some(ErrorType::MalformedQuery));

    // The file can be written to and read again.
    env.execute_sql("DROP TABLE ledger_entries").await;
    let outputs = run(
        config.db(),
        &[Report::PayablesBySupplier],
        october(),
        config.labels(),
    )
    .await
    .unwrap();
    assert_eq!(
        outputs,
        vec![ReportOutput::PayablesBySupplier {
            outcome: Outcome::Rows(vec![SupplierTotal::new("Acme", 100)]),
        }]
    );
}

#[test]
fn test_output_serializes_with_tags() {
    let output = ReportOutput::RevenueVsExpense {
        period: october(),
        outcome: Outcome::Empty,
    };
    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "report": "revenue_vs_expense",
            "period": "2026-10",
            "outcome": { "status": "empty" }
        })
    );
}

#[test]
fn test_report_names() {
    assert_eq!(Report::TopClients.to_string(), "top_clients");
    assert_eq!(
        Report::RevenueVsExpense.empty_notice(),
        "No financial movement recorded for this month."
    );
}

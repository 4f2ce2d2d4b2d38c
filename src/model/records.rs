//! Rows read from the ledger store.

use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// A row from the `clients` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub(crate) id: i64,
    pub(crate) name: String,
}

impl Client {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A row from the `payables` table: an amount owed to a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payable {
    pub(crate) id: i64,
    pub(crate) supplier: String,
    pub(crate) value: Amount,
    pub(crate) due_date: Option<String>,
}

impl Payable {
    pub fn new(id: i64, supplier: impl Into<String>, value: impl Into<Amount>) -> Self {
        Self {
            id,
            supplier: supplier.into(),
            value: value.into(),
            due_date: None,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    pub fn due_date(&self) -> Option<&str> {
        self.due_date.as_deref()
    }
}

/// A row from the `receivables` table: an amount owed by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receivable {
    pub(crate) id: i64,
    pub(crate) client_id: i64,
    pub(crate) value: Amount,
    pub(crate) status: String,
    pub(crate) due_date: Option<String>,
}

impl Receivable {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn client_id(&self) -> i64 {
        self.client_id
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn due_date(&self) -> Option<&str> {
        self.due_date.as_deref()
    }
}

/// A receivable joined with the name of the client that owes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientReceipt {
    pub(crate) client_id: i64,
    pub(crate) client_name: String,
    pub(crate) value: Amount,
}

impl ClientReceipt {
    pub fn new(client_id: i64, client_name: impl Into<String>, value: impl Into<Amount>) -> Self {
        Self {
            client_id,
            client_name: client_name.into(),
            value: value.into(),
        }
    }

    pub fn client_id(&self) -> i64 {
        self.client_id
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn value(&self) -> Amount {
        self.value
    }
}

/// A row from the `ledger_entries` table: a dated revenue or expense movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub(crate) id: i64,
    #[serde(rename = "type")]
    pub(crate) kind: String,
    pub(crate) value: Amount,
    pub(crate) date: String,
    pub(crate) description: Option<String>,
}

impl LedgerEntry {
    pub fn new(
        id: i64,
        kind: impl Into<String>,
        value: impl Into<Amount>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind: kind.into(),
            value: value.into(),
            date: date.into(),
            description: None,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// The entry type as stored, e.g. `Revenue` or `Expense`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

//! The row types produced by the reports.

use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// One supplier and the total owed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierTotal {
    supplier: String,
    total: Amount,
}

impl SupplierTotal {
    pub fn new(supplier: impl Into<String>, total: impl Into<Amount>) -> Self {
        Self {
            supplier: supplier.into(),
            total: total.into(),
        }
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn total(&self) -> Amount {
        self.total
    }
}

/// One client and the revenue received from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRevenue {
    client_name: String,
    revenue: Amount,
}

impl ClientRevenue {
    pub fn new(client_name: impl Into<String>, revenue: impl Into<Amount>) -> Self {
        Self {
            client_name: client_name.into(),
            revenue: revenue.into(),
        }
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn revenue(&self) -> Amount {
        self.revenue
    }
}

/// The two sides of the monthly comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Revenue,
    Expense,
}

serde_plain::derive_display_from_serialize!(Category);

/// The summed value of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryValue {
    category: Category,
    value: Amount,
}

impl CategoryValue {
    pub fn new(category: Category, value: impl Into<Amount>) -> Self {
        Self {
            category,
            value: value.into(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn value(&self) -> Amount {
        self.value
    }
}

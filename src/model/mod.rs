//! Types that represent the data model: stored rows, monetary amounts and reporting periods.
mod amount;
mod period;
mod records;

pub use amount::{Amount, AmountError};
pub use period::Period;
pub use records::{Client, ClientReceipt, LedgerEntry, Payable, Receivable};

//! Financial reports over a small ERP ledger: payables by supplier, top clients by received
//! revenue, and monthly revenue against expense.

pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
pub mod model;
pub mod render;
pub mod report;
#[cfg(test)]
mod test;
mod utils;

pub use config::{Config, Labels};
pub use error::{error_type, Error, ErrorType, Result};

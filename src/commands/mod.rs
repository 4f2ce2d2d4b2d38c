//! Command handlers for the erp CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod init;
mod list;
mod report;

use std::fmt::{Debug, Display};
use tracing::info;

pub use init::init;
pub use list::list;
pub use report::report;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, rendered output for stdout.
#[derive(Debug, Clone)]
pub struct Out<T>
where
    T: Display + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any output that needs to be written to stdout.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Display + Clone + Debug,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Display + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the output stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the structure (if it exists) to stdout and the message to `info!`.
    pub fn print(&self) {
        if let Some(structure) = self.structure() {
            print!("{structure}");
        }
        info!("{}", self.message);
    }
}

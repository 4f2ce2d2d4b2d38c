//! Error handling for the crate.
//!
//! All fallible functions return `anyhow::Error`. Errors that cross the public boundary carry an
//! `ErrorType` as typed context so that callers can tell a store outage from a broken query or a
//! bad configuration without parsing messages.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The home directory or configuration file is missing or invalid.
    Config,
    /// The ledger store could not be opened, read or closed.
    StoreUnavailable,
    /// A query was rejected by the store or returned rows that could not be decoded.
    MalformedQuery,
    /// Report output could not be produced in the requested format.
    Render,
}

impl Display for ErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorType::Config => "Configuration error",
            ErrorType::StoreUnavailable => "Ledger store unavailable",
            ErrorType::MalformedQuery => "Malformed ledger query",
            ErrorType::Render => "Unable to render output",
        };
        f.write_str(s)
    }
}

/// Attaches an `ErrorType` to the error side of a `Result`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(Into::<Error>::into).context(error_type)
    }
}

/// Returns the `ErrorType` attached to `error`, if any.
pub fn error_type(error: &Error) -> Option<ErrorType> {
    error.downcast_ref::<ErrorType>().copied()
}

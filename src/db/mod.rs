//! This module is responsible for opening, initializing and reading the SQLite ledger store.
//!
//! `Db` only knows where the database file is. Reads happen through a `Session`, which owns one
//! read-only connection for the duration of a batch of reports and must be closed afterwards.

mod migrations;

use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, Client, ClientReceipt, LedgerEntry, Payable, Period, Receivable};
use crate::report::LedgerStore;
use crate::{Error, Result};
use anyhow::{bail, Context};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection, SqliteConnection};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, trace};

/// SQLite's generic error code, returned for syntax errors and unknown tables or columns.
const SQLITE_ERROR: &str = "1";

#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct Db {
    path: PathBuf,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database already exists at '{}'", path.display());
        }
        let mut conn = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .connect()
            .await
            .with_context(|| format!("Unable to create the database at '{}'", path.display()))?;
        migrations::bootstrap(&mut conn).await?;
        migrations::run(&mut conn, 0, migrations::CURRENT_VERSION).await?;
        close(conn).await?;
        debug!("Initialized database at {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Migrates the schema if it is older than this program's schema version
    /// - Rejects databases written by a newer version of this program, and databases that have no
    ///   `schema_version` table
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The database file is missing '{}'", path.display());
        }
        let mut conn = SqliteConnectOptions::new()
            .filename(path)
            .connect()
            .await
            .with_context(|| format!("Unable to open the database at '{}'", path.display()))?;
        let version = migrations::schema_version(&mut conn).await?;
        let outcome = match version {
            None => Err(anyhow::anyhow!(
                "The database at '{}' has no schema_version table, was it created with 'erp init'?",
                path.display()
            )),
            Some(v) if v > migrations::CURRENT_VERSION => Err(anyhow::anyhow!(
                "The database schema version {v} is newer than the supported version {}",
                migrations::CURRENT_VERSION
            )),
            Some(v) => migrations::run(&mut conn, v, migrations::CURRENT_VERSION).await,
        };
        close(conn).await?;
        outcome?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a read-only connection to the store. The caller owns the session and is expected to
    /// `close` it once its reads are done.
    pub(crate) async fn session(&self) -> Result<Session> {
        trace!("Opening read-only session on {}", self.path.display());
        let conn = SqliteConnectOptions::new()
            .filename(&self.path)
            .read_only(true)
            .connect()
            .await
            .with_context(|| format!("Unable to open '{}' for reading", self.path.display()))
            .pub_result(ErrorType::StoreUnavailable)?;
        Ok(Session { conn })
    }
}

/// One read-only connection to the ledger store.
#[derive(Debug)]
pub(crate) struct Session {
    conn: SqliteConnection,
}

impl Session {
    /// Closes the underlying connection.
    pub(crate) async fn close(self) -> Result<()> {
        trace!("Closing read-only session");
        close(self.conn).await.pub_result(ErrorType::StoreUnavailable)
    }

    pub(crate) async fn clients(&mut self) -> Result<Vec<Client>> {
        let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM clients ORDER BY id")
            .fetch_all(&mut self.conn)
            .await
            .map_err(store_error)
            .context("Failed to read clients")?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| Client { id, name })
            .collect())
    }

    pub(crate) async fn receivables(&mut self) -> Result<Vec<Receivable>> {
        let rows: Vec<(i64, i64, String, String, Option<String>)> = sqlx::query_as(
            "SELECT id, client_id, COALESCE(CAST(value AS TEXT), ''), status, due_date \
             FROM receivables ORDER BY id",
        )
        .fetch_all(&mut self.conn)
        .await
        .map_err(store_error)
        .context("Failed to read receivables")?;
        rows.into_iter()
            .map(|(id, client_id, value, status, due_date)| {
                Ok(Receivable {
                    id,
                    client_id,
                    value: amount(&value)?,
                    status,
                    due_date,
                })
            })
            .collect()
    }

    pub(crate) async fn all_ledger_entries(&mut self) -> Result<Vec<LedgerEntry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(
            "SELECT id, type, COALESCE(CAST(value AS TEXT), ''), date, description \
             FROM ledger_entries ORDER BY date, id",
        )
        .fetch_all(&mut self.conn)
        .await
        .map_err(store_error)
        .context("Failed to read ledger entries")?;
        rows.into_iter().map(entry).collect()
    }
}

type EntryRow = (i64, String, String, String, Option<String>);

#[async_trait::async_trait]
impl LedgerStore for Session {
    async fn payables(&mut self) -> Result<Vec<Payable>> {
        trace!("payables");
        let rows: Vec<(i64, String, String, Option<String>)> = sqlx::query_as(
            "SELECT id, supplier, COALESCE(CAST(value AS TEXT), ''), due_date \
             FROM payables ORDER BY id",
        )
        .fetch_all(&mut self.conn)
        .await
        .map_err(store_error)
        .context("Failed to read payables")?;
        rows.into_iter()
            .map(|(id, supplier, value, due_date)| {
                Ok(Payable {
                    id,
                    supplier,
                    value: amount(&value)?,
                    due_date,
                })
            })
            .collect()
    }

    async fn receipts(&mut self, status: &str) -> Result<Vec<ClientReceipt>> {
        trace!("receipts with status {status}");
        let rows: Vec<(i64, String, String)> = sqlx::query_as(
            "SELECT c.id, c.name, COALESCE(CAST(r.value AS TEXT), '') \
             FROM receivables r \
             JOIN clients c ON r.client_id = c.id \
             WHERE r.status = ? \
             ORDER BY r.id",
        )
        .bind(status)
        .fetch_all(&mut self.conn)
        .await
        .map_err(store_error)
        .context("Failed to read received receivables")?;
        rows.into_iter()
            .map(|(client_id, client_name, value)| {
                Ok(ClientReceipt {
                    client_id,
                    client_name,
                    value: amount(&value)?,
                })
            })
            .collect()
    }

    async fn ledger_entries(&mut self, period: &Period) -> Result<Vec<LedgerEntry>> {
        trace!("ledger entries for {period}");
        let rows: Vec<EntryRow> = sqlx::query_as(
            "SELECT id, type, COALESCE(CAST(value AS TEXT), ''), date, description \
             FROM ledger_entries \
             WHERE date >= ? AND date < ? \
             ORDER BY date, id",
        )
        .bind(period.start().to_string())
        .bind(period.end().to_string())
        .fetch_all(&mut self.conn)
        .await
        .map_err(store_error)
        .with_context(|| format!("Failed to read ledger entries for {period}"))?;
        rows.into_iter().map(entry).collect()
    }
}

fn entry((id, kind, value, date, description): EntryRow) -> Result<LedgerEntry> {
    Ok(LedgerEntry {
        id,
        kind,
        value: amount(&value)?,
        date,
        description,
    })
}

/// Parses a stored value. A value that is not a number means the row cannot be aggregated.
fn amount(text: &str) -> Result<Amount> {
    Amount::from_str(text).pub_result(ErrorType::MalformedQuery)
}

/// Tags a driver error with the kind of failure it represents.
fn store_error(e: sqlx::Error) -> Error {
    let error_type = classify(&e);
    Error::new(e).context(error_type)
}

fn classify(e: &sqlx::Error) -> ErrorType {
    match e {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(SQLITE_ERROR) => {
            ErrorType::MalformedQuery
        }
        sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::TypeNotFound { .. } => ErrorType::MalformedQuery,
        _ => ErrorType::StoreUnavailable,
    }
}

async fn close(conn: SqliteConnection) -> Result<()> {
    conn.close()
        .await
        .context("Failed to close the database connection")
}

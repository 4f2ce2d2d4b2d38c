//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::db::Session;
use crate::Config;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection, SqliteConnection};
use tempfile::TempDir;

/// Test environment that sets up an erp home directory with Config and an initialized database.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with Config and initialized database.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("erp");
        let config = Config::create(&root).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Opens a read-only session on the test database.
    pub async fn session(&self) -> Session {
        self.config.db().session().await.unwrap()
    }

    pub async fn insert_client(&self, id: i64, name: &str) {
        self.execute(
            sqlx::query("INSERT INTO clients (id, name) VALUES (?, ?)")
                .bind(id)
                .bind(name),
        )
        .await;
    }

    /// Inserts a payable. `value` is bound as text so the NUMERIC column applies its own
    /// conversion, as it would for rows written by another program.
    pub async fn insert_payable(&self, supplier: &str, value: &str) {
        self.execute(
            sqlx::query("INSERT INTO payables (supplier, value) VALUES (?, ?)")
                .bind(supplier)
                .bind(value),
        )
        .await;
    }

    pub async fn insert_receivable(&self, client_id: i64, value: &str, status: &str) {
        self.execute(
            sqlx::query("INSERT INTO receivables (client_id, value, status) VALUES (?, ?, ?)")
                .bind(client_id)
                .bind(value)
                .bind(status),
        )
        .await;
    }

    pub async fn insert_entry(&self, kind: &str, value: &str, date: &str) {
        self.execute(
            sqlx::query("INSERT INTO ledger_entries (type, value, date) VALUES (?, ?, ?)")
                .bind(kind)
                .bind(value)
                .bind(date),
        )
        .await;
    }

    /// Runs a statement on a writable connection, e.g. to damage the schema.
    pub async fn execute_sql(&self, sql: &str) {
        self.execute(sqlx::query(sql)).await;
    }

    async fn execute<'q>(
        &self,
        query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    ) {
        let mut conn = self.writer().await;
        query.execute(&mut conn).await.unwrap();
        conn.close().await.unwrap();
    }

    async fn writer(&self) -> SqliteConnection {
        SqliteConnectOptions::new()
            .filename(self.config.database_path())
            .connect()
            .await
            .unwrap()
    }
}

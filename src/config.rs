//! Configuration file handling.
//!
//! The configuration file is stored at `$ERP_HOME/config.json`. It names the SQLite database that
//! holds the ledger and the vocabulary that the database uses for statuses and entry types.

use crate::db::Db;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "erp";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DEFAULT_DATABASE: &str = "erp_finance.sqlite";
const DEFAULT_CHART_WIDTH: usize = 40;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$ERP_HOME` and from there it loads `$ERP_HOME/config.json` and opens the database
/// that the file points to.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
}

impl Config {
    /// Creates the home directory, an initial `config.json` with default settings, and an empty
    /// database with the current schema.
    ///
    /// # Errors
    /// - Returns an error if a config file already exists or if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the erp home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!("A config file already exists at '{}'", config_path.display());
        }
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let db = Db::init(config_file.database_path(&root))
            .await
            .context("Unable to create SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
        })
    }

    /// This will
    /// - validate that `erp_home` exists and that the config file exists
    /// - load the config file
    /// - open the database it points to, migrating its schema if needed
    pub async fn load(erp_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = erp_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("ERP home is missing, run 'erp init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let db = Db::load(config_file.database_path(&root))
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    pub fn database_path(&self) -> &Path {
        self.db.path()
    }

    pub fn labels(&self) -> &Labels {
        &self.config_file.labels
    }

    pub fn chart_width(&self) -> usize {
        self.config_file.chart_width
    }
}

/// The values the database uses for the receivable status and ledger entry types that the
/// reports filter on.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Labels {
    /// Receivables with this status count as received revenue.
    received_status: String,
    /// Ledger entries with this type count as revenue.
    revenue_type: String,
    /// Ledger entries with this type count as expense.
    expense_type: String,
}

impl Labels {
    pub fn new(
        received_status: impl Into<String>,
        revenue_type: impl Into<String>,
        expense_type: impl Into<String>,
    ) -> Self {
        Self {
            received_status: received_status.into(),
            revenue_type: revenue_type.into(),
            expense_type: expense_type.into(),
        }
    }

    pub fn received_status(&self) -> &str {
        &self.received_status
    }

    pub fn revenue_type(&self) -> &str {
        &self.revenue_type
    }

    pub fn expense_type(&self) -> &str {
        &self.expense_type
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::new("Received", "Revenue", "Expense")
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "erp",
///   "config_version": 1,
///   "database_path": "/srv/finance/erp_finance.db",
///   "labels": {
///     "received_status": "Recebido",
///     "revenue_type": "Receita",
///     "expense_type": "Despesa"
///   },
///   "chart_width": 40
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "erp"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the SQLite database (optional, relative to the home directory or absolute)
    /// Defaults to $ERP_HOME/erp_finance.sqlite if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database_path: Option<PathBuf>,

    #[serde(default)]
    labels: Labels,

    /// Width, in characters, of the longest bar in report charts
    #[serde(default = "default_chart_width")]
    chart_width: usize,
}

fn default_chart_width() -> usize {
    DEFAULT_CHART_WIDTH
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            database_path: None,
            labels: Labels::default(),
            chart_width: DEFAULT_CHART_WIDTH,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Returns the stored `database_path` if it is absolute, otherwise resolves it against
    /// `root`.
    fn database_path(&self, root: &Path) -> PathBuf {
        match &self.database_path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root.join(p),
            None => root.join(DEFAULT_DATABASE),
        }
    }
}

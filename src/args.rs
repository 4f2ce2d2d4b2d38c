//! These structs provide the CLI interface for the erp CLI.

use crate::model::Period;
use crate::render::Format;
use crate::report::Report;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// erp: Financial reports from a small ERP ledger.
///
/// The ledger is a SQLite database holding clients, payables, receivables and dated revenue and
/// expense entries, created by `erp init`. Reports and listings read it over a read-only
/// connection. The reports are the total owed to each supplier, the five clients with the most
/// received revenue, and revenue against expense for one calendar month.
///
/// The ledger's schema is versioned. When a ledger created by an older version of this program
/// is opened, its schema is migrated to the current version before anything is read. A database
/// without a schema version is rejected.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the erp home directory, its config file and an empty ledger database.
    ///
    /// The database is created at $ERP_HOME/erp_finance.sqlite. To report on a ledger that
    /// already exists elsewhere, edit `database_path` in $ERP_HOME/config.json afterwards.
    Init,
    /// Compute and print financial reports.
    Report(ReportArgs),
    /// Print the raw rows of one ledger table.
    List(ListArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where erp configuration is held. Defaults to ~/erp
    #[arg(long, env = "ERP_HOME", default_value_t = default_erp_home())]
    erp_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, erp_home: PathBuf) -> Self {
        Self {
            log_level,
            erp_home: erp_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn erp_home(&self) -> &DisplayPath {
        &self.erp_home
    }
}

/// (Not shown): Args for the `erp report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// The reports to print, in order. All reports are printed when none are given.
    #[arg(value_enum)]
    reports: Vec<Report>,

    /// The month for the revenue vs expense report, as YYYY-MM. Defaults to the current month.
    #[arg(long)]
    month: Option<Period>,

    /// The output format.
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Do not draw bar charts under table output.
    #[arg(long)]
    no_chart: bool,
}

impl ReportArgs {
    pub fn new(reports: Vec<Report>, month: Option<Period>, format: Format, no_chart: bool) -> Self {
        Self {
            reports,
            month,
            format,
            no_chart,
        }
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn month(&self) -> Option<Period> {
        self.month
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn no_chart(&self) -> bool {
        self.no_chart
    }
}

/// The ledger tables that `erp list` can print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Clients,
    Payables,
    Receivables,
    Entries,
}

serde_plain::derive_display_from_serialize!(Table);
serde_plain::derive_fromstr_from_deserialize!(Table);

/// (Not shown): Args for the `erp list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// The table to print.
    #[arg(value_enum)]
    table: Table,

    /// The output format.
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,
}

impl ListArgs {
    pub fn new(table: Table, format: Format) -> Self {
        Self { table, format }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn format(&self) -> Format {
        self.format
    }
}

fn default_erp_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("erp"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --erp-home or ERP_HOME instead of relying on the default \
                erp home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("erp")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

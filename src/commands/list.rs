use crate::args::{ListArgs, Table};
use crate::commands::Out;
use crate::db::Session;
use crate::render::{self, Format, Rendered};
use crate::report::LedgerStore;
use crate::{Config, Result};
use tracing::warn;

/// Prints every row of one ledger table, unfiltered.
pub async fn list(config: Config, args: ListArgs) -> Result<Out<Rendered>> {
    let mut session = config.db().session().await?;
    let listed = dump(&mut session, args.table(), args.format()).await;
    let closed = session.close().await;
    let (count, rendered) = match (listed, closed) {
        (Ok(listed), Ok(())) => listed,
        (Ok(_), Err(e)) => return Err(e),
        (Err(e), Ok(())) => return Err(e),
        (Err(e), Err(close_err)) => {
            warn!("Unable to close the ledger store session: {close_err:#}");
            return Err(e);
        }
    };
    Ok(Out::new(
        format!("Listed {count} row(s) from {}", args.table()),
        rendered,
    ))
}

async fn dump(session: &mut Session, table: Table, format: Format) -> Result<(usize, Rendered)> {
    match table {
        Table::Clients => {
            let rows = session.clients().await?;
            Ok((rows.len(), render::records(&rows, format)?))
        }
        Table::Payables => {
            let rows = session.payables().await?;
            Ok((rows.len(), render::records(&rows, format)?))
        }
        Table::Receivables => {
            let rows = session.receivables().await?;
            Ok((rows.len(), render::records(&rows, format)?))
        }
        Table::Entries => {
            let rows = session.all_ledger_entries().await?;
            Ok((rows.len(), render::records(&rows, format)?))
        }
    }
}

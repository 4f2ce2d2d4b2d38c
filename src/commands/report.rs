use crate::args::ReportArgs;
use crate::commands::Out;
use crate::model::Period;
use crate::render::{self, Format, Rendered};
use crate::report::Report;
use crate::{Config, Result};
use tracing::{debug, warn};

/// Computes the requested reports against the configured ledger and renders them.
///
/// All reports are computed when `args` names none. The revenue vs expense report covers the
/// month given in `args`, or the current month.
pub async fn report(config: Config, args: ReportArgs) -> Result<Out<Rendered>> {
    let reports = if args.reports().is_empty() {
        Report::ALL.to_vec()
    } else {
        args.reports().to_vec()
    };
    let period = match args.month() {
        Some(period) => period,
        None => Period::current()?,
    };
    debug!(
        "Computing {} report(s) for {period} from '{}'",
        reports.len(),
        config.database_path().display()
    );

    let outputs = crate::report::run(config.db(), &reports, period, config.labels()).await?;

    if args.format() == Format::Csv {
        for output in outputs.iter().filter(|o| o.is_empty()) {
            warn!(
                "{}: {}",
                render::title(output),
                output.report().empty_notice()
            );
        }
    }

    let chart_width = (!args.no_chart()).then(|| config.chart_width());
    let rendered = render::reports(&outputs, args.format(), chart_width)?;
    Ok(Out::new(
        format!("Computed {} report(s) for {period}", outputs.len()),
        rendered,
    ))
}

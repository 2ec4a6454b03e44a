use super::{parse_date, parse_instant};
use crate::libs::config::Config;
use crate::libs::ledger::Ledger;
use crate::libs::messages::Message;
use crate::libs::report::{ReportFilter, ReportOptions, Separator, Window};
use crate::libs::view::View;
use crate::{msg_info, msg_print};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[arg(long, short, default_value = "today", help = "First date (YYYY-MM-DD, 'today' or 'yesterday')")]
    from: String,

    #[arg(long, short, help = "Last date; without it only --from is summarized and paused entries are skipped")]
    to: Option<String>,

    #[arg(long, short, help = "Regular expression matched against project names")]
    project: Option<String>,

    #[arg(long, short, help = "Regular expression matched against notes")]
    note: Option<String>,

    #[arg(long, short, help = "Only billable (true) or non-billable (false) entries")]
    billable: Option<bool>,

    #[arg(long, help = "Report raw hours instead of quarter-hour steps")]
    no_round: bool,

    #[arg(long, help = "Join notes with commas instead of newlines")]
    comma: bool,

    #[arg(long, help = "Print the summary as JSON")]
    json: bool,

    #[arg(long, help = "Summarize the newest snapshot taken before this time (YYYY-MM-DD HH:MM)")]
    as_of: Option<String>,
}

pub fn cmd(ledger: &Ledger, config: &Config, args: SummaryArgs) -> Result<()> {
    let from = parse_date(ledger, &args.from)?;
    let window = match &args.to {
        Some(to) => Window::Range {
            start: from,
            end: parse_date(ledger, to)?,
        },
        None => Window::Day(from),
    };

    let separator = if args.comma { Separator::Comma } else { config.report.separator };
    let options = ReportOptions {
        window,
        filter: ReportFilter {
            project: args.project,
            note: args.note,
            billable: args.billable,
        },
        round: config.report.round && !args.no_round,
        separator,
    };

    let summary = match args.as_of.as_deref() {
        Some(as_of) => ledger.summary_as_of(&options, parse_instant(ledger, Some(as_of))?)?,
        None => ledger.summary(&options)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let (start, end) = window.bounds();
    msg_print!(Message::SummaryHeader(start.to_string(), end.to_string()), true);
    if summary.rows.is_empty() {
        msg_info!(Message::SummaryEmpty);
        return Ok(());
    }

    View::summary(&summary);
    Ok(())
}

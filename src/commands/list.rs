use super::parse_date;
use crate::libs::ledger::Ledger;
use crate::libs::messages::Message;
use crate::libs::timer::EntryFilter;
use crate::libs::view::View;
use crate::{msg_info, msg_print};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, short, default_value = "today", help = "First date (YYYY-MM-DD, 'today' or 'yesterday')")]
    from: String,

    #[arg(long, short, help = "Last date, defaults to --from")]
    to: Option<String>,

    #[arg(long, short, help = "Regular expression matched against project names")]
    project: Option<String>,

    #[arg(long, short, help = "Regular expression matched against notes")]
    note: Option<String>,

    #[arg(long, short, help = "Include archived entries")]
    all: bool,
}

pub fn cmd(ledger: &Ledger, args: ListArgs) -> Result<()> {
    let from = parse_date(ledger, &args.from)?;
    let to = match &args.to {
        Some(to) => parse_date(ledger, to)?,
        None => from,
    };

    let filter = EntryFilter {
        from: Some(from),
        to: Some(to),
        project: args.project,
        note: args.note,
        include_archived: args.all,
    };
    let listing = ledger.timer().list(&filter)?;

    if listing.rows.is_empty() {
        msg_info!(Message::NoEntriesFound);
        return Ok(());
    }

    View::listing(&listing);
    msg_print!(Message::SummaryTotal(listing.total));
    Ok(())
}

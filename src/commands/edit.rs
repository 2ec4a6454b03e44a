use super::{parse_date, parse_time};
use crate::libs::ledger::Ledger;
use crate::libs::messages::Message;
use crate::libs::timer::EntryEdit;
use crate::libs::view::View;
use crate::msg_success;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct EditArgs {
    #[arg(required = true, help = "Ids or unique prefixes of the entries to edit")]
    ids: Vec<String>,

    #[arg(long, short, help = "Move the entries to another project")]
    project: Option<String>,

    #[arg(long, short, help = "New note")]
    note: Option<String>,

    #[arg(long, short, help = "New billable flag")]
    billable: Option<bool>,

    #[arg(long, short, help = "New date (YYYY-MM-DD, 'today' or 'yesterday')")]
    date: Option<String>,

    #[arg(long, short, help = "New local start time (HH:MM[:SS])")]
    start: Option<String>,

    #[arg(long, short, help = "New local end time (HH:MM[:SS]) of a stopped entry")]
    end: Option<String>,
}

pub fn cmd(ledger: &Ledger, args: EditArgs) -> Result<()> {
    let edit = EntryEdit {
        project: args.project,
        note: args.note,
        billable: args.billable,
        date: args.date.as_deref().map(|d| parse_date(ledger, d)).transpose()?,
        start: args.start.as_deref().map(parse_time).transpose()?,
        end: args.end.as_deref().map(parse_time).transpose()?,
    };

    let ids: Vec<&str> = args.ids.iter().map(String::as_str).collect();
    let entries = ledger.timer().edit(&ids, &edit)?;

    msg_success!(Message::EntriesEdited(entries.len()));
    View::entries(&entries);
    Ok(())
}

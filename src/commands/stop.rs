use super::{parse_instant, single_id};
use crate::libs::ledger::Ledger;
use crate::libs::messages::Message;
use crate::{msg_info, msg_success};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct StopArgs {
    #[arg(help = "Entry id or unique prefix, defaults to the only unfinished entry")]
    id: Option<String>,

    #[arg(long, short, help = "End time (HH:MM, or YYYY-MM-DD HH:MM), defaults to now")]
    at: Option<String>,

    #[arg(long, conflicts_with = "id", help = "Stop every running and paused entry")]
    all: bool,
}

pub fn cmd(ledger: &Ledger, args: StopArgs) -> Result<()> {
    let timer = ledger.timer();
    let at = parse_instant(ledger, args.at.as_deref())?;

    let mut unfinished = timer.running()?;
    unfinished.extend(timer.paused()?);

    let ids: Vec<String> = match args.id {
        Some(id) => vec![id],
        None if args.all => unfinished.into_iter().map(|entry| entry.id).collect(),
        None => single_id(unfinished, "unfinished")?.into_iter().collect(),
    };

    if ids.is_empty() {
        msg_info!(Message::NoRunningEntries);
        return Ok(());
    }

    for id in ids {
        let entry = timer.stop(&id, at)?;
        msg_success!(Message::EntryStopped(entry.short_id().to_string(), entry.hours));
    }
    Ok(())
}

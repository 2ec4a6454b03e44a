use crate::libs::ledger::Ledger;
use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::msg_info;
use anyhow::Result;

pub fn cmd(ledger: &Ledger) -> Result<()> {
    let timer = ledger.timer();

    let running = timer.running()?;
    if running.is_empty() {
        msg_info!(Message::NoRunningEntries);
    } else {
        View::entries(&running);
    }

    let paused = timer.paused()?;
    if paused.is_empty() {
        msg_info!(Message::NoPausedEntries);
    } else {
        View::entries(&paused);
    }

    Ok(())
}

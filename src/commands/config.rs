use crate::libs::clock::parse_zone;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::msg_success;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long, short, help = "IANA time zone, e.g. Europe/Berlin")]
    timezone: Option<String>,

    #[arg(long, help = "Round summaries to quarter hours by default")]
    round: Option<bool>,

    #[arg(long, help = "Billable flag for new projects")]
    default_billable: Option<bool>,

    #[arg(long, help = "Days to keep migration snapshots")]
    retention_days: Option<i64>,
}

pub fn cmd(args: ConfigArgs) -> Result<()> {
    let mut config = Config::read()?;
    let mut changed = false;

    if let Some(timezone) = args.timezone {
        let zone = parse_zone(&timezone)?;
        config.timezone = zone.name().to_string();
        msg_success!(Message::ConfigTimezoneSet(config.timezone.clone()));
        changed = true;
    }
    if let Some(round) = args.round {
        config.report.round = round;
        changed = true;
    }
    if let Some(default_billable) = args.default_billable {
        config.default_billable = default_billable;
        changed = true;
    }
    if let Some(days) = args.retention_days {
        config.snapshot_retention_days = days;
        changed = true;
    }

    if changed {
        config.save()?;
        msg_success!(Message::ConfigSaved);
    } else {
        println!("{}", serde_json::to_string_pretty(&config)?);
    }

    Ok(())
}

pub mod add;
pub mod config;
pub mod delete;
pub mod edit;
pub mod list;
pub mod migrate;
pub mod notes;
pub mod project;
pub mod snapshot;
pub mod start;
pub mod status;
pub mod stop;
pub mod summary;
pub mod transition;

use crate::libs::clock::{from_local, local_date};
use crate::libs::config::Config;
use crate::libs::entry::TimeEntry;
use crate::libs::ledger::Ledger;
use anyhow::{bail, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Start a new time entry")]
    Start(start::StartArgs),
    #[command(about = "Pause a running entry")]
    Pause(transition::TransitionArgs),
    #[command(about = "Resume a paused entry")]
    Resume(transition::TransitionArgs),
    #[command(about = "Stop a running or paused entry")]
    Stop(stop::StopArgs),
    #[command(about = "Record a finished entry")]
    Add(add::AddArgs),
    #[command(about = "Edit one or more entries", arg_required_else_help = true)]
    Edit(edit::EditArgs),
    #[command(about = "Replace matching notes of a project", arg_required_else_help = true)]
    Notes(notes::NotesArgs),
    #[command(about = "Delete an entry by id prefix", arg_required_else_help = true)]
    Delete(delete::DeleteArgs),
    #[command(about = "List entries")]
    List(list::ListArgs),
    #[command(about = "Show running and paused entries")]
    Status,
    #[command(about = "Manage projects", arg_required_else_help = true)]
    Project(project::ProjectArgs),
    #[command(about = "Summarize entries by day, project and billable flag")]
    Summary(summary::SummaryArgs),
    #[command(about = "Manage snapshots of the entries table", arg_required_else_help = true)]
    Snapshot(snapshot::SnapshotArgs),
    #[command(about = "Show the entries table version")]
    Migrate,
    #[command(about = "Show or change configuration")]
    Config(config::ConfigArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            // Handled without opening the ledger so a broken time zone can
            // still be fixed from the command line.
            Commands::Config(args) => config::cmd(args),
            command => Self::run(command),
        }
    }

    fn run(command: Commands) -> Result<()> {
        let config = Config::read()?;
        let ledger = Ledger::from_config(&config)?;

        match command {
            Commands::Start(args) => start::cmd(&ledger, args),
            Commands::Pause(args) => transition::pause(&ledger, args),
            Commands::Resume(args) => transition::resume(&ledger, args),
            Commands::Stop(args) => stop::cmd(&ledger, args),
            Commands::Add(args) => add::cmd(&ledger, args),
            Commands::Edit(args) => edit::cmd(&ledger, args),
            Commands::Notes(args) => notes::cmd(&ledger, args),
            Commands::Delete(args) => delete::cmd(&ledger, args),
            Commands::List(args) => list::cmd(&ledger, args),
            Commands::Status => status::cmd(&ledger),
            Commands::Project(args) => project::cmd(&ledger, &config, args),
            Commands::Summary(args) => summary::cmd(&ledger, &config, args),
            Commands::Snapshot(args) => snapshot::cmd(&ledger, &config, args),
            Commands::Migrate => migrate::cmd(&ledger),
            Commands::Config(_) => unreachable!("config is handled before the ledger is opened"),
        }
    }
}

/// Parses `today`, `yesterday` or `YYYY-MM-DD` in the ledger's zone.
pub(crate) fn parse_date(ledger: &Ledger, value: &str) -> Result<NaiveDate> {
    let today = local_date(ledger.now(), &ledger.zone());
    match value.to_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => Ok(today - Duration::days(1)),
        _ => Ok(NaiveDate::parse_from_str(value, "%Y-%m-%d")?),
    }
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub(crate) fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| anyhow::anyhow!("'{}' is not a time (HH:MM[:SS])", value))
}

/// Resolves a local time, optionally with a date, to an instant. `None` means now.
pub(crate) fn parse_instant(ledger: &Ledger, value: Option<&str>) -> Result<DateTime<Utc>> {
    let Some(value) = value else {
        return Ok(ledger.now());
    };

    let local = match NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
    {
        Ok(local) => local,
        Err(_) => local_date(ledger.now(), &ledger.zone()).and_time(parse_time(value)?),
    };

    Ok(from_local(local, &ledger.zone())?)
}

/// Picks the entry a transition applies to when no id was given.
pub(crate) fn single_id(candidates: Vec<TimeEntry>, what: &str) -> Result<Option<String>> {
    match candidates.as_slice() {
        [] => Ok(None),
        [entry] => Ok(Some(entry.id.clone())),
        _ => bail!("{} {} entries, pass an id", candidates.len(), what),
    }
}

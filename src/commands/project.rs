use crate::libs::config::Config;
use crate::libs::ledger::Ledger;
use crate::libs::messages::Message;
use crate::libs::project::ProjectFilter;
use crate::libs::view::View;
use crate::{msg_info, msg_success};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct ProjectArgs {
    #[command(subcommand)]
    command: ProjectCommand,
}

#[derive(Debug, Subcommand)]
enum ProjectCommand {
    #[command(about = "Create a project")]
    Create {
        name: String,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long, short, help = "Entries are billable unless overridden")]
        billable: Option<bool>,
    },
    #[command(about = "Archive a project")]
    Archive {
        name: String,
        #[arg(long, help = "Archive the project's entries too")]
        entries: bool,
    },
    #[command(about = "Unarchive a project")]
    Unarchive {
        name: String,
        #[arg(long, help = "Unarchive the project's entries too")]
        entries: bool,
    },
    #[command(about = "Rename a project and all of its entries")]
    Rename { name: String, new_name: String },
    #[command(about = "Change the description of a project")]
    Describe { name: String, description: Option<String> },
    #[command(about = "Change the default billable flag of a project")]
    Billable { name: String, billable: bool },
    #[command(about = "Delete a project and all of its entries")]
    Delete { name: String },
    #[command(about = "List projects")]
    List {
        #[arg(long, conflicts_with = "all", help = "Only archived projects")]
        archived: bool,
        #[arg(long, help = "Active and archived projects")]
        all: bool,
    },
}

pub fn cmd(ledger: &Ledger, config: &Config, args: ProjectArgs) -> Result<()> {
    let registry = ledger.registry();

    match args.command {
        ProjectCommand::Create {
            name,
            description,
            billable,
        } => {
            let billable = billable.unwrap_or(config.default_billable);
            let project = registry.create(&name, description.as_deref(), billable)?;
            msg_success!(Message::ProjectCreated(project.name));
        }
        ProjectCommand::Archive { name, entries } => {
            registry.archive(&name, entries)?;
            msg_success!(Message::ProjectArchived(name));
        }
        ProjectCommand::Unarchive { name, entries } => {
            registry.unarchive(&name, entries)?;
            msg_success!(Message::ProjectUnarchived(name));
        }
        ProjectCommand::Rename { name, new_name } => {
            registry.rename(&name, &new_name)?;
            msg_success!(Message::ProjectRenamed(name, new_name));
        }
        ProjectCommand::Describe { name, description } => {
            registry.update_description(&name, description.as_deref())?;
            msg_success!(Message::ProjectDescriptionUpdated(name));
        }
        ProjectCommand::Billable { name, billable } => {
            registry.update_default_billable(&name, billable)?;
            msg_success!(Message::ProjectBillableUpdated(name, billable));
        }
        ProjectCommand::Delete { name } => {
            let entries = registry.delete(&name)?;
            msg_success!(Message::ProjectDeleted(name, entries));
        }
        ProjectCommand::List { archived, all } => {
            let filter = match (archived, all) {
                (_, true) => ProjectFilter::All,
                (true, false) => ProjectFilter::Archived,
                (false, false) => ProjectFilter::Active,
            };
            let projects = registry.list(filter)?;
            if projects.is_empty() {
                msg_info!(Message::NoProjectsFound);
            } else {
                View::projects(&projects);
            }
        }
    }

    Ok(())
}

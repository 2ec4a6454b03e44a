//! Project registry.
//!
//! Projects are created explicitly, archived and unarchived (soft, with an
//! optional cascade onto their entries), renamed (always cascading), or have
//! their description and default-billable flag changed. The default project
//! exists in every ledger and can never be deleted.

use crate::db::store::Store;
use crate::libs::clock::{to_local, Clock};
use crate::libs::error::{LedgerError, LedgerResult};
use crate::libs::project::{Project, ProjectFilter, DEFAULT_PROJECT};
use chrono_tz::Tz;

const NAME_MIN_LEN: usize = 3;
const NAME_MAX_LEN: usize = 30;

/// Names are 3 to 30 characters of letters, digits, `-`, `_` or `.`.
pub fn is_valid_project_name(name: &str) -> bool {
    (NAME_MIN_LEN..=NAME_MAX_LEN).contains(&name.chars().count())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

pub struct Registry<'a, S: Store> {
    store: &'a S,
    clock: &'a dyn Clock,
    tz: Tz,
}

impl<'a, S: Store> Registry<'a, S> {
    pub fn new(store: &'a S, clock: &'a dyn Clock, tz: Tz) -> Self {
        Self { store, clock, tz }
    }

    fn validate_name(name: &str) -> LedgerResult<()> {
        if is_valid_project_name(name) {
            Ok(())
        } else {
            Err(LedgerError::InvalidInput(format!(
                "project name '{}' must be {}-{} letters, digits, '-', '_' or '.'",
                name, NAME_MIN_LEN, NAME_MAX_LEN
            )))
        }
    }

    /// Fetches a project or fails with [`LedgerError::InvalidProject`].
    pub fn get(&self, name: &str) -> LedgerResult<Project> {
        self.store
            .fetch_project(name)?
            .ok_or_else(|| LedgerError::InvalidProject(format!("{} does not exist", name)))
    }

    pub fn list(&self, filter: ProjectFilter) -> LedgerResult<Vec<Project>> {
        self.store.fetch_projects(filter)
    }

    pub fn create(&self, name: &str, description: Option<&str>, default_billable: bool) -> LedgerResult<Project> {
        Self::validate_name(name)?;
        if self.store.fetch_project(name)?.is_some() {
            return Err(LedgerError::DuplicateProject(name.to_string()));
        }

        let project = Project::new(name, description, default_billable, to_local(self.clock.now(), &self.tz));
        self.store.insert_project(&project)?;

        tracing::debug!(project = name, "created project");
        Ok(project)
    }

    /// Creates the default project if it is missing. Returns whether it was created.
    pub fn ensure_default_project(&self) -> LedgerResult<bool> {
        if self.store.fetch_project(DEFAULT_PROJECT)?.is_some() {
            return Ok(false);
        }

        let project = Project::new(
            DEFAULT_PROJECT,
            Some("Entries without a project"),
            false,
            to_local(self.clock.now(), &self.tz),
        );
        self.store.insert_project(&project)?;
        Ok(true)
    }

    /// Marks the project archived. With `cascade`, its entries are archived too.
    ///
    /// Archiving an archived project keeps the original timestamp.
    pub fn archive(&self, name: &str, cascade: bool) -> LedgerResult<Project> {
        let mut project = self.get(name)?;
        if project.archived.is_none() {
            project.archived = Some(to_local(self.clock.now(), &self.tz));
            self.store.update_project(&project)?;
        }
        if cascade {
            let entries = self.store.archive_project_entries(name, true)?;
            tracing::debug!(project = name, entries, "archived project entries");
        }
        Ok(project)
    }

    pub fn unarchive(&self, name: &str, cascade: bool) -> LedgerResult<Project> {
        let mut project = self.get(name)?;
        if project.archived.is_some() {
            project.archived = None;
            self.store.update_project(&project)?;
        }
        if cascade {
            let entries = self.store.archive_project_entries(name, false)?;
            tracing::debug!(project = name, entries, "unarchived project entries");
        }
        Ok(project)
    }

    /// Renames a project and every entry referencing it. Returns the number of entries moved.
    pub fn rename(&self, name: &str, new_name: &str) -> LedgerResult<usize> {
        Self::validate_name(new_name)?;
        self.get(name)?;
        if self.store.fetch_project(new_name)?.is_some() {
            return Err(LedgerError::DuplicateProject(new_name.to_string()));
        }

        let entries = self.store.rename_project(name, new_name)?;
        tracing::debug!(project = name, new_name, entries, "renamed project");
        Ok(entries)
    }

    pub fn update_description(&self, name: &str, description: Option<&str>) -> LedgerResult<Project> {
        let mut project = self.get(name)?;
        project.description = description.filter(|d| !d.is_empty()).map(str::to_string);
        self.store.update_project(&project)?;
        Ok(project)
    }

    /// Changes the flag new entries inherit. Existing entries keep theirs.
    pub fn update_default_billable(&self, name: &str, default_billable: bool) -> LedgerResult<Project> {
        let mut project = self.get(name)?;
        project.default_billable = default_billable;
        self.store.update_project(&project)?;
        Ok(project)
    }

    /// Deletes a project together with all of its entries. Returns the number of entries removed.
    pub fn delete(&self, name: &str) -> LedgerResult<usize> {
        let project = self.get(name)?;
        if project.is_default() {
            return Err(LedgerError::InvalidProject(format!("{} cannot be deleted", name)));
        }

        let entries = self.store.delete_project(name)?;
        tracing::debug!(project = name, entries, "deleted project");
        Ok(entries)
    }
}

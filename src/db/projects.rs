//! SQLite implementation of the project half of the storage port.

use crate::db::db::Db;
use crate::db::store::ProjectStore;
use crate::libs::error::LedgerResult;
use crate::libs::project::{Project, ProjectFilter};
use rusqlite::{params, OptionalExtension, Row};

pub const SCHEMA_PROJECTS: &str = "CREATE TABLE IF NOT EXISTS projects (
    name TEXT NOT NULL PRIMARY KEY,
    description TEXT,
    default_billable BOOLEAN NOT NULL DEFAULT FALSE,
    created DATETIME NOT NULL,
    archived DATETIME
)";

const INSERT_PROJECT: &str = "INSERT INTO projects (name, description, default_billable, created, archived) VALUES (?1, ?2, ?3, ?4, ?5)";
const SELECT_PROJECT: &str = "SELECT name, description, default_billable, created, archived FROM projects WHERE name = ?1";
const SELECT_PROJECTS: &str = "SELECT name, description, default_billable, created, archived FROM projects";
const UPDATE_PROJECT: &str = "UPDATE projects SET description = ?2, default_billable = ?3, archived = ?4 WHERE name = ?1";
const RENAME_PROJECT: &str = "UPDATE projects SET name = ?2 WHERE name = ?1";
const RENAME_PROJECT_ENTRIES: &str = "UPDATE entries SET project = ?2 WHERE project = ?1";
const ARCHIVE_PROJECT_ENTRIES: &str = "UPDATE entries SET archived = ?2 WHERE project = ?1";
const DELETE_PROJECT: &str = "DELETE FROM projects WHERE name = ?1";
const DELETE_PROJECT_ENTRIES: &str = "DELETE FROM entries WHERE project = ?1";

fn project_from_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        name: row.get(0)?,
        description: row.get(1)?,
        default_billable: row.get(2)?,
        created: row.get(3)?,
        archived: row.get(4)?,
    })
}

impl ProjectStore for Db {
    fn insert_project(&self, project: &Project) -> LedgerResult<()> {
        self.conn.execute(
            INSERT_PROJECT,
            params![project.name, project.description, project.default_billable, project.created, project.archived],
        )?;
        Ok(())
    }

    fn fetch_project(&self, name: &str) -> LedgerResult<Option<Project>> {
        let project = self.conn.query_row(SELECT_PROJECT, [name], project_from_row).optional()?;
        Ok(project)
    }

    fn fetch_projects(&self, filter: ProjectFilter) -> LedgerResult<Vec<Project>> {
        let sql = match filter {
            ProjectFilter::Active => format!("{} WHERE archived IS NULL ORDER BY name", SELECT_PROJECTS),
            ProjectFilter::Archived => format!("{} WHERE archived IS NOT NULL ORDER BY name", SELECT_PROJECTS),
            ProjectFilter::All => format!("{} ORDER BY name", SELECT_PROJECTS),
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let projects = stmt.query_map([], project_from_row)?.collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    fn update_project(&self, project: &Project) -> LedgerResult<usize> {
        let updated = self.conn.execute(
            UPDATE_PROJECT,
            params![project.name, project.description, project.default_billable, project.archived],
        )?;
        Ok(updated)
    }

    fn rename_project(&self, name: &str, new_name: &str) -> LedgerResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(RENAME_PROJECT, params![name, new_name])?;
        let entries = tx.execute(RENAME_PROJECT_ENTRIES, params![name, new_name])?;
        tx.commit()?;
        Ok(entries)
    }

    fn archive_project_entries(&self, project: &str, archived: bool) -> LedgerResult<usize> {
        Ok(self.conn.execute(ARCHIVE_PROJECT_ENTRIES, params![project, archived])?)
    }

    fn delete_project(&self, name: &str) -> LedgerResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let entries = tx.execute(DELETE_PROJECT_ENTRIES, [name])?;
        tx.execute(DELETE_PROJECT, [name])?;
        tx.commit()?;
        Ok(entries)
    }
}

//! Project records.

use chrono::NaiveDateTime;

/// Name of the project every ledger starts with. It can never be deleted.
pub const DEFAULT_PROJECT: &str = "no-project";

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub name: String,
    pub description: Option<String>,
    pub default_billable: bool,
    pub created: NaiveDateTime,
    pub archived: Option<NaiveDateTime>,
}

impl Project {
    pub fn new(name: &str, description: Option<&str>, default_billable: bool, created: NaiveDateTime) -> Self {
        Project {
            name: name.to_string(),
            description: description.filter(|d| !d.is_empty()).map(str::to_string),
            default_billable,
            created,
            archived: None,
        }
    }

    pub fn is_archived(&self) -> bool {
        self.archived.is_some()
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_PROJECT
    }
}

/// Which projects a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectFilter {
    #[default]
    Active,
    Archived,
    All,
}

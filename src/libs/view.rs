use super::entry::TimeEntry;
use super::project::Project;
use super::report::Summary;
use super::timer::Listing;
use crate::db::snapshots::Snapshot;
use prettytable::{row, Table};

pub struct View {}

fn optional<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

impl View {
    pub fn listing(listing: &Listing) {
        let mut table = Table::new();

        table.add_row(row!["ID", "DATE", "PROJECT", "NOTE", "START", "END", "BILLABLE", "STATE", "HOURS", "TOTAL"]);
        for listed in &listing.rows {
            let entry = &listed.entry;
            table.add_row(row![
                entry.short_id(),
                entry.date,
                entry.project,
                optional(&entry.note),
                entry.start.time(),
                optional(&entry.end.map(|end| end.time())),
                entry.billable,
                entry.state(),
                format!("{:.4}", entry.hours),
                format!("{:.4}", listed.running_total)
            ]);
        }
        table.printstd();
    }

    pub fn entries(entries: &[TimeEntry]) {
        let mut table = Table::new();

        table.add_row(row!["ID", "PROJECT", "NOTE", "START", "PAUSES", "HOURS"]);
        for entry in entries {
            table.add_row(row![
                entry.short_id(),
                entry.project,
                optional(&entry.note),
                entry.start,
                entry.paused_counter,
                format!("{:.4}", entry.hours)
            ]);
        }
        table.printstd();
    }

    pub fn projects(projects: &[Project]) {
        let mut table = Table::new();

        table.add_row(row!["NAME", "DESCRIPTION", "BILLABLE", "CREATED", "ARCHIVED"]);
        for project in projects {
            table.add_row(row![
                project.name,
                optional(&project.description),
                project.default_billable,
                project.created,
                optional(&project.archived)
            ]);
        }
        table.printstd();
    }

    pub fn summary(summary: &Summary) {
        let mut table = Table::new();

        table.add_row(row!["DATE", "PROJECT", "BILLABLE", "HOURS", "NOTES", "PROJECT TOTAL", "DAY TOTAL"]);
        for row in &summary.rows {
            table.add_row(row![
                row.date,
                row.project,
                row.billable,
                row.hours,
                row.notes,
                row.total_project,
                row.total_day
            ]);
        }
        table.add_row(row!["", "", "", summary.total, "", "", ""]);
        table.printstd();
    }

    pub fn snapshots(snapshots: &[Snapshot]) {
        let mut table = Table::new();

        table.add_row(row!["NAME", "VERSION", "CREATED", "EXPIRES"]);
        for snapshot in snapshots {
            table.add_row(row![
                snapshot.name,
                snapshot.version.as_deref().unwrap_or("unversioned"),
                snapshot.created_at,
                optional(&snapshot.expires_at)
            ]);
        }
        table.printstd();
    }
}

//! Summaries of entries grouped by day, project and billable flag.
//!
//! Aggregation runs in two passes. The first folds entries into note-level
//! sums keyed by `(date, project, billable)`. The second derives per-project,
//! per-day and grand totals from those groups and attaches them to each row
//! by key lookup. All sums are carried in integer ten-thousandths of an hour,
//! so the three totals always agree exactly.

use crate::libs::duration::{hours_to_units, units_to_hours};
use crate::libs::entry::TimeEntry;
use crate::libs::error::LedgerResult;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Units per hour, see [`hours_to_units`].
const UNITS_PER_HOUR: i64 = 10_000;

/// How note lists are joined in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    /// One note per line, for terminal output.
    #[default]
    Newline,
    /// Single-line lists, for files.
    Comma,
}

impl Separator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Separator::Newline => "\n",
            Separator::Comma => ", ",
        }
    }
}

/// Date window of a summary, inclusive, in the user's zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// A single day. Paused entries are left out.
    Day(NaiveDate),
    /// A range of days. Paused entries count with their frozen duration.
    Range { start: NaiveDate, end: NaiveDate },
}

impl Window {
    fn admits(&self, entry: &TimeEntry) -> bool {
        match *self {
            Window::Day(date) => entry.date == date && !entry.paused,
            Window::Range { start, end } => start <= entry.date && entry.date <= end,
        }
    }

    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        match *self {
            Window::Day(date) => (date, date),
            Window::Range { start, end } => (start, end),
        }
    }
}

/// Optional predicate over entry fields. Patterns are regular expressions.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub project: Option<String>,
    pub note: Option<String>,
    pub billable: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub window: Window,
    pub filter: ReportFilter,
    pub round: bool,
    pub separator: Separator,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub project: String,
    pub billable: bool,
    pub hours: f64,
    /// `note - hours` for every note in the group, joined by the separator.
    pub notes: String,
    pub total_project: f64,
    pub total_day: f64,
    pub total_summary: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Summary {
    pub rows: Vec<ReportRow>,
    pub total: f64,
}

/// Quarter-hour step for the fractional part of an hour value.
///
/// | fraction        | step |
/// |-----------------|------|
/// | `< 0.15`        | 0    |
/// | `0.15 .. 0.35`  | 0.25 |
/// | `0.35 .. 0.625` | 0.5  |
/// | `0.625 .. 0.85` | 0.75 |
/// | `>= 0.85`       | 1    |
pub fn rounding_step(fraction: f64) -> f64 {
    units_to_hours(step_units(hours_to_units(fraction)))
}

fn step_units(fraction: i64) -> i64 {
    match fraction {
        f if f < 1_500 => 0,
        f if f < 3_500 => 2_500,
        f if f < 6_250 => 5_000,
        f if f < 8_500 => 7_500,
        _ => UNITS_PER_HOUR,
    }
}

/// Rounds an hour sum to the nearest quarter by [`rounding_step`].
pub fn round_group(hours: f64) -> f64 {
    units_to_hours(round_units(hours_to_units(hours)))
}

/// A full step carries into the whole part, which is the same as `round(sum)`.
fn round_units(units: i64) -> i64 {
    let whole = units.div_euclid(UNITS_PER_HOUR) * UNITS_PER_HOUR;
    whole + step_units(units.rem_euclid(UNITS_PER_HOUR))
}

type GroupKey = (NaiveDate, String, bool);

/// Note-level sums of one group, in first-seen order.
#[derive(Default)]
struct Group {
    notes: Vec<(Option<String>, i64)>,
}

impl Group {
    fn add(&mut self, note: Option<&str>, units: i64) {
        match self.notes.iter_mut().find(|(n, _)| n.as_deref() == note) {
            Some((_, sum)) => *sum += units,
            None => self.notes.push((note.map(str::to_string), units)),
        }
    }
}

struct Filter {
    project: Option<Regex>,
    note: Option<Regex>,
    billable: Option<bool>,
}

impl Filter {
    fn compile(filter: &ReportFilter) -> LedgerResult<Self> {
        Ok(Filter {
            project: filter.project.as_deref().map(Regex::new).transpose()?,
            note: filter.note.as_deref().map(Regex::new).transpose()?,
            billable: filter.billable,
        })
    }

    fn matches(&self, entry: &TimeEntry) -> bool {
        self.project.as_ref().map_or(true, |re| re.is_match(&entry.project))
            && self
                .note
                .as_ref()
                .map_or(true, |re| entry.note.as_deref().is_some_and(|n| re.is_match(n)))
            && self.billable.map_or(true, |billable| entry.billable == billable)
    }
}

/// Builds a summary of `entries` as of `now`.
///
/// Archived entries never count. Unfinished entries count with their live
/// duration. With rounding, note groups that round to zero are dropped, and
/// so are rows of days whose total is zero.
pub fn summarize(entries: &[TimeEntry], options: &ReportOptions, now: DateTime<Utc>) -> LedgerResult<Summary> {
    let filter = Filter::compile(&options.filter)?;

    let mut groups: BTreeMap<GroupKey, Group> = BTreeMap::new();
    for entry in entries {
        if entry.archived || !options.window.admits(entry) || !filter.matches(entry) {
            continue;
        }
        groups
            .entry((entry.date, entry.project.clone(), entry.billable))
            .or_default()
            .add(entry.note.as_deref(), hours_to_units(entry.live_hours(now)));
    }

    let mut grouped: Vec<(GroupKey, i64, Vec<(Option<String>, i64)>)> = Vec::with_capacity(groups.len());
    for (key, group) in groups {
        let notes: Vec<(Option<String>, i64)> = group
            .notes
            .into_iter()
            .map(|(note, units)| (note, if options.round { round_units(units) } else { units }))
            .filter(|(_, units)| !options.round || *units != 0)
            .collect();
        let total: i64 = notes.iter().map(|(_, units)| units).sum();
        grouped.push((key, total, notes));
    }

    let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    let mut per_project: BTreeMap<String, i64> = BTreeMap::new();
    let mut grand = 0;
    for ((date, project, _), total, _) in &grouped {
        *per_day.entry(*date).or_default() += total;
        *per_project.entry(project.clone()).or_default() += total;
        grand += total;
    }

    let mut rows = Vec::with_capacity(grouped.len());
    for ((date, project, billable), total, notes) in grouped {
        let total_day = per_day.get(&date).copied().unwrap_or_default();
        if options.round && total_day == 0 {
            continue;
        }
        let total_project = per_project.get(&project).copied().unwrap_or_default();

        rows.push(ReportRow {
            date,
            project,
            billable,
            hours: units_to_hours(total),
            notes: join_notes(&notes, options.separator),
            total_project: units_to_hours(total_project),
            total_day: units_to_hours(total_day),
            total_summary: units_to_hours(grand),
        });
    }

    Ok(Summary {
        rows,
        total: units_to_hours(grand),
    })
}

fn join_notes(notes: &[(Option<String>, i64)], separator: Separator) -> String {
    notes
        .iter()
        .filter_map(|(note, units)| note.as_ref().map(|note| format!("{} - {}", note, units_to_hours(*units))))
        .collect::<Vec<_>>()
        .join(separator.as_str())
}


#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
    use std::sync::Arc;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};
    use tock::db::db::Db;
    use tock::db::store::{EntryQuery, EntryStore, ProjectStore};
    use tock::libs::clock::ManualClock;
    use tock::libs::entry::{entry_id, EntryState, TimeEntry};
    use tock::libs::error::{LedgerError, LedgerResult};
    use tock::libs::ledger::Ledger;
    use tock::libs::project::{Project, ProjectFilter, DEFAULT_PROJECT};
    use tock::libs::timer::{EntryEdit, EntryFilter, Timer};

    struct TimerTestContext {
        _temp_dir: TempDir,
        clock: Arc<ManualClock>,
        ledger: Ledger,
    }

    impl TestContext for TimerTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", temp_dir.path());
            std::env::set_var("LOCALAPPDATA", temp_dir.path());

            let clock = Arc::new(ManualClock::new(at(8, 0)));
            let db = Db::open(temp_dir.path().join("tock.db")).unwrap();
            let ledger = Ledger::open(db, clock.clone(), chrono_tz::UTC, Duration::days(7)).unwrap();
            ledger.registry().create("acme", None, true).unwrap();

            TimerTestContext {
                _temp_dir: temp_dir,
                clock,
                ledger,
            }
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap()
    }

    fn stored(ctx: &TimerTestContext, id: &str) -> TimeEntry {
        ctx.ledger.db().fetch_entry(id).unwrap().unwrap()
    }

    /// Store that pauses `target` right before a bulk edit is written.
    struct PauseBeforeEdit<'a> {
        db: &'a Db,
        clock: &'a ManualClock,
        target: String,
    }

    impl EntryStore for PauseBeforeEdit<'_> {
        fn insert_entry(&self, entry: &TimeEntry) -> LedgerResult<()> {
            self.db.insert_entry(entry)
        }

        fn fetch_entry(&self, id: &str) -> LedgerResult<Option<TimeEntry>> {
            self.db.fetch_entry(id)
        }

        fn fetch_entries(&self, query: &EntryQuery) -> LedgerResult<Vec<TimeEntry>> {
            self.db.fetch_entries(query)
        }

        fn match_ids(&self, prefix: &str) -> LedgerResult<Vec<String>> {
            self.db.match_ids(prefix)
        }

        fn update_entry(&self, entry: &TimeEntry, expected: EntryState) -> LedgerResult<bool> {
            self.db.update_entry(entry, expected)
        }

        fn update_entries(&self, entries: &[(TimeEntry, EntryState)]) -> LedgerResult<bool> {
            Timer::new(self.db, self.clock, chrono_tz::UTC).pause(&self.target, at(10, 0))?;
            self.db.update_entries(entries)
        }

        fn set_notes(&self, ids: &[String], note: Option<&str>) -> LedgerResult<usize> {
            self.db.set_notes(ids, note)
        }

        fn delete_entry(&self, id: &str) -> LedgerResult<usize> {
            self.db.delete_entry(id)
        }
    }

    impl ProjectStore for PauseBeforeEdit<'_> {
        fn insert_project(&self, project: &Project) -> LedgerResult<()> {
            self.db.insert_project(project)
        }

        fn fetch_project(&self, name: &str) -> LedgerResult<Option<Project>> {
            self.db.fetch_project(name)
        }

        fn fetch_projects(&self, filter: ProjectFilter) -> LedgerResult<Vec<Project>> {
            self.db.fetch_projects(filter)
        }

        fn update_project(&self, project: &Project) -> LedgerResult<usize> {
            self.db.update_project(project)
        }

        fn rename_project(&self, name: &str, new_name: &str) -> LedgerResult<usize> {
            self.db.rename_project(name, new_name)
        }

        fn archive_project_entries(&self, project: &str, archived: bool) -> LedgerResult<usize> {
            self.db.archive_project_entries(project, archived)
        }

        fn delete_project(&self, name: &str) -> LedgerResult<usize> {
            self.db.delete_project(name)
        }
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_start_inherits_project_billable(ctx: &mut TimerTestContext) {
        let timer = ctx.ledger.timer();

        let entry = timer.start("acme", Some("design"), at(9, 0), None).unwrap();
        assert!(entry.billable);
        assert!(entry.active);
        assert!(!entry.paused);
        assert_eq!(entry.state(), EntryState::Running);
        assert_eq!(entry.note.as_deref(), Some("design"));

        let other = timer.start(DEFAULT_PROJECT, None, at(9, 5), Some(true)).unwrap();
        assert!(other.billable);
        assert_eq!(other.note, None);

        assert_eq!(stored(ctx, &entry.id), entry);
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_start_rejects_unknown_and_archived_projects(ctx: &mut TimerTestContext) {
        let timer = ctx.ledger.timer();
        assert!(matches!(
            timer.start("nope", None, at(9, 0), None),
            Err(LedgerError::InvalidProject(_))
        ));

        ctx.ledger.registry().archive("acme", false).unwrap();
        assert!(matches!(
            timer.start("acme", None, at(9, 0), None),
            Err(LedgerError::InvalidProject(_))
        ));
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_none_note_literal_is_absent(ctx: &mut TimerTestContext) {
        let entry = ctx.ledger.timer().start("acme", Some("None"), at(9, 0), None).unwrap();
        assert_eq!(entry.note, None);
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_full_lifecycle(ctx: &mut TimerTestContext) {
        let timer = ctx.ledger.timer();

        let entry = timer.start("acme", Some("review"), at(9, 0), None).unwrap();
        timer.pause(&entry.id, at(10, 0)).unwrap();
        timer.resume(&entry.id, at(10, 30)).unwrap();
        let stopped = timer.stop(&entry.id, at(12, 0)).unwrap();

        assert_eq!(stopped.hours, 2.5);
        assert_eq!(stopped.paused_hours, 0.5);
        assert_eq!(stopped.paused_counter, 1);
        assert_eq!(stopped.state(), EntryState::Stopped);
        assert!(!stopped.active);
        assert!(!stopped.paused);
        assert_eq!(stopped.timestamp_paused, None);
        assert_eq!(stored(ctx, &entry.id), stopped);
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_paused_entry_is_frozen_until_resumed(ctx: &mut TimerTestContext) {
        let timer = ctx.ledger.timer();
        let entry = timer.start("acme", None, at(9, 0), None).unwrap();

        let paused = timer.pause(&entry.id, at(10, 0)).unwrap();
        assert_eq!(paused.hours, 1.0);
        assert_eq!(paused.state(), EntryState::Paused);

        ctx.clock.set(at(10, 45));
        let listed = timer.paused().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].hours, 1.0);
        assert!(timer.running().unwrap().is_empty());

        timer.resume(&entry.id, at(10, 45)).unwrap();
        ctx.clock.set(at(11, 0));
        let running = timer.running().unwrap();
        assert_eq!(running.len(), 1);
        assert_eq!(running[0].hours, 1.25);
        assert_eq!(running[0].paused_hours, 0.75);
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_stop_while_paused_folds_open_pause(ctx: &mut TimerTestContext) {
        let timer = ctx.ledger.timer();
        let entry = timer.start("acme", None, at(8, 0), None).unwrap();
        timer.pause(&entry.id, at(10, 0)).unwrap();

        let stopped = timer.stop(&entry.id, at(11, 0)).unwrap();
        assert_eq!(stopped.hours, 2.0);
        assert_eq!(stopped.paused_hours, 1.0);
        assert_eq!(stopped.paused_counter, 1);
        assert!(!stopped.paused);
        assert!(!stopped.active);
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_active_and_paused_are_exclusive(ctx: &mut TimerTestContext) {
        let timer = ctx.ledger.timer();
        let entry = timer.start("acme", None, at(9, 0), None).unwrap();

        let steps: Vec<TimeEntry> = vec![
            timer.pause(&entry.id, at(9, 30)).unwrap(),
            timer.resume(&entry.id, at(9, 40)).unwrap(),
            timer.pause(&entry.id, at(9, 50)).unwrap(),
            timer.resume(&entry.id, at(10, 0)).unwrap(),
            timer.stop(&entry.id, at(11, 0)).unwrap(),
        ];
        for step in &steps {
            assert!(!(step.active && step.paused));
            let row = stored(ctx, &step.id);
            assert!(!(row.active && row.paused));
        }

        let last = steps.last().unwrap();
        assert_eq!(last.paused_counter, 2);
        assert_eq!(last.paused_hours, 0.3334);
        assert_eq!(last.hours, 1.6666);
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_invalid_transitions(ctx: &mut TimerTestContext) {
        let timer = ctx.ledger.timer();
        let entry = timer.start("acme", None, at(9, 0), None).unwrap();

        assert!(matches!(
            timer.resume(&entry.id, at(9, 10)),
            Err(LedgerError::InvalidTransition { state: EntryState::Running, .. })
        ));

        timer.pause(&entry.id, at(9, 20)).unwrap();
        assert!(matches!(
            timer.pause(&entry.id, at(9, 30)),
            Err(LedgerError::InvalidTransition { state: EntryState::Paused, .. })
        ));

        timer.stop(&entry.id, at(10, 0)).unwrap();
        for result in [
            timer.stop(&entry.id, at(10, 30)),
            timer.pause(&entry.id, at(10, 30)),
            timer.resume(&entry.id, at(10, 30)),
        ] {
            assert!(matches!(
                result,
                Err(LedgerError::InvalidTransition { state: EntryState::Stopped, .. })
            ));
        }
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_lost_race_is_reported_as_invalid_transition(ctx: &mut TimerTestContext) {
        let timer = ctx.ledger.timer();
        let entry = timer.start("acme", None, at(9, 0), None).unwrap();

        // Another request stops the entry behind the timer's back.
        let mut stopped = entry.clone();
        stopped.timestamp_end = Some(at(9, 30));
        stopped.active = false;
        assert!(ctx.ledger.db().update_entry(&stopped, EntryState::Running).unwrap());
        assert!(!ctx.ledger.db().update_entry(&entry, EntryState::Running).unwrap());

        assert!(matches!(
            timer.pause(&entry.id, at(10, 0)),
            Err(LedgerError::InvalidTransition { .. })
        ));
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_add_finished_entry(ctx: &mut TimerTestContext) {
        let timer = ctx.ledger.timer();

        let entry = timer.add("acme", Some("call"), at(13, 0), at(14, 30), Some(false)).unwrap();
        assert_eq!(entry.hours, 1.5);
        assert!(!entry.billable);
        assert_eq!(entry.state(), EntryState::Stopped);

        assert!(matches!(
            timer.add("acme", None, at(15, 0), at(14, 0), None),
            Err(LedgerError::InvalidInput(_))
        ));
        assert!(matches!(
            timer.add("acme", Some("call"), at(13, 0), at(14, 30), None),
            Err(LedgerError::InvalidInput(_))
        ));
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_edit_recomputes_hours(ctx: &mut TimerTestContext) {
        let timer = ctx.ledger.timer();
        let entry = timer.add("acme", Some("draft"), at(9, 0), at(12, 0), None).unwrap();

        let edit = EntryEdit {
            start: Some(NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
            note: Some("final".to_string()),
            billable: Some(false),
            ..Default::default()
        };
        let edited = timer.edit(&[&entry.id], &edit).unwrap();

        assert_eq!(edited.len(), 1);
        assert_eq!(edited[0].hours, 2.0);
        assert_eq!(edited[0].timestamp_start, at(10, 0));
        assert_eq!(edited[0].note.as_deref(), Some("final"));
        assert!(!edited[0].billable);
        assert_eq!(stored(ctx, &entry.id), edited[0]);
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_edit_rejections(ctx: &mut TimerTestContext) {
        let timer = ctx.ledger.timer();
        let running = timer.start("acme", None, at(9, 0), None).unwrap();
        let done = timer.add("acme", None, at(6, 0), at(7, 0), None).unwrap();

        assert!(matches!(
            timer.edit(&[&running.id], &EntryEdit::default()),
            Err(LedgerError::InvalidInput(_))
        ));

        let set_end = EntryEdit {
            end: Some(NaiveTime::from_hms_opt(11, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(matches!(
            timer.edit(&[&running.id], &set_end),
            Err(LedgerError::InvalidTransition { .. })
        ));

        let end_before_start = EntryEdit {
            end: Some(NaiveTime::from_hms_opt(5, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(matches!(
            timer.edit(&[&done.id], &end_before_start),
            Err(LedgerError::InvalidInput(_))
        ));

        let move_project = EntryEdit {
            project: Some("missing".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            timer.edit(&[&done.id], &move_project),
            Err(LedgerError::InvalidProject(_))
        ));

        // Nothing was written by the failed edits.
        assert_eq!(stored(ctx, &done.id), done);
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_edit_start_past_open_pause_clamps(ctx: &mut TimerTestContext) {
        let timer = ctx.ledger.timer();
        let entry = timer.start("acme", None, at(9, 0), None).unwrap();
        timer.pause(&entry.id, at(10, 0)).unwrap();

        let edit = EntryEdit {
            start: Some(NaiveTime::from_hms_opt(10, 30, 0).unwrap()),
            ..Default::default()
        };
        let edited = timer.edit(&[&entry.id], &edit).unwrap();
        assert_eq!(edited[0].hours, 0.0);
        assert_eq!(edited[0].state(), EntryState::Paused);
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_edit_many_entries(ctx: &mut TimerTestContext) {
        ctx.ledger.registry().create("globex", None, false).unwrap();
        let timer = ctx.ledger.timer();
        let first = timer.add("acme", None, at(6, 0), at(7, 0), None).unwrap();
        let second = timer.add("acme", None, at(7, 0), at(8, 0), None).unwrap();

        let edit = EntryEdit {
            project: Some("globex".to_string()),
            ..Default::default()
        };
        let edited = timer.edit(&[&first.id, &second.id], &edit).unwrap();

        assert!(edited.iter().all(|e| e.project == "globex"));
        assert_eq!(stored(ctx, &first.id).project, "globex");
        assert_eq!(stored(ctx, &second.id).project, "globex");
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_update_notes(ctx: &mut TimerTestContext) {
        let timer = ctx.ledger.timer();
        let a = timer.add("acme", Some("bug 12"), at(6, 0), at(7, 0), None).unwrap();
        let b = timer.add("acme", Some("bug 13"), at(7, 0), at(8, 0), None).unwrap();
        let c = timer.add("acme", Some("meeting"), at(8, 0), at(9, 0), None).unwrap();

        let updated = timer.update_notes("acme", "^bug", "bugfixing").unwrap();
        assert_eq!(updated, 2);
        assert_eq!(stored(ctx, &a.id).note.as_deref(), Some("bugfixing"));
        assert_eq!(stored(ctx, &b.id).note.as_deref(), Some("bugfixing"));
        assert_eq!(stored(ctx, &c.id).note.as_deref(), Some("meeting"));

        assert!(matches!(
            timer.update_notes("missing", ".*", "x"),
            Err(LedgerError::InvalidProject(_))
        ));
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_delete_by_prefix(ctx: &mut TimerTestContext) {
        let timer = ctx.ledger.timer();
        let template = timer.add("acme", None, at(6, 0), at(7, 0), None).unwrap();
        for id in ["abc123", "abc456"] {
            let mut entry = template.clone();
            entry.id = id.to_string();
            ctx.ledger.db().insert_entry(&entry).unwrap();
        }

        assert!(matches!(
            timer.delete("abc"),
            Err(LedgerError::AmbiguousId { matches: 2, .. })
        ));
        assert!(matches!(timer.delete("abc-1"), Err(LedgerError::InvalidInput(_))));
        assert!(matches!(timer.delete("zzz"), Err(LedgerError::NotFound(_))));

        let deleted = timer.delete("abc1").unwrap();
        assert_eq!(deleted.id, "abc123");
        assert!(ctx.ledger.db().fetch_entry("abc123").unwrap().is_none());
        assert!(ctx.ledger.db().fetch_entry("abc456").unwrap().is_some());
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_list_running_totals(ctx: &mut TimerTestContext) {
        let timer = ctx.ledger.timer();
        timer.add("acme", Some("one"), at(6, 0), at(7, 0), None).unwrap();
        timer.add(DEFAULT_PROJECT, Some("two"), at(7, 0), at(9, 0), None).unwrap();
        ctx.clock.set(at(10, 0));
        timer.start("acme", Some("three"), at(9, 30), None).unwrap();

        let listing = timer.list(&EntryFilter::default()).unwrap();
        let totals: Vec<f64> = listing.rows.iter().map(|r| r.running_total).collect();
        assert_eq!(totals, vec![1.0, 3.0, 3.5]);
        assert_eq!(listing.total, 3.5);

        let filtered = timer
            .list(&EntryFilter {
                project: Some("^acme$".to_string()),
                note: Some("t".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(filtered.rows.len(), 1);
        assert_eq!(filtered.rows[0].entry.note.as_deref(), Some("three"));
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_edit_loses_to_concurrent_pause(ctx: &mut TimerTestContext) {
        let entry = ctx.ledger.timer().start("acme", Some("design"), at(9, 0), None).unwrap();
        let other = ctx.ledger.timer().add("acme", None, at(6, 0), at(7, 0), None).unwrap();
        let store = PauseBeforeEdit {
            db: ctx.ledger.db(),
            clock: ctx.clock.as_ref(),
            target: entry.id.clone(),
        };
        let timer = Timer::new(&store, ctx.clock.as_ref(), chrono_tz::UTC);

        let edit = EntryEdit {
            billable: Some(false),
            ..Default::default()
        };
        assert!(matches!(
            timer.edit(&[&other.id, &entry.id], &edit),
            Err(LedgerError::InvalidTransition {
                state: EntryState::Paused,
                ..
            })
        ));

        let paused = stored(ctx, &entry.id);
        assert_eq!(paused.state(), EntryState::Paused);
        assert_eq!(paused.paused_counter, 1);
        assert_eq!(paused.timestamp_paused, Some(at(10, 0)));
        assert!(paused.billable);
        // All or nothing: the entry that did not race is untouched too.
        assert!(stored(ctx, &other.id).billable);
    }

    #[test_context(TimerTestContext)]
    #[test]
    fn test_update_notes_clears_with_sentinel(ctx: &mut TimerTestContext) {
        let timer = ctx.ledger.timer();
        let entry = timer.add("acme", Some("x"), at(6, 0), at(7, 0), None).unwrap();

        assert_eq!(timer.update_notes("acme", "x", "None").unwrap(), 1);
        assert_eq!(stored(ctx, &entry.id).note, None);
    }

    #[test]
    fn test_entry_id_keeps_fields_apart() {
        assert_ne!(
            entry_id("abcd", Some("e"), at(9, 0)),
            entry_id("abc", Some("de"), at(9, 0))
        );
    }
}

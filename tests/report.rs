#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use std::sync::Arc;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};
    use tock::db::db::Db;
    use tock::libs::clock::ManualClock;
    use tock::libs::ledger::Ledger;
    use tock::libs::project::DEFAULT_PROJECT;
    use tock::libs::report::{ReportFilter, ReportOptions, Separator, Summary, Window};

    struct ReportTestContext {
        _temp_dir: TempDir,
        ledger: Ledger,
    }

    impl TestContext for ReportTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", temp_dir.path());
            std::env::set_var("LOCALAPPDATA", temp_dir.path());

            let clock = Arc::new(ManualClock::new(on(6, 8, 0)));
            let db = Db::open(temp_dir.path().join("tock.db")).unwrap();
            let ledger = Ledger::open(db, clock, chrono_tz::UTC, Duration::days(7)).unwrap();
            ledger.registry().create("acme", None, true).unwrap();

            let timer = ledger.timer();
            timer.add("acme", Some("design"), on(4, 9, 0), on(4, 10, 12), None).unwrap();
            timer.add("acme", Some("design"), on(4, 10, 30), on(4, 10, 42), None).unwrap();
            timer.add("acme", Some("review"), on(4, 11, 0), on(4, 11, 6), None).unwrap();
            timer.add(DEFAULT_PROJECT, Some("admin"), on(4, 13, 0), on(4, 13, 42), None).unwrap();
            timer.add("acme", Some("design"), on(5, 9, 0), on(5, 9, 54), None).unwrap();

            ReportTestContext {
                _temp_dir: temp_dir,
                ledger,
            }
        }
    }

    fn on(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn options(window: Window, round: bool) -> ReportOptions {
        ReportOptions {
            window,
            filter: ReportFilter::default(),
            round,
            separator: Separator::Newline,
        }
    }

    fn range() -> Window {
        Window::Range {
            start: date(4),
            end: date(5),
        }
    }

    fn assert_totals_agree(summary: &Summary) {
        let units = |hours: f64| (hours * 10_000.0).round() as i64;
        let sum: i64 = summary.rows.iter().map(|r| units(r.hours)).sum();
        assert_eq!(sum, units(summary.total));
        for row in &summary.rows {
            assert_eq!(row.total_summary, summary.total);
            let day: i64 = summary.rows.iter().filter(|r| r.date == row.date).map(|r| units(r.hours)).sum();
            assert_eq!(day, units(row.total_day));
            let project: i64 = summary
                .rows
                .iter()
                .filter(|r| r.project == row.project)
                .map(|r| units(r.hours))
                .sum();
            assert_eq!(project, units(row.total_project));
        }
    }

    #[test_context(ReportTestContext)]
    #[test]
    fn test_rounded_summary(ctx: &mut ReportTestContext) {
        let summary = ctx.ledger.summary(&options(range(), true)).unwrap();

        let rows: Vec<(NaiveDate, &str, bool, f64, &str)> = summary
            .rows
            .iter()
            .map(|r| (r.date, r.project.as_str(), r.billable, r.hours, r.notes.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (date(4), "acme", true, 1.5, "design - 1.5"),
                (date(4), DEFAULT_PROJECT, false, 0.75, "admin - 0.75"),
                (date(5), "acme", true, 1.0, "design - 1"),
            ]
        );
        assert_eq!(summary.rows[0].total_day, 2.25);
        assert_eq!(summary.rows[0].total_project, 2.5);
        assert_eq!(summary.total, 3.25);
        assert_totals_agree(&summary);
    }

    #[test_context(ReportTestContext)]
    #[test]
    fn test_unrounded_summary(ctx: &mut ReportTestContext) {
        let summary = ctx.ledger.summary(&options(range(), false)).unwrap();

        assert_eq!(summary.rows.len(), 3);
        assert_eq!(summary.rows[0].hours, 1.5);
        assert_eq!(summary.rows[0].notes, "design - 1.4\nreview - 0.1");
        assert_eq!(summary.rows[1].hours, 0.7);
        assert_eq!(summary.rows[2].hours, 0.9);
        assert_eq!(summary.total, 3.1);
        assert_totals_agree(&summary);
    }

    #[test_context(ReportTestContext)]
    #[test]
    fn test_comma_separator(ctx: &mut ReportTestContext) {
        let mut opts = options(Window::Day(date(4)), false);
        opts.separator = Separator::Comma;

        let summary = ctx.ledger.summary(&opts).unwrap();
        assert_eq!(summary.rows[0].notes, "design - 1.4, review - 0.1");
    }

    #[test_context(ReportTestContext)]
    #[test]
    fn test_filters(ctx: &mut ReportTestContext) {
        let mut opts = options(range(), true);
        opts.filter = ReportFilter {
            billable: Some(false),
            ..Default::default()
        };
        let summary = ctx.ledger.summary(&opts).unwrap();
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].project, DEFAULT_PROJECT);
        assert_eq!(summary.total, 0.75);

        opts.filter = ReportFilter {
            project: Some("^ac".to_string()),
            note: Some("^des".to_string()),
            ..Default::default()
        };
        let summary = ctx.ledger.summary(&opts).unwrap();
        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.total, 2.5);
        assert_totals_agree(&summary);
    }

    #[test_context(ReportTestContext)]
    #[test]
    fn test_day_window_skips_paused_entries(ctx: &mut ReportTestContext) {
        let timer = ctx.ledger.timer();
        let entry = timer.start("acme", Some("paused"), on(4, 14, 0), None).unwrap();
        timer.pause(&entry.id, on(4, 15, 0)).unwrap();

        let day = ctx.ledger.summary(&options(Window::Day(date(4)), true)).unwrap();
        assert_eq!(day.total, 2.25);

        let range = ctx.ledger.summary(&options(range(), true)).unwrap();
        assert_eq!(range.total, 4.25);
        assert_totals_agree(&range);
    }

    #[test_context(ReportTestContext)]
    #[test]
    fn test_archived_entries_do_not_count(ctx: &mut ReportTestContext) {
        ctx.ledger.registry().archive("acme", true).unwrap();

        let summary = ctx.ledger.summary(&options(range(), true)).unwrap();
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.total, 0.75);
    }

    #[test_context(ReportTestContext)]
    #[test]
    fn test_empty_window(ctx: &mut ReportTestContext) {
        let summary = ctx.ledger.summary(&options(Window::Day(date(20)), true)).unwrap();
        assert!(summary.rows.is_empty());
        assert_eq!(summary.total, 0.0);
    }

    #[test_context(ReportTestContext)]
    #[test]
    fn test_invalid_pattern(ctx: &mut ReportTestContext) {
        let mut opts = options(range(), true);
        opts.filter.note = Some("(".to_string());
        assert!(ctx.ledger.summary(&opts).is_err());
    }

    #[test_context(ReportTestContext)]
    #[test]
    fn test_summary_serializes(ctx: &mut ReportTestContext) {
        let summary = ctx.ledger.summary(&options(range(), true)).unwrap();
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["total"], 3.25);
        assert_eq!(json["rows"][0]["date"], "2024-03-04");
        assert_eq!(json["rows"][0]["project"], "acme");
    }
}

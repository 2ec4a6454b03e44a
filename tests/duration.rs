#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use tock::libs::clock::{from_local, local_date, parse_zone, to_local, truncate, Clock, ManualClock};
    use tock::libs::duration::{duration, hours_between, round_hours, Timing};
    use tock::libs::error::LedgerError;
    use tock::libs::report::{round_group, rounding_step};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap()
    }

    fn timing(start: DateTime<Utc>) -> Timing {
        Timing {
            start,
            end: None,
            paused: false,
            paused_at: None,
            paused_hours: 0.0,
        }
    }

    #[test]
    fn test_finished_duration_subtracts_pauses() {
        let timing = Timing {
            end: Some(at(12, 0)),
            paused_hours: 0.5,
            ..timing(at(9, 0))
        };

        assert_eq!(duration(&timing, at(18, 0)), 2.5);
    }

    #[test]
    fn test_running_duration_uses_now() {
        assert_eq!(duration(&timing(at(9, 0)), at(9, 45)), 0.75);
    }

    #[test]
    fn test_paused_duration_is_frozen() {
        let timing = Timing {
            paused: true,
            paused_at: Some(at(10, 0)),
            ..timing(at(9, 0))
        };

        assert_eq!(duration(&timing, at(10, 30)), 1.0);
        assert_eq!(duration(&timing, at(23, 0)), 1.0);
    }

    #[test]
    fn test_duration_never_negative() {
        // Clock skew: "now" before the start.
        assert_eq!(duration(&timing(at(9, 0)), at(8, 0)), 0.0);

        let timing = Timing {
            end: Some(at(10, 0)),
            paused_hours: 3.0,
            ..timing(at(9, 0))
        };
        assert_eq!(duration(&timing, at(10, 0)), 0.0);
        assert_eq!(hours_between(at(10, 0), at(9, 0)), 0.0);
    }

    #[test]
    fn test_hours_are_rounded_to_four_places() {
        let start = at(9, 0);
        let end = start + chrono::Duration::seconds(1);

        assert_eq!(hours_between(start, end), 0.0003);
        assert_eq!(round_hours(1.23456), 1.2346);
    }

    #[test]
    fn test_rounding_steps() {
        assert_eq!(rounding_step(0.10), 0.0);
        assert_eq!(rounding_step(0.20), 0.25);
        assert_eq!(rounding_step(0.40), 0.5);
        assert_eq!(rounding_step(0.70), 0.75);
        assert_eq!(rounding_step(0.90), 1.0);
    }

    #[test]
    fn test_round_group_carries_into_whole_hours() {
        assert_eq!(round_group(2.1), 2.0);
        assert_eq!(round_group(2.3), 2.25);
        assert_eq!(round_group(2.9), 3.0);
        assert_eq!(round_group(0.1), 0.0);
    }

    #[test]
    fn test_local_projection_and_truncation() {
        let berlin = parse_zone("Europe/Berlin").unwrap();
        let instant = Utc.with_ymd_and_hms(2024, 3, 4, 23, 30, 15).unwrap() + chrono::Duration::milliseconds(900);

        assert_eq!(truncate(instant), Utc.with_ymd_and_hms(2024, 3, 4, 23, 30, 15).unwrap());
        assert_eq!(
            to_local(instant, &berlin),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(0, 30, 15).unwrap()
        );
        assert_eq!(local_date(instant, &berlin), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_from_local_rejects_skipped_times() {
        let berlin = parse_zone("Europe/Berlin").unwrap();
        // 2024-03-31 02:30 does not exist in Berlin.
        let skipped = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap().and_hms_opt(2, 30, 0).unwrap();
        assert!(matches!(from_local(skipped, &berlin), Err(LedgerError::InvalidInput(_))));

        let normal = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap().and_hms_opt(10, 0, 0).unwrap();
        assert_eq!(from_local(normal, &berlin).unwrap(), at(9, 0));
    }

    #[test]
    fn test_unknown_zone() {
        assert!(matches!(parse_zone("Mars/Olympus"), Err(LedgerError::InvalidInput(_))));
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(at(9, 0));
        clock.advance(chrono::Duration::minutes(90));
        assert_eq!(clock.now(), at(10, 30));

        clock.set(at(8, 0));
        assert_eq!(clock.now(), at(8, 0));
    }
}

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, info, instrument, warn};

use super::{
    identity::{IdentityMap, ResolvedIdentity},
    period::Period,
    source::AttendanceSources,
};
use crate::{
    error::AttendanceError,
    model::{
        attendance::{AttendanceDaySummary, PunchEvent, RawPunch},
        employee::EmployeeIdentity,
    },
};

/// Length of a standard working day in hours.
pub const STANDARD_DAY_HOURS: f64 = 8.0;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Validates a raw punch. Naive timestamps are taken as UTC.
pub fn parse_punch(raw: &RawPunch) -> Result<PunchEvent, AttendanceError> {
    let text = raw.punch_time.trim();

    let timestamp = DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|naive| naive.and_utc())
        })
        .ok_or_else(|| {
            AttendanceError::MalformedEvent(format!(
                "device {} sent unparseable timestamp '{}'",
                raw.device_id, raw.punch_time
            ))
        })?;

    Ok(PunchEvent {
        device_id: raw.device_id.clone(),
        timestamp,
    })
}

/// Running first/last punch for one employee-day.
struct DaySpan {
    identity: ResolvedIdentity,
    first: DateTime<Utc>,
    last: DateTime<Utc>,
}

impl DaySpan {
    fn record(&mut self, at: DateTime<Utc>) {
        if at < self.first {
            self.first = at;
        }
        if at > self.last {
            self.last = at;
        }
    }

    fn into_summary(self) -> AttendanceDaySummary {
        let elapsed = (self.last - self.first).num_milliseconds() as f64 / 3_600_000.0;
        let working_hours = round2(elapsed.max(0.0));
        let work_value = round2((working_hours / STANDARD_DAY_HOURS).clamp(0.0, 1.0));
        let overtime_hours = round2((working_hours - STANDARD_DAY_HOURS).max(0.0));

        AttendanceDaySummary {
            employee_id: self.identity.employee_id,
            employee_code: self.identity.display_code,
            employee_name: self.identity.display_name,
            linked: self.identity.linked,
            date: self.first.date_naive(),
            check_in: self.first,
            check_out: self.last,
            working_hours,
            work_value,
            overtime_hours,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Collapses raw punches into one summary per employee per UTC day.
///
/// Malformed punches and punches outside `period` are skipped. Input order
/// does not matter; output is ordered by employee id, then date.
pub fn summarize(
    period: Period,
    roster: &[EmployeeIdentity],
    punches: &[RawPunch],
) -> Vec<AttendanceDaySummary> {
    let identities = IdentityMap::from_roster(roster);
    if identities.is_empty() && !punches.is_empty() {
        warn!("No roster employee has a numeric code, every punch will be unlinked");
    }
    let mut days: BTreeMap<(String, NaiveDate), DaySpan> = BTreeMap::new();
    let mut malformed = 0usize;

    for raw in punches {
        let event = match parse_punch(raw) {
            Ok(event) => event,
            Err(e) => {
                malformed += 1;
                debug!(error = %e, "Skipping punch event");
                continue;
            }
        };

        if !period.contains(event.timestamp) {
            continue;
        }

        let identity = identities.resolve(&event.device_id);
        let key = (identity.employee_id.clone(), event.timestamp.date_naive());

        days.entry(key)
            .and_modify(|span| span.record(event.timestamp))
            .or_insert(DaySpan {
                identity,
                first: event.timestamp,
                last: event.timestamp,
            });
    }

    if malformed > 0 {
        info!(malformed, "Skipped malformed punch events");
    }

    days.into_values().map(DaySpan::into_summary).collect()
}

/// Reads the roster and the month's punches, then summarizes them.
///
/// Either collaborator failing aborts the whole report.
#[instrument(skip(sources), fields(year = period.year(), month = period.month()))]
pub async fn aggregate_month(
    sources: &AttendanceSources,
    period: Period,
) -> Result<Vec<AttendanceDaySummary>, AttendanceError> {
    let (start, end) = period.bounds();

    let roster = sources.roster.list_employees().await.map_err(|e| {
        tracing::error!(error = ?e, "Roster source failed");
        AttendanceError::UpstreamUnavailable(format!("roster: {e:#}"))
    })?;

    let punches = sources
        .punches
        .query_events(start, end)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, "Punch event source failed");
            AttendanceError::UpstreamUnavailable(format!("punch events: {e:#}"))
        })?;

    let summaries = summarize(period, &roster, &punches);

    info!(
        employees = roster.len(),
        punches = punches.len(),
        summaries = summaries.len(),
        "Attendance aggregated"
    );

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::testing::{FailingSource, StaticPunches, StaticRoster};
    use chrono::TimeZone;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn july() -> Period {
        Period::new(2024, 7).unwrap()
    }

    fn roster() -> Vec<EmployeeIdentity> {
        vec![
            EmployeeIdentity::new("E1", "NV00001", "An Tran"),
            EmployeeIdentity::new("E7", "NV00007", "Binh Le"),
        ]
    }

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 10, h, m, 0).unwrap()
    }

    #[test]
    fn scenario_overtime_day() {
        let punches = vec![
            RawPunch::new("00007", "2024-07-10T01:00:00Z"),
            RawPunch::new("00007", "2024-07-10T10:30:00Z"),
        ];

        let out = summarize(july(), &roster(), &punches);
        assert_eq!(out.len(), 1);

        let day = &out[0];
        assert_eq!(day.employee_id, "E7");
        assert_eq!(day.employee_code, "NV00007");
        assert!(day.linked);
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 7, 10).unwrap());
        assert_eq!(day.check_in, utc(1, 0));
        assert_eq!(day.check_out, utc(10, 30));
        assert_eq!(day.working_hours, 9.5);
        assert_eq!(day.work_value, 1.0);
        assert_eq!(day.overtime_hours, 1.5);
    }

    #[test]
    fn single_punch_is_a_zero_day() {
        let punches = vec![RawPunch::new("1", "2024-07-03 08:00:00")];
        let out = summarize(july(), &roster(), &punches);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].check_in, out[0].check_out);
        assert_eq!(out[0].working_hours, 0.0);
        assert_eq!(out[0].work_value, 0.0);
        assert_eq!(out[0].overtime_hours, 0.0);
    }

    #[test]
    fn partial_day_work_value_and_rounding() {
        let punches = vec![
            RawPunch::new("1", "2024-07-04 08:00:00"),
            RawPunch::new("1", "2024-07-04 12:20:00"),
        ];
        let out = summarize(july(), &roster(), &punches);

        // 4h20m
        assert_eq!(out[0].working_hours, 4.33);
        assert_eq!(out[0].work_value, 0.54);
        assert_eq!(out[0].overtime_hours, 0.0);
    }

    #[test]
    fn long_day_is_clamped_to_one() {
        let punches = vec![
            RawPunch::new("7", "2024-07-11T00:05:00Z"),
            RawPunch::new("7", "2024-07-11T23:55:00Z"),
        ];
        let out = summarize(july(), &roster(), &punches);

        assert_eq!(out[0].work_value, 1.0);
        assert_eq!(out[0].working_hours, 23.83);
        assert_eq!(out[0].overtime_hours, 15.83);
    }

    #[test]
    fn middle_punches_do_not_move_the_span() {
        let punches = vec![
            RawPunch::new("1", "2024-07-05 12:00:00"),
            RawPunch::new("1", "2024-07-05 17:00:00"),
            RawPunch::new("1", "2024-07-05 09:00:00"),
            RawPunch::new("1", "2024-07-05 13:00:00"),
        ];
        let out = summarize(july(), &roster(), &punches);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].working_hours, 8.0);
        assert_eq!(out[0].work_value, 1.0);
        assert_eq!(out[0].overtime_hours, 0.0);
    }

    #[test]
    fn days_and_employees_are_split() {
        let punches = vec![
            RawPunch::new("1", "2024-07-01 08:00:00"),
            RawPunch::new("1", "2024-07-02 08:00:00"),
            RawPunch::new("00007", "2024-07-01 09:00:00"),
            RawPunch::new("7", "2024-07-01 17:00:00"),
        ];
        let out = summarize(july(), &roster(), &punches);

        let keys: Vec<_> = out
            .iter()
            .map(|s| (s.employee_id.as_str(), s.date.to_string()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("E1", "2024-07-01".to_string()),
                ("E1", "2024-07-02".to_string()),
                ("E7", "2024-07-01".to_string()),
            ]
        );
        assert_eq!(out[2].working_hours, 8.0);
    }

    #[test]
    fn padded_and_bare_device_ids_merge() {
        let punches = vec![
            RawPunch::new("00001", "2024-07-08 08:00:00"),
            RawPunch::new("1", "2024-07-08 16:00:00"),
        ];
        let out = summarize(july(), &roster(), &punches);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].employee_id, "E1");
        assert_eq!(out[0].working_hours, 8.0);
    }

    #[test]
    fn unmapped_device_is_kept_as_placeholder() {
        let punches = vec![RawPunch::new("00042", "2024-07-09 08:00:00")];
        let out = summarize(july(), &roster(), &punches);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].employee_id, "finger:42");
        assert!(!out[0].linked);
    }

    #[test]
    fn malformed_and_out_of_window_events_are_skipped() {
        let punches = vec![
            RawPunch::new("1", "not a time"),
            RawPunch::new("1", ""),
            RawPunch::new("1", "2024-08-01T00:00:00Z"),
            RawPunch::new("1", "2024-06-30T23:59:59Z"),
            RawPunch::new("1", "2024-07-31T23:59:59Z"),
        ];
        let out = summarize(july(), &roster(), &punches);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date, NaiveDate::from_ymd_opt(2024, 7, 31).unwrap());
    }

    #[test]
    fn date_follows_utc_not_offset() {
        // 2024-07-10 23:30 at -05:00 is already the 11th in UTC
        let punches = vec![RawPunch::new("1", "2024-07-10T23:30:00-05:00")];
        let out = summarize(july(), &roster(), &punches);

        assert_eq!(out[0].date, NaiveDate::from_ymd_opt(2024, 7, 11).unwrap());
        assert_eq!(
            out[0].check_in,
            Utc.with_ymd_and_hms(2024, 7, 11, 4, 30, 0).unwrap()
        );
    }

    #[test]
    fn parse_accepts_device_formats() {
        for text in [
            "2024-07-10T01:00:00Z",
            "2024-07-10T08:00:00+07:00",
            "2024-07-10 01:00:00",
            "2024-07-10 01:00:00.000",
            "2024-07-10T01:00:00",
        ] {
            let event = parse_punch(&RawPunch::new("1", text)).unwrap();
            assert_eq!(event.timestamp, utc(1, 0), "{text}");
        }

        assert!(matches!(
            parse_punch(&RawPunch::new("1", "10/07/2024 01:00")),
            Err(AttendanceError::MalformedEvent(_))
        ));
    }

    #[test]
    fn same_input_gives_identical_output() {
        let punches = vec![
            RawPunch::new("1", "2024-07-01 08:00:00"),
            RawPunch::new("99", "2024-07-01 09:00:00"),
            RawPunch::new("7", "2024-07-02 10:00:00"),
        ];

        assert_eq!(
            summarize(july(), &roster(), &punches),
            summarize(july(), &roster(), &punches)
        );
    }

    fn punch_strategy() -> impl Strategy<Value = RawPunch> {
        (
            prop::sample::select(vec!["1", "00001", "7", "0007", "42"]),
            1u32..=31,
            0u32..24,
            0u32..60,
        )
            .prop_map(|(device, day, hour, minute)| {
                RawPunch::new(
                    device,
                    format!("2024-07-{day:02}T{hour:02}:{minute:02}:00Z"),
                )
            })
    }

    proptest! {
        #[test]
        fn output_ignores_input_order(
            (punches, shuffled) in prop::collection::vec(punch_strategy(), 0..40)
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        ) {
            let expected = summarize(july(), &roster(), &punches);
            let actual = summarize(july(), &roster(), &shuffled);
            prop_assert_eq!(expected, actual);
        }

        #[test]
        fn work_value_stays_in_unit_range(punches in prop::collection::vec(punch_strategy(), 1..40)) {
            for day in summarize(july(), &roster(), &punches) {
                prop_assert!((0.0..=1.0).contains(&day.work_value));
                prop_assert!(day.overtime_hours >= 0.0);
                prop_assert!(day.check_in <= day.check_out);
                if day.working_hours > STANDARD_DAY_HOURS {
                    prop_assert_eq!(day.work_value, 1.0);
                }
            }
        }
    }

    #[actix_web::test]
    async fn aggregate_reads_both_sources() {
        let sources = AttendanceSources::new(
            Arc::new(StaticPunches(vec![
                RawPunch::new("00007", "2024-07-10T01:00:00Z"),
                RawPunch::new("00007", "2024-07-10T10:30:00Z"),
                RawPunch::new("00007", "2024-08-01T00:00:00Z"),
            ])),
            Arc::new(StaticRoster(roster())),
        );

        let out = aggregate_month(&sources, july()).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].overtime_hours, 1.5);
    }

    #[actix_web::test]
    async fn upstream_failure_aborts_without_partial_output() {
        let roster_down = AttendanceSources::new(
            Arc::new(StaticPunches(vec![RawPunch::new("1", "2024-07-01 08:00:00")])),
            Arc::new(FailingSource),
        );
        let err = aggregate_month(&roster_down, july()).await.unwrap_err();
        assert!(matches!(err, AttendanceError::UpstreamUnavailable(ref m) if m.starts_with("roster")));

        let punches_down = AttendanceSources::new(
            Arc::new(FailingSource),
            Arc::new(StaticRoster(roster())),
        );
        let err = aggregate_month(&punches_down, july()).await.unwrap_err();
        assert!(matches!(err, AttendanceError::UpstreamUnavailable(ref m) if m.starts_with("punch events")));
    }
}

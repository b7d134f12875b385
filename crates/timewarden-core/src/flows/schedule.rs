//! Schedule editor modal: a seven-row draft of daily hour allowances
//! and time windows, submitted wholesale.

use std::collections::BTreeMap;
use std::time::Duration;

use timewarden_api::{Day, Schedule, ScheduleUpdateRequest};

use crate::event::Notice;
use crate::flows::SubmitStatus;
use crate::session::{CallError, Session};

pub const CLOSE_DELAY: Duration = Duration::from_millis(1000);

pub const LOAD_FAILED: &str = "Failed to load schedule data";
const SUCCESS: &str = "Schedule saved successfully";
const FAILED: &str = "Failed to save schedule";

/// Hour allowances move in quarter-hour steps within a day.
pub const HOURS_STEP: f64 = 0.25;
const HOURS_MAX: f64 = 24.0;

/// One editable day: allowed hours plus a time window.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRow {
    pub hours: f64,
    pub start: String,
    pub end: String,
}

impl DayRow {
    fn from_stored(schedule: &Schedule, day: Day) -> Self {
        let interval = schedule.interval_for(day);
        Self {
            hours: schedule.hours_for(day),
            start: interval.start_time,
            end: interval.end_time,
        }
    }
}

/// State of one open schedule editor.
#[derive(Debug, Clone)]
pub struct ScheduleDraft {
    user_id: i64,
    username: String,
    rows: BTreeMap<Day, DayRow>,
    /// When unset, the submitted request omits all time fields and the
    /// backend keeps or defaults the stored windows.
    pub time_ranges_enabled: bool,
    /// Staging value for the set-weekdays/weekends/all shortcuts.
    pub bulk_hours: f64,
    pub status: SubmitStatus,
}

impl ScheduleDraft {
    /// Build a draft from the stored schedule. A user with no stored
    /// schedule edits all-zero hours and whole-day windows.
    pub fn from_stored(user_id: i64, username: impl Into<String>, stored: &Schedule) -> Self {
        let rows = Day::ALL
            .iter()
            .map(|&day| (day, DayRow::from_stored(stored, day)))
            .collect();
        let time_ranges_enabled = stored.intervals.values().any(|i| !i.is_default());
        Self {
            user_id,
            username: username.into(),
            rows,
            time_ranges_enabled,
            bulk_hours: 0.0,
            status: SubmitStatus::Idle,
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn row(&self, day: Day) -> &DayRow {
        // Every Day key is inserted at construction.
        &self.rows[&day]
    }

    // ── Hour editing ─────────────────────────────────────────────────

    pub fn adjust_hours(&mut self, day: Day, delta: f64) {
        if let Some(row) = self.rows.get_mut(&day) {
            row.hours = clamp_hours(row.hours + delta);
        }
    }

    pub fn adjust_bulk(&mut self, delta: f64) {
        self.bulk_hours = clamp_hours(self.bulk_hours + delta);
    }

    /// Copy the bulk value into every row in `days`.
    pub fn apply_bulk(&mut self, days: &[Day]) {
        for &day in days {
            if let Some(row) = self.rows.get_mut(&day) {
                row.hours = self.bulk_hours;
            }
        }
    }

    // ── Time window editing ──────────────────────────────────────────

    pub fn set_start(&mut self, day: Day, value: impl Into<String>) {
        if let Some(row) = self.rows.get_mut(&day) {
            row.start = value.into();
        }
    }

    pub fn set_end(&mut self, day: Day, value: impl Into<String>) {
        if let Some(row) = self.rows.get_mut(&day) {
            row.end = value.into();
        }
    }

    /// Apply one window to all seven days. Both bounds are zero-padded
    /// `HH:MM`, so the ordering check can compare them lexically.
    pub fn set_time_range_all(&mut self, start: &str, end: &str) -> Notice {
        if start.is_empty() || end.is_empty() {
            return Notice::warning("Please enter both start and end times");
        }
        if start >= end {
            return Notice::warning("Start time must be before end time");
        }
        for row in self.rows.values_mut() {
            row.start = start.to_owned();
            row.end = end.to_owned();
        }
        Notice::success(format!("Time range {start} - {end} applied to all days"))
    }

    // ── Submission ───────────────────────────────────────────────────

    /// The wire request for the current draft. Time fields are present
    /// only when time ranges are enabled -- all fourteen, or none.
    pub fn request(&self) -> ScheduleUpdateRequest {
        let hours = |day| self.row(day).hours;
        let start = |day| {
            self.time_ranges_enabled
                .then(|| self.row(day).start.clone())
        };
        let end = |day| self.time_ranges_enabled.then(|| self.row(day).end.clone());

        ScheduleUpdateRequest {
            user_id: self.user_id,
            monday: hours(Day::Monday),
            tuesday: hours(Day::Tuesday),
            wednesday: hours(Day::Wednesday),
            thursday: hours(Day::Thursday),
            friday: hours(Day::Friday),
            saturday: hours(Day::Saturday),
            sunday: hours(Day::Sunday),
            monday_start_time: start(Day::Monday),
            monday_end_time: end(Day::Monday),
            tuesday_start_time: start(Day::Tuesday),
            tuesday_end_time: end(Day::Tuesday),
            wednesday_start_time: start(Day::Wednesday),
            wednesday_end_time: end(Day::Wednesday),
            thursday_start_time: start(Day::Thursday),
            thursday_end_time: end(Day::Thursday),
            friday_start_time: start(Day::Friday),
            friday_end_time: end(Day::Friday),
            saturday_start_time: start(Day::Saturday),
            saturday_end_time: end(Day::Saturday),
            sunday_start_time: start(Day::Sunday),
            sunday_end_time: end(Day::Sunday),
        }
    }
}

fn clamp_hours(value: f64) -> f64 {
    value.clamp(0.0, HOURS_MAX)
}

/// Fetch the stored schedule and open a draft for it. On failure the
/// modal never opens; an error toast says why.
pub async fn load_schedule(
    session: &Session,
    user_id: i64,
    username: &str,
) -> Option<ScheduleDraft> {
    match session
        .settle(session.api().schedule_sync_status(user_id).await)
    {
        Ok(status) => {
            let stored = status.schedule.unwrap_or_default();
            Some(ScheduleDraft::from_stored(user_id, username, &stored))
        }
        Err(CallError::LoggedOut) => None,
        Err(_) => {
            session.notify(Notice::error(LOAD_FAILED));
            None
        }
    }
}

/// Submit the draft and report the modal's resulting status line.
pub async fn submit_schedule(session: &Session, req: &ScheduleUpdateRequest) -> SubmitStatus {
    match session.settle(session.api().update_schedule(req).await) {
        Ok(_) => SubmitStatus::Succeeded(SUCCESS.to_owned()),
        Err(CallError::Rejected(message)) => SubmitStatus::Failed(message),
        Err(_) => SubmitStatus::Failed(FAILED.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use timewarden_api::Interval;

    use super::*;
    use crate::event::NoticeKind;

    fn draft() -> ScheduleDraft {
        ScheduleDraft::from_stored(9, "kid", &Schedule::default())
    }

    #[test]
    fn missing_schedule_defaults_to_zero_hours_whole_day() {
        let d = draft();
        for day in Day::ALL {
            assert!(d.row(day).hours.abs() < f64::EPSILON);
            assert_eq!(d.row(day).start, Interval::DEFAULT_START);
            assert_eq!(d.row(day).end, Interval::DEFAULT_END);
        }
        assert!(!d.time_ranges_enabled);
    }

    #[test]
    fn custom_window_enables_time_ranges() {
        let mut stored = Schedule::default();
        stored.intervals.insert(
            Day::Friday,
            Interval {
                start_time: "16:00".to_owned(),
                end_time: "20:00".to_owned(),
            },
        );
        let d = ScheduleDraft::from_stored(9, "kid", &stored);
        assert!(d.time_ranges_enabled);
    }

    #[test]
    fn hours_clamp_at_bounds() {
        let mut d = draft();
        d.adjust_hours(Day::Monday, -HOURS_STEP);
        assert!(d.row(Day::Monday).hours.abs() < f64::EPSILON);

        d.adjust_hours(Day::Monday, 30.0);
        assert!((d.row(Day::Monday).hours - 24.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bulk_apply_touches_only_selected_days() {
        let mut d = draft();
        d.adjust_bulk(2.0);
        d.apply_bulk(&Day::WEEKDAYS);

        assert!((d.row(Day::Friday).hours - 2.0).abs() < f64::EPSILON);
        assert!(d.row(Day::Saturday).hours.abs() < f64::EPSILON);

        d.adjust_bulk(1.0);
        d.apply_bulk(&Day::WEEKEND);
        assert!((d.row(Day::Sunday).hours - 3.0).abs() < f64::EPSILON);
        assert!((d.row(Day::Monday).hours - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn time_range_all_validates_before_applying() {
        let mut d = draft();

        let notice = d.set_time_range_all("", "20:00");
        assert_eq!(notice.kind, NoticeKind::Warning);

        let notice = d.set_time_range_all("20:00", "08:00");
        assert_eq!(notice.kind, NoticeKind::Warning);
        assert_eq!(d.row(Day::Monday).start, Interval::DEFAULT_START);

        let notice = d.set_time_range_all("08:00", "20:00");
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(
            notice.message,
            "Time range 08:00 - 20:00 applied to all days"
        );
        for day in Day::ALL {
            assert_eq!(d.row(day).start, "08:00");
            assert_eq!(d.row(day).end, "20:00");
        }
    }

    #[test]
    fn equal_bounds_are_rejected() {
        let mut d = draft();
        let notice = d.set_time_range_all("10:00", "10:00");
        assert_eq!(notice.kind, NoticeKind::Warning);
    }

    #[test]
    fn request_sends_time_fields_only_when_enabled() {
        let mut d = draft();
        d.adjust_hours(Day::Saturday, 2.0);

        d.time_ranges_enabled = false;
        let json = serde_json::to_value(d.request()).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 8);

        d.time_ranges_enabled = true;
        let json = serde_json::to_value(d.request()).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 22);
        assert_eq!(json["monday_start_time"], "00:00");
        assert_eq!(json["saturday"], 2.0);
    }
}

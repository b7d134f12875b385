//! Wire types for the screen-time administration API.
//!
//! Every response carries a `success` flag and an optional `message`;
//! the client strips that envelope and maps `success: false` into
//! [`Error::Rejected`](crate::Error::Rejected), so these types model
//! the payload only.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Days of the week ─────────────────────────────────────────────────

/// Day of the week, serialized the way the backend keys schedules
/// (`"monday"` .. `"sunday"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// All days, Monday first, matching the schedule editor's row order.
    pub const ALL: [Day; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    pub const WEEKDAYS: [Day; 5] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
    ];

    pub const WEEKEND: [Day; 2] = [Self::Saturday, Self::Sunday];

    pub fn is_weekend(self) -> bool {
        matches!(self, Self::Saturday | Self::Sunday)
    }

    /// Full name for schedule rows ("Monday").
    pub fn name(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    /// Three-letter abbreviation for chart labels ("Mon").
    pub fn abbrev(self) -> &'static str {
        match self {
            Self::Monday => "Mon",
            Self::Tuesday => "Tue",
            Self::Wednesday => "Wed",
            Self::Thursday => "Thu",
            Self::Friday => "Fri",
            Self::Saturday => "Sat",
            Self::Sunday => "Sun",
        }
    }
}

impl From<chrono::Weekday> for Day {
    fn from(wd: chrono::Weekday) -> Self {
        match wd {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

// ── Envelope ─────────────────────────────────────────────────────────

/// The bare `{success, message}` envelope. Also the full payload of
/// mutation endpoints (add/validate/delete user, modify-time,
/// schedule update, change-password).
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl Ack {
    /// The server message, or a caller-supplied fallback.
    pub fn message_or(self, fallback: &str) -> String {
        self.message.unwrap_or_else(|| fallback.to_owned())
    }
}

// ── Login ────────────────────────────────────────────────────────────

/// Successful `/login` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginGrant {
    pub token: String,
}

// ── Users ────────────────────────────────────────────────────────────

/// One monitored account, as returned by `/dashboard` and `/admin`.
///
/// Rebuilt wholesale on every fetch; nothing in this client patches a
/// `UserSummary` incrementally.
#[derive(Debug, Clone, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub system_ip: String,
    /// Human-readable remaining time for today (backend-formatted).
    #[serde(default)]
    pub time_left: Option<String>,
    #[serde(default)]
    pub last_checked: Option<String>,
    /// Backend-formatted pending time adjustment awaiting sync.
    #[serde(default)]
    pub pending_adjustment: Option<String>,
    #[serde(default)]
    pub pending_schedule: bool,
    #[serde(default)]
    pub is_valid: bool,
}

/// Roster payload shared by `/dashboard` and `/admin`.
#[derive(Debug, Clone, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub users: Vec<UserSummary>,
}

// ── SSH status ───────────────────────────────────────────────────────

/// `/ssh-status` payload. A missing key is advisory, not fatal: the
/// dashboard still loads, with a warning toast carrying `message`.
#[derive(Debug, Clone, Deserialize)]
pub struct SshStatus {
    #[serde(default)]
    pub ssh_key_exists: bool,
    #[serde(default)]
    pub message: String,
}

// ── Schedules ────────────────────────────────────────────────────────

/// Allowed time-of-day window for one day, as zero-padded `HH:MM`
/// strings. The fixed width is what makes lexical comparison of these
/// values a valid ordering check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start_time: String,
    pub end_time: String,
}

impl Interval {
    pub const DEFAULT_START: &'static str = "00:00";
    pub const DEFAULT_END: &'static str = "23:59";

    /// Whether this interval is the backend's "whole day" default.
    pub fn is_default(&self) -> bool {
        self.start_time == Self::DEFAULT_START && self.end_time == Self::DEFAULT_END
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self {
            start_time: Self::DEFAULT_START.to_owned(),
            end_time: Self::DEFAULT_END.to_owned(),
        }
    }
}

/// Stored weekly schedule: allowed hours per day plus optional
/// per-day time windows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub hours: BTreeMap<Day, f64>,
    #[serde(default)]
    pub intervals: BTreeMap<Day, Interval>,
}

impl Schedule {
    pub fn hours_for(&self, day: Day) -> f64 {
        self.hours.get(&day).copied().unwrap_or(0.0)
    }

    pub fn interval_for(&self, day: Day) -> Interval {
        self.intervals.get(&day).cloned().unwrap_or_default()
    }
}

/// `/schedule-sync-status/{id}` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncStatus {
    #[serde(default)]
    pub is_synced: bool,
    #[serde(default)]
    pub last_synced: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub schedule: Option<Schedule>,
}

// ── Usage ────────────────────────────────────────────────────────────

/// One day of recorded usage.
#[derive(Debug, Clone, Deserialize)]
pub struct UsagePoint {
    pub date: NaiveDate,
    pub hours: f64,
}

/// `/user/{id}/usage` payload: up to 7 trailing days.
#[derive(Debug, Clone, Deserialize)]
pub struct UsageSeries {
    #[serde(default)]
    pub data: Vec<UsagePoint>,
}

// ── Mutation requests ────────────────────────────────────────────────

/// Sign of a time adjustment, encoded as a separate field on the wire;
/// the magnitude travels unsigned in `seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operation {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
}

/// `/modify-time` request body.
#[derive(Debug, Clone, Serialize)]
pub struct TimeAdjustmentRequest {
    pub user_id: i64,
    pub operation: Operation,
    pub seconds: u64,
}

/// `/schedule/update` request body.
///
/// The seven hour fields are always sent. The start/end time fields are
/// sent only when the schedule editor's time-ranges checkbox is set;
/// omitting them tells the backend to retain or default the intervals.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleUpdateRequest {
    pub user_id: i64,
    pub monday: f64,
    pub tuesday: f64,
    pub wednesday: f64,
    pub thursday: f64,
    pub friday: f64,
    pub saturday: f64,
    pub sunday: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monday_start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monday_end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuesday_start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuesday_end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wednesday_start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wednesday_end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thursday_start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thursday_end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friday_start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friday_end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturday_start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturday_end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunday_start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunday_end_time: Option<String>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn day_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Day::Monday).unwrap(), "\"monday\"");
    }

    #[test]
    fn schedule_deserializes_day_keyed_maps() {
        let sched: Schedule = serde_json::from_str(
            r#"{
                "hours": {"monday": 2.5, "sunday": 0},
                "intervals": {"monday": {"start_time": "08:00", "end_time": "20:00"}}
            }"#,
        )
        .unwrap();

        assert!((sched.hours_for(Day::Monday) - 2.5).abs() < f64::EPSILON);
        assert!(sched.hours_for(Day::Tuesday).abs() < f64::EPSILON);
        assert_eq!(sched.interval_for(Day::Monday).start_time, "08:00");
        assert!(sched.interval_for(Day::Friday).is_default());
    }

    #[test]
    fn operation_serializes_as_sign() {
        let req = TimeAdjustmentRequest {
            user_id: 3,
            operation: Operation::Subtract,
            seconds: 900,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["operation"], "-");
        assert_eq!(json["seconds"], 900);
    }

    #[test]
    fn schedule_update_omits_unset_time_fields() {
        let req = ScheduleUpdateRequest {
            user_id: 1,
            monday: 1.0,
            tuesday: 1.0,
            wednesday: 1.0,
            thursday: 1.0,
            friday: 1.0,
            saturday: 2.0,
            sunday: 2.0,
            monday_start_time: None,
            monday_end_time: None,
            tuesday_start_time: None,
            tuesday_end_time: None,
            wednesday_start_time: None,
            wednesday_end_time: None,
            thursday_start_time: None,
            thursday_end_time: None,
            friday_start_time: None,
            friday_end_time: None,
            saturday_start_time: None,
            saturday_end_time: None,
            sunday_start_time: None,
            sunday_end_time: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 8, "user_id + 7 day fields only, got {keys:?}");
    }
}

//! Pure data preparation for the per-user weekly usage chart.
//!
//! Everything here maps API payloads to render-ready bars; drawing is
//! the UI crate's job.

use chrono::{Datelike, Duration, NaiveDate};
use timewarden_api::{Day, UsagePoint};

/// One bar of a weekly usage chart.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBar {
    /// `"Today"` for today's bar, otherwise abbreviated weekday plus
    /// day of month (`"Mon 3"`).
    pub label: String,
    pub hours: f64,
    /// Weekend bars render in the accent color. Derived from the
    /// actual date, so today's bar stays weekend-colored even though
    /// its label is `"Today"`.
    pub weekend: bool,
}

impl DayBar {
    fn new(date: NaiveDate, hours: f64, today: NaiveDate) -> Self {
        let day = Day::from(date.weekday());
        let label = if date == today {
            "Today".to_owned()
        } else {
            format!("{} {}", day.abbrev(), date.day())
        };
        Self {
            label,
            hours,
            weekend: day.is_weekend(),
        }
    }
}

/// Bars for a fetched usage series, in the order the backend returned
/// them (oldest first, up to 7 days).
pub fn week_bars(points: &[UsagePoint], today: NaiveDate) -> Vec<DayBar> {
    points
        .iter()
        .map(|p| DayBar::new(p.date, p.hours, today))
        .collect()
}

/// A zeroed trailing week ending today, shown when usage data could
/// not be fetched so the card keeps its chart area instead of
/// collapsing.
pub fn synthetic_week(today: NaiveDate) -> Vec<DayBar> {
    (0..7)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            DayBar::new(date, 0.0, today)
        })
        .collect()
}

/// Axis-tick formatting for hour values: `0h`, sub-hour values in
/// minutes, whole hours bare, fractions as `2h30m`.
pub fn format_hours(value: f64) -> String {
    if value <= 0.0 {
        return "0h".to_owned();
    }
    if value < 1.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let minutes = (value * 60.0).round() as u32;
        return format!("{minutes}m");
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = value.trunc() as u32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let minutes = (value.fract() * 60.0).round() as u32;
    if minutes == 0 {
        format!("{whole}h")
    } else {
        format!("{whole}h{minutes}m")
    }
}

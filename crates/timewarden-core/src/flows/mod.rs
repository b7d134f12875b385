//! Modal flows layered over the dashboard: per-user time adjustment
//! and schedule editing.

mod schedule;
mod time_adjust;

pub use schedule::{
    CLOSE_DELAY as SCHEDULE_CLOSE_DELAY, DayRow, HOURS_STEP, LOAD_FAILED as SCHEDULE_LOAD_FAILED,
    ScheduleDraft, load_schedule, submit_schedule,
};
pub use time_adjust::{
    CLOSE_DELAY as ADJUST_CLOSE_DELAY, TimeAdjustment, ZERO_DELTA, submit_adjustment,
};

/// Lifecycle of a modal submission, rendered as the modal's status
/// line. A succeeded modal stays open briefly so the message is seen,
/// then the UI closes it and reloads the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    Idle,
    Saving,
    Succeeded(String),
    Failed(String),
}

impl SubmitStatus {
    /// Input is ignored while a submission is in flight or done.
    pub fn locked(&self) -> bool {
        matches!(self, Self::Saving | Self::Succeeded(_))
    }
}

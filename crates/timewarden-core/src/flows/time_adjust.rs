//! Time-adjustment modal: accumulate a signed minute delta, submit it
//! as an operation plus unsigned seconds.

use std::time::Duration;

use timewarden_api::{Operation, TimeAdjustmentRequest};

use crate::flows::SubmitStatus;
use crate::session::{CallError, Session};

/// How long the success message stays before the modal closes and the
/// dashboard reloads.
pub const CLOSE_DELAY: Duration = Duration::from_millis(1500);

pub const ZERO_DELTA: &str = "No time adjustment specified";
const SUCCESS: &str = "Success! Time adjusted successfully.";
const FAILED: &str = "Failed to adjust time";

/// State of one open time-adjustment modal.
#[derive(Debug, Clone)]
pub struct TimeAdjustment {
    user_id: i64,
    username: String,
    minutes: i64,
    pub status: SubmitStatus,
}

impl TimeAdjustment {
    pub fn open(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            minutes: 0,
            status: SubmitStatus::Idle,
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The accumulated delta in minutes; negative deducts time.
    pub fn minutes(&self) -> i64 {
        self.minutes
    }

    pub fn adjust(&mut self, delta_minutes: i64) {
        if !self.status.locked() {
            self.minutes += delta_minutes;
        }
    }

    pub fn reset(&mut self) {
        if !self.status.locked() {
            self.minutes = 0;
        }
    }

    /// The wire request for the current delta. A zero delta is a local
    /// validation error and never reaches the backend.
    pub fn request(&self) -> Result<TimeAdjustmentRequest, &'static str> {
        if self.minutes == 0 {
            return Err(ZERO_DELTA);
        }
        let operation = if self.minutes > 0 {
            Operation::Add
        } else {
            Operation::Subtract
        };
        Ok(TimeAdjustmentRequest {
            user_id: self.user_id,
            operation,
            seconds: self.minutes.unsigned_abs() * 60,
        })
    }
}

/// Submit the adjustment and report the modal's resulting status line.
pub async fn submit_adjustment(session: &Session, req: TimeAdjustmentRequest) -> SubmitStatus {
    match session.settle(session.api().modify_time(&req).await) {
        Ok(_) => SubmitStatus::Succeeded(SUCCESS.to_owned()),
        Err(CallError::Rejected(message)) => SubmitStatus::Failed(format!("Error: {message}")),
        Err(_) => SubmitStatus::Failed(format!("Error: {FAILED}")),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn zero_delta_is_rejected_locally() {
        let flow = TimeAdjustment::open(1, "kid");
        assert_eq!(flow.request().unwrap_err(), ZERO_DELTA);
    }

    #[test]
    fn positive_delta_becomes_add_with_seconds() {
        let mut flow = TimeAdjustment::open(4, "kid");
        flow.adjust(15);
        flow.adjust(30);

        let req = flow.request().unwrap();
        assert_eq!(req.operation, Operation::Add);
        assert_eq!(req.seconds, 45 * 60);
        assert_eq!(req.user_id, 4);
    }

    #[test]
    fn negative_delta_becomes_subtract_with_absolute_seconds() {
        let mut flow = TimeAdjustment::open(4, "kid");
        flow.adjust(-30);

        let req = flow.request().unwrap();
        assert_eq!(req.operation, Operation::Subtract);
        assert_eq!(req.seconds, 30 * 60);
    }

    #[test]
    fn opposite_adjustments_cancel_back_to_zero() {
        let mut flow = TimeAdjustment::open(4, "kid");
        flow.adjust(60);
        flow.adjust(-60);
        assert!(flow.request().is_err());
    }

    #[test]
    fn reset_clears_the_delta() {
        let mut flow = TimeAdjustment::open(4, "kid");
        flow.adjust(120);
        flow.reset();
        assert_eq!(flow.minutes(), 0);
    }

    #[test]
    fn input_is_ignored_while_saving() {
        let mut flow = TimeAdjustment::open(4, "kid");
        flow.adjust(15);
        flow.status = SubmitStatus::Saving;
        flow.adjust(15);
        flow.reset();
        assert_eq!(flow.minutes(), 15);
    }
}

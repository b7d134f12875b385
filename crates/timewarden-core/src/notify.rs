//! Queue-of-one toast display.

use std::time::{Duration, Instant};

use crate::event::Notice;

/// How long a toast stays visible, measured from the call that set it.
pub const DISMISS_AFTER: Duration = Duration::from_secs(2);

/// Holds at most one toast at a time. A new `notify` replaces whatever
/// is showing and restarts the dismiss window from its own timestamp --
/// rapid repeated calls keep the latest message visible, they do not
/// queue up or extend each other.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    current: Option<(Notice, Instant)>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, notice: Notice, now: Instant) {
        self.current = Some((notice, now + DISMISS_AFTER));
    }

    /// The toast to display at `now`, if its window is still open.
    pub fn current(&mut self, now: Instant) -> Option<&Notice> {
        if self.current.as_ref().is_some_and(|(_, deadline)| now >= *deadline) {
            self.current = None;
        }
        self.current.as_ref().map(|(notice, _)| notice)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::event::NoticeKind;

    #[test]
    fn toast_visible_within_window() {
        let t0 = Instant::now();
        let mut center = NotificationCenter::new();
        center.notify(Notice::info("hello"), t0);

        assert_eq!(
            center.current(t0 + Duration::from_millis(1_999)).map(|n| n.message.as_str()),
            Some("hello")
        );
        assert_eq!(center.current(t0 + Duration::from_secs(2)), None);
    }

    #[test]
    fn second_notify_replaces_and_restamps() {
        let t0 = Instant::now();
        let mut center = NotificationCenter::new();
        center.notify(Notice::error("first"), t0);
        center.notify(Notice::success("second"), t0 + Duration::from_secs(1));

        // Only the second message is visible...
        let visible = center.current(t0 + Duration::from_millis(1_500)).cloned();
        assert_eq!(visible.as_ref().map(|n| n.message.as_str()), Some("second"));
        assert_eq!(visible.map(|n| n.kind), Some(NoticeKind::Success));

        // ...and it dismisses 2s after the *second* call, not the first.
        assert!(center.current(t0 + Duration::from_millis(2_500)).is_some());
        assert_eq!(center.current(t0 + Duration::from_secs(3)), None);
    }
}

//! Events emitted by the session/view-model layer toward the UI.

use crate::chart::DayBar;
use crate::page::Page;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
    Info,
}

/// A transient toast message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            kind: NoticeKind::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            kind: NoticeKind::Error,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            kind: NoticeKind::Warning,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            kind: NoticeKind::Info,
        }
    }
}

/// Everything the core layer can ask the UI to do. Spawned tasks hold
/// only a channel sender; the UI loop owns all mutable view state.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Switch the visible page (login redirects, post-login landing).
    Navigate(Page),
    /// Show a toast.
    Notify(Notice),
    /// A per-user usage chart finished loading. Tagged with the
    /// dashboard generation that requested it so stale results from an
    /// abandoned load are dropped, not rendered.
    ChartReady {
        generation: u64,
        user_id: i64,
        bars: Vec<DayBar>,
    },
}

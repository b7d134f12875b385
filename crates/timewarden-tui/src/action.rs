//! Actions — every state change flows through the app loop as one of
//! these.

use std::fmt;

use timewarden_api::{ScheduleUpdateRequest, TimeAdjustmentRequest};
use timewarden_core::dashboard::LoadOutcome;
use timewarden_core::{AdminState, DayBar, Notice, Page, ScheduleDraft, SubmitStatus};

/// Pending destructive operation awaiting a y/n answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteUser { user_id: i64, username: String },
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteUser { username, .. } => {
                write!(f, "Are you sure you want to delete user \"{username}\"?")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Loop plumbing ────────────────────────────────────────────────
    Quit,

    // ── Session ──────────────────────────────────────────────────────
    ShowPage(Page),
    Notify(Notice),
    Logout,
    LoginSubmit { username: String, password: String },
    /// Login failed; the message renders inline on the login form.
    LoginFailed(String),

    // ── Dashboard ────────────────────────────────────────────────────
    RefreshDashboard,
    /// The screen invalidated its state; spawn the roster fetch tagged
    /// with this generation.
    FetchDashboard(u64),
    DashboardLoaded { generation: u64, outcome: LoadOutcome },
    /// Roster applied; start background usage fetches for these users.
    FetchCharts { generation: u64, user_ids: Vec<i64> },
    ChartReady { generation: u64, user_id: i64, bars: Vec<DayBar> },

    // ── Time adjustment modal ────────────────────────────────────────
    OpenTimeAdjust { user_id: i64, username: String },
    SubmitTimeAdjust(TimeAdjustmentRequest),
    TimeAdjustSettled(SubmitStatus),
    CloseTimeAdjust,

    // ── Schedule modal ───────────────────────────────────────────────
    OpenSchedule { user_id: i64, username: String },
    ScheduleLoaded(Box<ScheduleDraft>),
    /// The stored schedule could not be fetched; the modal never opens.
    ScheduleLoadFailed,
    SubmitSchedule(Box<ScheduleUpdateRequest>),
    ScheduleSettled(SubmitStatus),
    CloseSchedule,

    // ── Admin ────────────────────────────────────────────────────────
    RefreshAdmin,
    AdminLoaded(AdminState),
    AddUser { username: String, system_ip: String },
    ValidateUser(i64),
    RequestDeleteUser { user_id: i64, username: String },
    ConfirmYes,
    ConfirmNo,

    // ── Settings ─────────────────────────────────────────────────────
    ChangePassword { current: String, new: String, confirm: String },
    /// Outcome of a password change, rendered inline on the form.
    PasswordSettled(Result<String, String>),
    ToggleTheme,
}

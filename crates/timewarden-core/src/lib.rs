//! Session and view-state layer between `timewarden-api` and the TUI.
//!
//! This crate owns everything the UI renders but does not draw:
//!
//! - **[`Session`]** — Authentication lifecycle and the single place
//!   where API outcomes turn into navigation and toasts. Every call
//!   result flows through [`Session::settle`], so a 401 from any
//!   endpoint clears the credential and lands on the login page
//!   exactly once.
//!
//! - **[`Router`]** / **[`Page`]** — The fixed page set. Exactly one
//!   page is active at a time, by construction.
//!
//! - **[`Dashboard`]** — Roster plus per-user sync badges and usage
//!   charts, with a generation counter that drops results from
//!   abandoned loads.
//!
//! - **Modal flows** ([`flows`]) — Time adjustment and schedule
//!   editing, as plain state machines the UI drives.
//!
//! - **[`NotificationCenter`]** — The queue-of-one toast slot.

pub mod admin;
pub mod chart;
pub mod dashboard;
pub mod event;
pub mod flows;
pub mod notify;
pub mod page;
pub mod session;
pub mod settings;
pub mod token_store;

pub use admin::AdminState;
pub use chart::DayBar;
pub use dashboard::{Dashboard, DashboardState, LoadOutcome, UserRow};
pub use event::{Notice, NoticeKind, UiEvent};
pub use flows::{ScheduleDraft, SubmitStatus, TimeAdjustment};
pub use notify::NotificationCenter;
pub use page::{Page, Router};
pub use session::{CallError, Session};
pub use token_store::TokenStore;

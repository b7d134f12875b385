// timewarden-api: Async Rust client for the screen-time administration API.

pub mod client;
pub mod error;
pub mod token;
pub mod types;

pub use client::{Client, TransportConfig};
pub use error::Error;
pub use token::Credential;
pub use types::{
    Ack, Day, Interval, LoginGrant, Operation, Roster, Schedule, ScheduleUpdateRequest, SshStatus,
    SyncStatus, TimeAdjustmentRequest, UsagePoint, UsageSeries, UserSummary,
};

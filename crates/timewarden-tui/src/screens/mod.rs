//! One module per page, each implementing [`Component`](crate::component::Component).

pub mod admin;
pub mod dashboard;
pub mod login;
pub mod settings;

pub use admin::AdminScreen;
pub use dashboard::DashboardScreen;
pub use login::LoginScreen;
pub use settings::SettingsScreen;

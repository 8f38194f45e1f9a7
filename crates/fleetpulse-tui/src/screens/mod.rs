//! Screen components. The dashboard is the only screen; the app shell owns
//! the status bar and overlays around it.

pub mod dashboard;

pub use dashboard::DashboardScreen;

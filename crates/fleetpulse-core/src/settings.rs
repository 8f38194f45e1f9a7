// ── Runtime dashboard settings ──
//
// How the dashboard behaves once running. The CLI/TUI builds these from
// fleetpulse-config and hands them in; core never reads config files.

use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3500);
pub const DEFAULT_SKELETON_COUNT: usize = 6;

/// Tunables for one dashboard instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    /// Period of the automatic refresh timer.
    pub poll_interval: Duration,
    /// How long a toast stays visible.
    pub toast_duration: Duration,
    /// Placeholder blocks shown while loading.
    pub skeleton_count: usize,
    /// Initial value of the auto-refresh toggle.
    pub auto_refresh: bool,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            toast_duration: DEFAULT_TOAST_DURATION,
            skeleton_count: DEFAULT_SKELETON_COUNT,
            auto_refresh: true,
        }
    }
}

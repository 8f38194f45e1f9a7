//! All possible UI actions. Actions are the sole mechanism for state mutation.

use fleetpulse_core::{
    Company, CompanyId, CoreError, Device, PollTick, RefreshTicket, StatusFilter,
};

/// Direction for scrolling the card grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ── Lifecycle ───────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),
    ToggleHelp,

    // ── Company selector ────────────────────────────────────────────
    OpenCompanyPicker,
    CloseCompanyPicker,
    /// `None` is the placeholder entry.
    SelectCompany(Option<CompanyId>),

    // ── Board controls ──────────────────────────────────────────────
    Refresh,
    SetStatusFilter(StatusFilter),
    CycleStatusFilter,
    OpenSearch,
    CloseSearch,
    SearchInput(String),
    ToggleAutoRefresh,
    TogglePause,
    Scroll(Direction),

    // ── Background results ──────────────────────────────────────────
    PollTick(PollTick),
    CompaniesLoaded(Result<Vec<Company>, CoreError>),
    DevicesFetched {
        ticket: RefreshTicket,
        result: Result<Vec<Device>, CoreError>,
    },
}

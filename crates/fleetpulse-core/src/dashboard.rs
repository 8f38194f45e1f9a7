// ── Dashboard controller ──
//
// One `Dashboard` per screen. It owns the client state and the poll timer,
// translates control events into state changes, and pushes results into the
// view. Network work is either awaited inline (`refresh_devices`) or split
// around a spawned task (`begin_refresh` / `finish_refresh`).

use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::board::{CompanyOptions, Summary};
use crate::error::CoreError;
use crate::model::{Company, CompanyId, Device, DeviceId, StatusFilter};
use crate::poll::{PollController, PollState, PollTick};
use crate::settings::DashboardSettings;
use crate::source::DeviceSource;
use crate::state::{ClientState, RefreshTicket, TicketStatus};
use crate::transition;
use crate::view::{DashboardView, LoadingGuard};

pub const PAUSE_LABEL: &str = "Pause";
pub const RESUME_LABEL: &str = "Resume";

/// What the host should do after a control event.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    Nothing,
    Refresh,
}

/// Result of a refresh cycle that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No company selected; nothing was fetched.
    Skipped,
    /// A newer request was issued meanwhile; the response was discarded.
    Stale,
    /// New devices were rendered.
    Applied {
        summary: Summary,
        came_online: Vec<DeviceId>,
    },
}

pub struct Dashboard<S, V> {
    source: Arc<S>,
    view: V,
    state: ClientState,
    poller: PollController,
}

impl<S, V> std::fmt::Debug for Dashboard<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("state", &self.state)
            .field("poller", &self.poller)
            .finish_non_exhaustive()
    }
}

impl<S: DeviceSource, V: DashboardView> Dashboard<S, V> {
    /// Build a dashboard and return the receiver its poll ticks arrive on.
    ///
    /// The timer is not armed until a company is selected or a flag changes.
    pub fn new(
        source: Arc<S>,
        mut view: V,
        settings: &DashboardSettings,
    ) -> (Self, mpsc::UnboundedReceiver<PollTick>) {
        let (poller, ticks) = PollController::new(settings.poll_interval);
        view.set_pause_label(PAUSE_LABEL);

        let dashboard = Self {
            source,
            view,
            state: ClientState::new(settings.auto_refresh),
            poller,
        };
        (dashboard, ticks)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Shared handle to the data source, for fetches on spawned tasks.
    pub fn source(&self) -> Arc<S> {
        Arc::clone(&self.source)
    }

    pub fn poll_state(&self) -> PollState {
        self.poller.state()
    }

    // ── Data flow ────────────────────────────────────────────────────

    /// Fetch companies and render the selector.
    ///
    /// On failure the selector keeps whatever it showed before.
    pub async fn load_companies(&mut self) -> Result<usize, CoreError> {
        let source = Arc::clone(&self.source);
        let mut view = LoadingGuard::acquire(&mut self.view);

        let result = source.companies().await;
        render_companies(&mut *view, result)
    }

    /// First half of a company load whose fetch runs elsewhere.
    pub fn begin_company_load(&mut self) {
        debug!("company load started");
        self.view.set_loading(true);
    }

    /// Second half of a split company load. Clears the loading indicator
    /// whatever the outcome.
    pub fn finish_company_load(
        &mut self,
        result: Result<Vec<Company>, CoreError>,
    ) -> Result<usize, CoreError> {
        let mut view = LoadingGuard::adopt(&mut self.view);
        render_companies(&mut *view, result)
    }

    /// Run one full refresh cycle for the selected company.
    pub async fn refresh_devices(&mut self) -> Result<RefreshOutcome, CoreError> {
        let Some(ticket) = self.state.issue_ticket() else {
            trace!("refresh skipped: no company selected");
            return Ok(RefreshOutcome::Skipped);
        };

        let source = Arc::clone(&self.source);
        let mut view = LoadingGuard::acquire(&mut self.view);

        let result = source.devices(ticket.company()).await;
        if self.state.resolve(&ticket) == TicketStatus::Stale {
            return Ok(RefreshOutcome::Stale);
        }

        let devices = result.inspect_err(|e| {
            warn!(company = %ticket.company(), error = %e, "device refresh failed");
        })?;
        Ok(apply_devices(&mut self.state, &mut *view, devices))
    }

    /// First half of a refresh whose fetch runs elsewhere.
    ///
    /// Shows the loading indicator and returns the ticket to hand back to
    /// [`finish_refresh`](Self::finish_refresh), or `None` when no company
    /// is selected.
    pub fn begin_refresh(&mut self) -> Option<RefreshTicket> {
        let ticket = self.state.issue_ticket()?;
        debug!(seq = ticket.seq(), company = %ticket.company(), "refresh started");
        self.view.set_loading(true);
        Some(ticket)
    }

    /// Second half of a split refresh.
    ///
    /// Responses for superseded tickets are dropped, errors included.
    pub fn finish_refresh(
        &mut self,
        ticket: &RefreshTicket,
        result: Result<Vec<Device>, CoreError>,
    ) -> Result<RefreshOutcome, CoreError> {
        if self.state.resolve(ticket) == TicketStatus::Stale {
            debug!(seq = ticket.seq(), "discarding stale device response");
            if !self.state.has_pending_refresh() {
                self.view.set_loading(false);
            }
            return Ok(RefreshOutcome::Stale);
        }

        let mut view = LoadingGuard::adopt(&mut self.view);
        let devices = result.inspect_err(|e| {
            warn!(company = %ticket.company(), error = %e, "device refresh failed");
        })?;
        Ok(apply_devices(&mut self.state, &mut *view, devices))
    }

    /// Execute a [`Followup`] inline.
    pub async fn perform(&mut self, followup: Followup) -> Result<RefreshOutcome, CoreError> {
        match followup {
            Followup::Refresh => self.refresh_devices().await,
            Followup::Nothing => Ok(RefreshOutcome::Skipped),
        }
    }

    // ── Event wiring ─────────────────────────────────────────────────

    /// Company selector changed. `None` is the placeholder.
    pub fn select_company(&mut self, company: Option<CompanyId>) -> Followup {
        info!(company = ?company.as_ref().map(CompanyId::as_str), "company selected");
        self.state.select_company(company);
        self.start_polling();
        Followup::Refresh
    }

    /// Manual refresh control.
    pub fn request_refresh(&self) -> Followup {
        Followup::Refresh
    }

    /// Status filter changed. Re-renders from the cache.
    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.state.set_status_filter(filter);
        self.render_from_cache();
    }

    /// Search input changed. Re-renders from the cache.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.state.set_search_term(term.into());
        self.render_from_cache();
    }

    pub fn set_auto_refresh(&mut self, enabled: bool) {
        self.state.set_auto_refresh(enabled);
        self.start_polling();
    }

    /// Flip pause. Leaving pause asks for one immediate refresh.
    pub fn toggle_pause(&mut self) -> Followup {
        let paused = self.state.toggle_paused();
        self.view
            .set_pause_label(if paused { RESUME_LABEL } else { PAUSE_LABEL });
        self.start_polling();

        if paused {
            Followup::Nothing
        } else {
            Followup::Refresh
        }
    }

    /// A poll timer period elapsed.
    pub fn on_poll_tick(&self, tick: PollTick) -> Followup {
        if !self.poller.is_current(tick) {
            trace!(generation = tick.generation, "ignoring tick from replaced timer");
            return Followup::Nothing;
        }
        if self.state.paused() {
            return Followup::Nothing;
        }
        Followup::Refresh
    }

    /// (Re)arm the poll timer from the current flags.
    pub fn start_polling(&mut self) -> PollState {
        self.poller.start(self.state.poll_flags())
    }

    pub fn stop_polling(&mut self) {
        self.poller.stop();
    }

    fn render_from_cache(&mut self) {
        let board = self.state.board();
        self.view.render_devices(&board);
    }
}

/// Render the selector from a company listing. On failure the selector keeps
/// whatever it showed before.
fn render_companies<V: DashboardView + ?Sized>(
    view: &mut V,
    result: Result<Vec<Company>, CoreError>,
) -> Result<usize, CoreError> {
    let companies = result.inspect_err(|e| {
        warn!(error = %e, "failed to load companies");
    })?;

    view.render_company_options(&CompanyOptions::from_companies(&companies));
    info!(count = companies.len(), "companies loaded");
    Ok(companies.len())
}

/// Toast transitions, replace the cache and render the new board.
fn apply_devices<V: DashboardView + ?Sized>(
    state: &mut ClientState,
    view: &mut V,
    devices: Vec<Device>,
) -> RefreshOutcome {
    let came_online: Vec<DeviceId> = transition::came_online(state.devices(), &devices)
        .into_iter()
        .map(|device| {
            view.toast(transition::online_message(device));
            device.id.clone()
        })
        .collect();

    state.replace_devices(devices);
    let board = state.board();
    view.render_devices(&board);
    view.set_last_updated(Local::now());

    debug!(summary = %board.summary(), came_online = came_online.len(), "devices applied");
    RefreshOutcome::Applied {
        summary: board.summary(),
        came_online,
    }
}

//! Application core: event loop, action dispatch, background fetches.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use fleetpulse_api::ApiClient;
use fleetpulse_core::{
    CompanyId, CoreError, Dashboard, DashboardSettings, DeviceSource, Followup, PollTick,
    RefreshOutcome,
};

use crate::action::Action;
use crate::component::Component;
use crate::event::{Event, EventRates, EventReader};
use crate::screens::DashboardScreen;
use crate::theme;
use crate::tui::Tui;

/// Status bar hints are dropped below this width.
const NARROW_WIDTH: u16 = 80;

/// Top-level application state and event loop.
pub struct App {
    /// Controller + view. The screen is the dashboard's view.
    dashboard: Dashboard<ApiClient, DashboardScreen>,
    /// Poll ticks from the dashboard's timer, taken when the loop starts.
    poll_ticks: Option<mpsc::UnboundedReceiver<PollTick>>,
    /// Company to select once the loop is running.
    initial_company: Option<CompanyId>,
    poll_interval: Duration,
    event_rates: EventRates,
    running: bool,
    help_visible: bool,
    terminal_size: (u16, u16),
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Cancels the poll tick forwarder.
    bridge_cancel: CancellationToken,
}

impl App {
    pub fn new(
        client: ApiClient,
        settings: &DashboardSettings,
        initial_company: Option<CompanyId>,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screen = DashboardScreen::new(settings);
        let (dashboard, poll_ticks) = Dashboard::new(Arc::new(client), screen, settings);

        Self {
            dashboard,
            poll_ticks: Some(poll_ticks),
            initial_company,
            poll_interval: settings.poll_interval,
            event_rates: EventRates::for_toasts(settings.toast_duration),
            running: true,
            help_visible: false,
            terminal_size: (0, 0),
            action_tx,
            action_rx,
            bridge_cancel: CancellationToken::new(),
        }
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::enter()?;
        self.terminal_size = tui.size();

        let screen = self.dashboard.view_mut();
        screen.init(self.action_tx.clone())?;
        screen.set_focused(true);

        self.spawn_tick_bridge();
        self.spawn_company_load();
        if let Some(company) = self.initial_company.take() {
            self.action_tx.send(Action::SelectCompany(Some(company)))?;
        }

        let mut events = EventReader::new(self.event_rates);

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                let render = action == Action::Render;
                self.process_action(action)?;

                if render {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.bridge_cancel.cancel();
        self.dashboard.stop_polling();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    // ── Background work ──────────────────────────────────────────────

    /// Forward poll timer ticks into the action loop.
    fn spawn_tick_bridge(&mut self) {
        let Some(mut ticks) = self.poll_ticks.take() else {
            return;
        };
        let tx = self.action_tx.clone();
        let cancel = self.bridge_cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    tick = ticks.recv() => {
                        let Some(tick) = tick else { break };
                        if tx.send(Action::PollTick(tick)).is_err() {
                            break;
                        }
                    }
                }
            }
        });
    }

    fn spawn_company_load(&mut self) {
        self.dashboard.begin_company_load();
        let source = self.dashboard.source();
        let tx = self.action_tx.clone();

        tokio::spawn(async move {
            let result = source.companies().await;
            let _ = tx.send(Action::CompaniesLoaded(result));
        });
    }

    /// Start a device fetch for the selected company, if one is asked for.
    fn run_followup(&mut self, followup: Followup) {
        if followup == Followup::Nothing {
            return;
        }
        let Some(ticket) = self.dashboard.begin_refresh() else {
            return;
        };
        let source = self.dashboard.source();
        let tx = self.action_tx.clone();

        tokio::spawn(async move {
            let result = source.devices(ticket.company()).await;
            let _ = tx.send(Action::DevicesFetched { ticket, result });
        });
    }

    fn record_error(&mut self, context: &str, error: &CoreError) {
        warn!(error = %error, "{context}");
        self.dashboard
            .view_mut()
            .set_error(Some(format!("{context}: {error}")));
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Map a key event to an action. Global keys are handled here unless
    /// the screen is capturing text or showing a popup.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        let screen = self.dashboard.view_mut();
        if !screen.captures_input() {
            match (key.modifiers, key.code) {
                (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
                (KeyModifiers::NONE, KeyCode::Char('?')) => {
                    return Ok(Some(Action::ToggleHelp));
                }
                _ => {}
            }
        }

        screen.handle_key_event(key)
    }

    /// Process a single action: update the screen, then the dashboard.
    fn process_action(&mut self, action: Action) -> Result<()> {
        if let Some(followup) = self.dashboard.view_mut().update(&action)? {
            self.action_tx.send(followup)?;
        }

        match action {
            Action::Quit => self.running = false,
            Action::Resize(w, h) => self.terminal_size = (w, h),
            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::SelectCompany(company) => {
                let followup = self.dashboard.select_company(company);
                self.run_followup(followup);
            }
            Action::Refresh => {
                let followup = self.dashboard.request_refresh();
                self.run_followup(followup);
            }
            Action::SetStatusFilter(filter) => self.dashboard.set_status_filter(filter),
            Action::CycleStatusFilter => {
                let next = self.dashboard.state().status_filter().next();
                self.dashboard.set_status_filter(next);
            }
            Action::SearchInput(term) => self.dashboard.set_search_term(term),
            Action::ToggleAutoRefresh => {
                let enabled = !self.dashboard.state().auto_refresh();
                debug!(enabled, "auto-refresh toggled");
                self.dashboard.set_auto_refresh(enabled);
            }
            Action::TogglePause => {
                let followup = self.dashboard.toggle_pause();
                self.run_followup(followup);
            }
            Action::PollTick(tick) => {
                let followup = self.dashboard.on_poll_tick(tick);
                self.run_followup(followup);
            }

            Action::CompaniesLoaded(result) => match self.dashboard.finish_company_load(result) {
                Ok(_) => self.dashboard.view_mut().set_error(None),
                Err(e) => self.record_error("could not load companies", &e),
            },
            Action::DevicesFetched { ticket, result } => {
                match self.dashboard.finish_refresh(&ticket, result) {
                    Ok(RefreshOutcome::Applied { .. }) => {
                        self.dashboard.view_mut().set_error(None);
                    }
                    Ok(RefreshOutcome::Stale | RefreshOutcome::Skipped) => {}
                    Err(e) => self.record_error("could not refresh devices", &e),
                }
            }

            Action::Tick
            | Action::Render
            | Action::OpenCompanyPicker
            | Action::CloseCompanyPicker
            | Action::OpenSearch
            | Action::CloseSearch
            | Action::Scroll(_) => {}
        }

        Ok(())
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = Layout::vertical([
            Constraint::Min(1),    // Screen content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        self.dashboard.view().render(frame, layout[0]);
        self.render_status_bar(frame, layout[1]);

        if self.help_visible {
            self.render_help_overlay(frame, area);
        }
    }

    /// Bottom status bar: timer state, last error, key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let state = self.dashboard.state();
        let screen = self.dashboard.view();

        let timer = if !state.auto_refresh() {
            Span::styled("○ auto-refresh off", theme::key_hint())
        } else if state.paused() {
            Span::styled("◐ paused", Style::default().fg(theme::ELECTRIC_YELLOW))
        } else {
            Span::styled(
                format!("● every {}s", self.poll_interval.as_secs().max(1)),
                Style::default().fg(theme::SUCCESS_GREEN),
            )
        };

        let mut spans = vec![
            Span::raw(" "),
            timer,
            Span::styled(" │ ", theme::key_hint()),
            Span::styled("p ", theme::key_hint_key()),
            Span::styled(screen.pause_label(), theme::key_hint()),
        ];

        if let Some(error) = screen.last_error() {
            spans.push(Span::styled(" │ ", theme::key_hint()));
            spans.push(Span::styled(
                error.to_owned(),
                Style::default().fg(theme::ERROR_RED),
            ));
        } else if self.terminal_size.0 >= NARROW_WIDTH {
            spans.push(Span::styled(
                " │ c company  r refresh  / search  ? help  q quit",
                theme::key_hint(),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let help_width = 56u16.min(area.width.saturating_sub(4));
        let help_height = 19u16.min(area.height.saturating_sub(4));

        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(Clear, help_area);
        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));

        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let row = |key: &'static str, desc: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(desc, theme::key_hint()),
            ])
        };
        let heading = |title: &'static str| {
            Line::from(Span::styled(
                format!("  {title}"),
                Style::default().fg(theme::NEON_CYAN),
            ))
        };

        let help_text = vec![
            Line::from(""),
            heading("Devices"),
            row("c", "Choose company"),
            row("r", "Refresh now"),
            row("a / o / f", "All / online / offline"),
            row("s  Tab", "Cycle status filter"),
            row("/", "Search by name"),
            row("j/k ↑/↓", "Scroll cards"),
            Line::from(""),
            heading("Polling"),
            row("p", "Pause / resume"),
            row("A", "Toggle auto-refresh"),
            Line::from(""),
            heading("Global"),
            row("?", "This help"),
            row("q  Ctrl+c", "Quit"),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }
}

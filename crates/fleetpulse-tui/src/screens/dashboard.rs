//! Dashboard screen: company picker, filter tabs, search and the card grid.
//!
//! The screen is the terminal implementation of [`DashboardView`]: the core
//! `Dashboard` pushes company options, boards, loading state and toasts into
//! it, and it turns keystrokes into [`Action`]s for the app loop.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, Utc};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc::UnboundedSender;
use tui_input::{Input, InputRequest};

use fleetpulse_core::{
    CompanyId, CompanyOptions, DashboardSettings, DashboardView, Device, DeviceBoard, DeviceId,
    PAUSE_LABEL, StatusFilter,
};

use crate::action::{Action, Direction};
use crate::component::Component;
use crate::theme;
use crate::widgets::sparkline::{self, BAR_COUNT};
use crate::widgets::{status_badge, sub_tabs, time_fmt};

const CARD_WIDTH: u16 = 34;
const CARD_HEIGHT: u16 = 7;
/// Toast boxes stacked on screen at once. Older toasts stay queued.
const MAX_VISIBLE_TOASTS: usize = 4;
const TOAST_HEIGHT: u16 = 3;

const FILTERS: [StatusFilter; 3] = [StatusFilter::All, StatusFilter::Online, StatusFilter::Offline];
const FILTER_LABELS: [&str; 3] = ["a all", "o online", "f offline"];

struct Toast {
    message: String,
    shown_at: Instant,
}

pub struct DashboardScreen {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,

    options: CompanyOptions,
    selected_company: Option<CompanyId>,
    picker_open: bool,
    picker_state: ListState,

    board: DeviceBoard,
    bars: HashMap<DeviceId, [u8; BAR_COUNT]>,
    scroll_row: usize,

    loading: bool,
    skeleton_count: usize,
    throbber: ThrobberState,

    search: Input,
    search_active: bool,

    toasts: VecDeque<Toast>,
    toast_duration: Duration,
    last_updated: Option<DateTime<Local>>,
    pause_label: &'static str,
    last_error: Option<String>,
}

impl DashboardScreen {
    pub fn new(settings: &DashboardSettings) -> Self {
        Self {
            focused: false,
            action_tx: None,
            options: CompanyOptions::placeholder_only(),
            selected_company: None,
            picker_open: false,
            picker_state: ListState::default(),
            board: DeviceBoard::default(),
            bars: HashMap::new(),
            scroll_row: 0,
            loading: false,
            skeleton_count: settings.skeleton_count,
            throbber: ThrobberState::default(),
            search: Input::default(),
            search_active: false,
            toasts: VecDeque::new(),
            toast_duration: settings.toast_duration,
            last_updated: None,
            pause_label: PAUSE_LABEL,
            last_error: None,
        }
    }

    // ── Read access for the app shell ────────────────────────────────

    pub fn pause_label(&self) -> &'static str {
        self.pause_label
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }

    #[cfg(test)]
    fn toast_messages(&self) -> impl Iterator<Item = &str> {
        self.toasts.iter().map(|t| t.message.as_str())
    }

    fn selected_company_label(&self) -> Option<&str> {
        let id = self.selected_company.as_ref()?;
        self.options
            .iter()
            .find(|o| o.value.as_ref() == Some(id))
            .map(|o| o.label.as_str())
    }

    /// Drop toasts older than the configured duration.
    pub fn prune_toasts(&mut self, now: Instant) {
        let ttl = self.toast_duration;
        self.toasts
            .retain(|t| now.saturating_duration_since(t.shown_at) < ttl);
    }

    fn send(&self, action: Action) {
        if let Some(tx) = &self.action_tx {
            let _ = tx.send(action);
        }
    }

    // ── Key handling ─────────────────────────────────────────────────

    fn handle_picker_key(&mut self, key: KeyEvent) -> Option<Action> {
        let last = self.options.len().saturating_sub(1);
        let current = self.picker_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Esc | KeyCode::Char('c' | 'q') => Some(Action::CloseCompanyPicker),
            KeyCode::Char('j') | KeyCode::Down => {
                self.picker_state.select(Some((current + 1).min(last)));
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.picker_state.select(Some(current.saturating_sub(1)));
                None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.picker_state.select(Some(0));
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.picker_state.select(Some(last));
                None
            }
            KeyCode::Enter => {
                let value = self.options.get(current).and_then(|o| o.value.clone());
                Some(Action::SelectCompany(value))
            }
            _ => None,
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Option<Action> {
        let request = match (key.modifiers, key.code) {
            (_, KeyCode::Enter) => return Some(Action::CloseSearch),
            (_, KeyCode::Esc) => {
                self.search.reset();
                self.send(Action::SearchInput(String::new()));
                return Some(Action::CloseSearch);
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => InputRequest::DeleteLine,
            (KeyModifiers::CONTROL, KeyCode::Char('w')) => InputRequest::DeletePrevWord,
            (_, KeyCode::Char(c)) => InputRequest::InsertChar(c),
            (_, KeyCode::Backspace) => InputRequest::DeletePrevChar,
            (_, KeyCode::Delete) => InputRequest::DeleteNextChar,
            (_, KeyCode::Left) => InputRequest::GoToPrevChar,
            (_, KeyCode::Right) => InputRequest::GoToNextChar,
            (_, KeyCode::Home) => InputRequest::GoToStart,
            (_, KeyCode::End) => InputRequest::GoToEnd,
            _ => return None,
        };

        let before = self.search.value().to_owned();
        self.search.handle(request);
        (self.search.value() != before).then(|| Action::SearchInput(self.search.value().to_owned()))
    }

    fn handle_board_key(key: KeyEvent) -> Option<Action> {
        match (key.modifiers, key.code) {
            (_, KeyCode::Char('c')) => Some(Action::OpenCompanyPicker),
            (_, KeyCode::Char('r')) => Some(Action::Refresh),
            (_, KeyCode::Char('a')) => Some(Action::SetStatusFilter(StatusFilter::All)),
            (_, KeyCode::Char('o')) => Some(Action::SetStatusFilter(StatusFilter::Online)),
            (_, KeyCode::Char('f')) => Some(Action::SetStatusFilter(StatusFilter::Offline)),
            (_, KeyCode::Char('s') | KeyCode::Tab) => Some(Action::CycleStatusFilter),
            (_, KeyCode::Char('/')) => Some(Action::OpenSearch),
            (_, KeyCode::Char('A')) => Some(Action::ToggleAutoRefresh),
            (_, KeyCode::Char('p')) => Some(Action::TogglePause),
            (_, KeyCode::Char('j') | KeyCode::Down) => Some(Action::Scroll(Direction::Down)),
            (_, KeyCode::Char('k') | KeyCode::Up) => Some(Action::Scroll(Direction::Up)),
            _ => None,
        }
    }

    // ── Layout helpers ───────────────────────────────────────────────

    fn grid_columns(width: u16) -> usize {
        usize::from((width / CARD_WIDTH).max(1))
    }

    fn first_visible_row(&self, columns: usize, visible_rows: usize) -> usize {
        let total_rows = self.board.cards().len().div_ceil(columns);
        self.scroll_row.min(total_rows.saturating_sub(visible_rows))
    }

    /// Cells of a `count`-item grid laid out row-major inside `area`.
    fn grid_cells(area: Rect, count: usize, skip_rows: usize) -> Vec<Rect> {
        let columns = Self::grid_columns(area.width);
        let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));
        let cell_width = area.width / u16::try_from(columns).unwrap_or(1);

        let shown = count
            .saturating_sub(skip_rows * columns)
            .min(visible_rows * columns);

        (0..shown)
            .map(|i| {
                let row = u16::try_from(i / columns).unwrap_or(0);
                let col = u16::try_from(i % columns).unwrap_or(0);
                Rect::new(
                    area.x + col * cell_width,
                    area.y + row * CARD_HEIGHT,
                    cell_width,
                    CARD_HEIGHT,
                )
                .intersection(area)
            })
            .collect()
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(" fleetpulse ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let company = self.selected_company_label().map_or_else(
            || Span::styled("No company selected", theme::key_hint()),
            |label| Span::styled(label.to_owned(), theme::title_style()),
        );
        let summary = self.board.summary();
        let updated = self
            .last_updated
            .map_or_else(|| "—".into(), time_fmt::fmt_clock);

        let line = Line::from(vec![
            Span::raw(" "),
            company,
            Span::styled("  │  ", theme::key_hint()),
            Span::styled(
                format!("{} online", summary.online),
                Style::default().fg(theme::SUCCESS_GREEN),
            ),
            Span::styled(" / ", theme::key_hint()),
            Span::styled(format!("{} total", summary.total), theme::text()),
            Span::styled("  │  ", theme::key_hint()),
            Span::styled(format!("Updated {updated}"), theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }

    fn render_controls(&self, frame: &mut Frame, area: Rect) {
        let active = FILTERS
            .iter()
            .position(|f| *f == self.board.status_filter())
            .unwrap_or(0);
        let mut tabs = sub_tabs::render_sub_tabs(&FILTER_LABELS, active);
        tabs.spans.insert(0, Span::styled(" Status  ", theme::key_hint()));

        let search = if self.search_active {
            Line::from(vec![
                Span::styled(" Search  ", theme::key_hint_key()),
                Span::styled(self.search.value().to_owned(), theme::text()),
                Span::styled("▏", Style::default().fg(theme::ELECTRIC_PURPLE)),
            ])
        } else if self.search.value().is_empty() {
            Line::from(vec![
                Span::styled(" Search  ", theme::key_hint()),
                Span::styled("press / to filter by name", theme::key_hint()),
            ])
        } else {
            Line::from(vec![
                Span::styled(" Search  ", theme::key_hint()),
                Span::styled(format!("\"{}\"", self.search.value()), theme::text()),
            ])
        };

        frame.render_widget(Paragraph::new(vec![tabs, search]), area);
    }

    fn render_card(&self, frame: &mut Frame, area: Rect, device: &Device, now: DateTime<Utc>) {
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", device.display_name()),
                theme::title_style(),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::card_border(device.status));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let last_seen = match device.last_read_at {
            Some(at) => format!(
                "{} · {}",
                time_fmt::fmt_last_seen(Some(at)),
                time_fmt::fmt_age(at, now)
            ),
            None => time_fmt::fmt_last_seen(None),
        };
        let bars = self
            .bars
            .get(&device.id)
            .copied()
            .unwrap_or([0; BAR_COUNT]);

        let lines = vec![
            Line::from(status_badge::badge_span(device.status)),
            Line::from(vec![
                Span::styled("Last seen ", theme::key_hint()),
                Span::styled(last_seen, theme::text()),
            ]),
            Line::from(vec![
                Span::styled("ID ", theme::key_hint()),
                Span::styled(device.id.to_string(), Style::default().fg(theme::CORAL)),
            ]),
            Line::from(sparkline::bars_span(&bars, device.status)),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_grid(&self, frame: &mut Frame, area: Rect) {
        let columns = Self::grid_columns(area.width);
        let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));
        let first_row = self.first_visible_row(columns, visible_rows);
        let cards = self.board.cards();
        let now = Utc::now();

        for (cell, device) in Self::grid_cells(area, cards.len(), first_row)
            .into_iter()
            .zip(cards.iter().skip(first_row * columns))
        {
            self.render_card(frame, cell, device, now);
        }
    }

    fn render_skeletons(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(area);

        let throbber = Throbber::default()
            .label(" Loading…")
            .style(theme::text())
            .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
        frame.render_stateful_widget(throbber, layout[0], &mut self.throbber.clone());

        let filler = "░".repeat(usize::from(CARD_WIDTH));
        for cell in Self::grid_cells(layout[1], self.skeleton_count, 0) {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(theme::border_default());
            let inner = block.inner(cell);
            frame.render_widget(block, cell);
            let lines: Vec<Line> = (0..inner.height)
                .map(|_| Line::styled(filler.clone(), theme::skeleton()))
                .collect();
            frame.render_widget(Paragraph::new(lines), inner);
        }
    }

    fn render_empty(&self, frame: &mut Frame, area: Rect) {
        let message = if self.selected_company.is_none() && self.board.summary().total == 0 {
            vec![
                Line::from(Span::styled("No company selected", theme::title_style())),
                Line::from(vec![
                    Span::styled("Press ", theme::key_hint()),
                    Span::styled("c", theme::key_hint_key()),
                    Span::styled(" to choose a company", theme::key_hint()),
                ]),
            ]
        } else {
            vec![
                Line::from(Span::styled("No devices", theme::title_style())),
                Line::from(Span::styled(
                    "Nothing matches the current filter and search",
                    theme::key_hint(),
                )),
            ]
        };

        let layout = Layout::vertical([
            Constraint::Percentage(40),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);
        frame.render_widget(
            Paragraph::new(message).alignment(Alignment::Center),
            layout[1],
        );
    }

    fn render_picker(&self, frame: &mut Frame, area: Rect) {
        let rows = u16::try_from(self.options.len()).unwrap_or(u16::MAX);
        let width = 44u16.min(area.width.saturating_sub(4));
        let height = rows.saturating_add(2).min(16).min(area.height.saturating_sub(2));
        let popup = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );

        frame.render_widget(Clear, popup);
        let items: Vec<ListItem> = self
            .options
            .iter()
            .map(|o| {
                let style = if o.is_placeholder() {
                    theme::key_hint()
                } else {
                    theme::text()
                };
                ListItem::new(Span::styled(o.label.clone(), style))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(Span::styled(" Company ", theme::title_style()))
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(theme::border_focused())
                    .style(Style::default().bg(theme::BG_DARK)),
            )
            .highlight_style(theme::list_selected())
            .highlight_symbol("▸ ");
        frame.render_stateful_widget(list, popup, &mut self.picker_state.clone());
    }

    fn render_toasts(&self, frame: &mut Frame, area: Rect) {
        let slots = usize::from(area.height / TOAST_HEIGHT).min(MAX_VISIBLE_TOASTS);
        if slots == 0 || self.toasts.is_empty() {
            return;
        }

        // Newest at the bottom. When the queue outgrows the stack, the top
        // slot counts what is hidden instead.
        let hidden = self.toasts.len().saturating_sub(slots);
        let shown = if hidden > 0 { slots - 1 } else { slots };
        let mut messages: Vec<String> = self
            .toasts
            .iter()
            .rev()
            .take(shown)
            .map(|t| t.message.clone())
            .collect();
        if hidden > 0 {
            messages.push(format!("+{} more", hidden + 1));
        }

        let mut bottom = area.y + area.height;
        for message in messages {
            let msg_len = u16::try_from(message.chars().count()).unwrap_or(u16::MAX);
            let width = msg_len.saturating_add(6).clamp(20, 60).min(area.width);
            bottom -= TOAST_HEIGHT;
            let toast_area = Rect::new(
                area.x + area.width.saturating_sub(width + 1),
                bottom,
                width,
                TOAST_HEIGHT,
            );

            frame.render_widget(Clear, toast_area);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme::SUCCESS_GREEN))
                .style(Style::default().bg(theme::BG_DARK));
            let inner = block.inner(toast_area);
            frame.render_widget(block, toast_area);

            let line = Line::from(vec![
                Span::styled(" ✓ ", Style::default().fg(theme::SUCCESS_GREEN)),
                Span::styled(message, theme::text()),
            ]);
            frame.render_widget(Paragraph::new(line), inner);
        }
    }
}

// ── Component ───────────────────────────────────────────────────────

impl Component for DashboardScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.picker_open {
            return Ok(self.handle_picker_key(key));
        }
        if self.search_active {
            return Ok(self.handle_search_key(key));
        }
        Ok(Self::handle_board_key(key))
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => {
                self.prune_toasts(Instant::now());
                if self.loading {
                    self.throbber.calc_next();
                }
            }
            Action::OpenCompanyPicker => {
                let position = self
                    .selected_company
                    .as_ref()
                    .and_then(|id| self.options.position_of(id))
                    .unwrap_or(0);
                self.picker_state.select(Some(position));
                self.picker_open = true;
            }
            Action::CloseCompanyPicker => {
                self.picker_open = false;
            }
            Action::SelectCompany(company) => {
                self.selected_company.clone_from(company);
                self.picker_open = false;
                self.scroll_row = 0;
            }
            Action::OpenSearch => {
                self.search_active = true;
            }
            Action::CloseSearch => {
                self.search_active = false;
            }
            Action::Scroll(Direction::Down) => {
                self.scroll_row = (self.scroll_row + 1).min(self.board.cards().len());
            }
            Action::Scroll(Direction::Up) => {
                self.scroll_row = self.scroll_row.saturating_sub(1);
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Length(3), // header
            Constraint::Length(2), // filter tabs + search
            Constraint::Min(1),    // cards
        ])
        .split(area);

        self.render_header(frame, layout[0]);
        self.render_controls(frame, layout[1]);

        if self.loading {
            self.render_skeletons(frame, layout[2]);
        } else if self.board.is_empty() {
            self.render_empty(frame, layout[2]);
        } else {
            self.render_grid(frame, layout[2]);
        }

        self.render_toasts(frame, area);

        if self.picker_open {
            self.render_picker(frame, area);
        }
    }

    fn captures_input(&self) -> bool {
        self.picker_open || self.search_active
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

// ── DashboardView ───────────────────────────────────────────────────

impl DashboardView for DashboardScreen {
    fn render_company_options(&mut self, options: &CompanyOptions) {
        self.options = options.clone();
        let position = self
            .selected_company
            .as_ref()
            .and_then(|id| self.options.position_of(id))
            .unwrap_or(0);
        self.picker_state.select(Some(position));
    }

    fn render_devices(&mut self, board: &DeviceBoard) {
        self.bars = board
            .cards()
            .iter()
            .map(|d| (d.id.clone(), sparkline::random_bars()))
            .collect();
        self.board = board.clone();
        self.scroll_row = self.scroll_row.min(self.board.cards().len());
    }

    fn set_loading(&mut self, show: bool) {
        self.loading = show;
    }

    fn toast(&mut self, message: String) {
        self.toasts.push_back(Toast {
            message,
            shown_at: Instant::now(),
        });
    }

    fn set_last_updated(&mut self, at: DateTime<Local>) {
        self.last_updated = Some(at);
    }

    fn set_pause_label(&mut self, label: &'static str) {
        self.pause_label = label;
    }
}

//! Device status badge: ● online / ○ offline with color mapping.

use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use fleetpulse_core::DeviceStatus;

use crate::theme;

/// Returns the status dot character without styling (for raw output).
pub fn status_char(status: DeviceStatus) -> &'static str {
    match status {
        DeviceStatus::Online => "●",
        DeviceStatus::Offline => "○",
    }
}

/// Returns a styled `Span` like `● online`.
pub fn badge_span(status: DeviceStatus) -> Span<'static> {
    Span::styled(
        format!("{} {status}", status_char(status)),
        Style::default()
            .fg(theme::status_color(status))
            .add_modifier(Modifier::BOLD),
    )
}

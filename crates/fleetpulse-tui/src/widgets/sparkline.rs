//! Decorative activity bars on device cards: ▁▂▃▄▅▆▇█.
//!
//! Purely cosmetic: heights are random and regenerated whenever the board is
//! rendered. Nothing here reflects device telemetry.

use rand::Rng;
use ratatui::style::Style;
use ratatui::text::Span;

use fleetpulse_core::DeviceStatus;

use crate::theme;

pub const BAR_COUNT: usize = 8;

const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Random bar heights in `0..8`.
pub fn random_bars() -> [u8; BAR_COUNT] {
    let mut rng = rand::rng();
    std::array::from_fn(|_| rng.random_range(0..8))
}

/// Bar heights as block characters. Out-of-range heights clamp to full.
pub fn bars_text(bars: &[u8]) -> String {
    bars.iter()
        .map(|&h| LEVELS[usize::from(h).min(LEVELS.len() - 1)])
        .collect()
}

/// Styled bars, dimmed for offline devices.
pub fn bars_span(bars: &[u8], status: DeviceStatus) -> Span<'static> {
    let color = match status {
        DeviceStatus::Online => theme::NEON_CYAN,
        DeviceStatus::Offline => theme::BORDER_GRAY,
    };
    Span::styled(bars_text(bars), Style::default().fg(color))
}

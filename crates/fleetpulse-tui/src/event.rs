//! Terminal input plus the two clocks the dashboard runs on.
//!
//! `Tick` expires toasts and spins the loading throbber, so its period
//! follows the toast duration. `Render` paces redraws. Poll ticks for device
//! refreshes do not come from here; they arrive from the core poll timer.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

const MIN_TICK: Duration = Duration::from_millis(50);
const MAX_TICK: Duration = Duration::from_millis(250);
/// Ticks per toast lifetime; expiry lags by one tick at most.
const TICKS_PER_TOAST: u32 = 14;
const RENDER_PERIOD: Duration = Duration::from_millis(33);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
    Render,
}

/// Periods of the `Tick` and `Render` clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRates {
    pub tick: Duration,
    pub render: Duration,
}

impl EventRates {
    /// Tick fast enough that a toast outlives its duration by a small
    /// fraction at most, without spinning faster than 20 Hz.
    pub fn for_toasts(toast_duration: Duration) -> Self {
        Self {
            tick: (toast_duration / TICKS_PER_TOAST).clamp(MIN_TICK, MAX_TICK),
            render: RENDER_PERIOD,
        }
    }
}

/// Keep key presses and resizes. Releases, repeats, mouse, focus and paste
/// events are dropped.
fn classify(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
        _ => None,
    }
}

fn clock(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Merges terminal input and both clocks onto one channel, read by the app
/// loop. The reader task ends on `stop`, on drop, or when the terminal
/// stream closes.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn new(rates: EventRates) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(read_events(tx, rates, cancel.clone()));
        Self { rx, cancel }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn read_events(
    tx: mpsc::UnboundedSender<Event>,
    rates: EventRates,
    cancel: CancellationToken,
) {
    let mut terminal = EventStream::new();
    let mut tick = clock(rates.tick);
    let mut render = clock(rates.render);

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => return,
            _ = tick.tick() => Event::Tick,
            _ = render.tick() => Event::Render,
            input = terminal.next() => match input {
                Some(Ok(raw)) => match classify(raw) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "terminal read failed");
                    continue;
                }
                None => return,
            },
        };

        if tx.send(event).is_err() {
            return;
        }
    }
}

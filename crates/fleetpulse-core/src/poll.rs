// ── Poll controller ──
//
// Owns the single recurring refresh timer. The timer runs as a tokio task
// and reports each period as a `PollTick` on an unbounded channel; the
// dashboard decides at delivery time whether a tick turns into a refresh.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Flags that gate the timer. `paused` overrides `auto_refresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollFlags {
    pub auto_refresh: bool,
    pub paused: bool,
}

impl PollFlags {
    pub fn should_arm(self) -> bool {
        self.auto_refresh && !self.paused
    }
}

/// One timer period elapsed.
///
/// `generation` identifies the timer that fired. Ticks already queued when
/// a timer is replaced carry the old generation and are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTick {
    pub generation: u64,
}

/// Observable timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Stopped,
    Armed { generation: u64 },
}

struct ArmedTimer {
    generation: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// `{Stopped, Armed}` timer state machine.
///
/// `start` always tears down the existing timer first, so at most one
/// timer task is alive at any time. Must be driven from inside a tokio
/// runtime.
pub struct PollController {
    period: Duration,
    ticks: mpsc::UnboundedSender<PollTick>,
    generation: u64,
    armed: Option<ArmedTimer>,
}

impl std::fmt::Debug for PollController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollController")
            .field("period", &self.period)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl PollController {
    /// Create a stopped controller and the receiving end of its tick channel.
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<PollTick>) {
        let (ticks, rx) = mpsc::unbounded_channel();
        let controller = Self {
            period,
            ticks,
            generation: 0,
            armed: None,
        };
        (controller, rx)
    }

    pub fn state(&self) -> PollState {
        match &self.armed {
            Some(timer) => PollState::Armed {
                generation: timer.generation,
            },
            None => PollState::Stopped,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Whether `tick` came from the currently armed timer.
    pub fn is_current(&self, tick: PollTick) -> bool {
        self.armed
            .as_ref()
            .is_some_and(|timer| timer.generation == tick.generation)
    }

    /// Stop any running timer, then arm a new one if `flags` allow it.
    pub fn start(&mut self, flags: PollFlags) -> PollState {
        self.stop();

        if !flags.should_arm() {
            debug!(?flags, "poll timer left stopped");
            return PollState::Stopped;
        }

        self.generation += 1;
        let generation = self.generation;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(timer_task(
            self.period,
            generation,
            self.ticks.clone(),
            cancel.clone(),
        ));

        debug!(generation, period_ms = self.period.as_millis(), "poll timer armed");
        self.armed = Some(ArmedTimer {
            generation,
            cancel,
            handle,
        });
        PollState::Armed { generation }
    }

    /// Cancel the running timer. Idempotent.
    pub fn stop(&mut self) {
        if let Some(timer) = self.armed.take() {
            timer.cancel.cancel();
            timer.handle.abort();
            debug!(generation = timer.generation, "poll timer stopped");
        }
    }
}

impl Drop for PollController {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn timer_task(
    period: Duration,
    generation: u64,
    ticks: mpsc::UnboundedSender<PollTick>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                trace!(generation, "poll tick");
                if ticks.send(PollTick { generation }).is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARMED: PollFlags = PollFlags {
        auto_refresh: true,
        paused: false,
    };

    fn drain(rx: &mut mpsc::UnboundedReceiver<PollTick>) -> Vec<PollTick> {
        let mut out = Vec::new();
        while let Ok(tick) = rx.try_recv() {
            out.push(tick);
        }
        out
    }

    #[test]
    fn paused_overrides_auto_refresh() {
        assert!(ARMED.should_arm());
        assert!(!PollFlags { auto_refresh: true, paused: true }.should_arm());
        assert!(!PollFlags { auto_refresh: false, paused: false }.should_arm());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_start_leaves_one_timer() {
        let (mut poller, mut rx) = PollController::new(Duration::from_secs(10));

        poller.start(ARMED);
        poller.start(ARMED);
        let state = poller.start(ARMED);
        assert_eq!(state, PollState::Armed { generation: 3 });

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        let ticks = drain(&mut rx);
        assert_eq!(ticks, vec![PollTick { generation: 3 }]);

        tokio::time::sleep(Duration::from_secs(10)).await;
        let ticks = drain(&mut rx);
        assert_eq!(ticks.len(), 1);
        assert!(poller.is_current(ticks[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn no_timer_when_auto_refresh_off() {
        let (mut poller, mut rx) = PollController::new(Duration::from_secs(10));

        let state = poller.start(PollFlags {
            auto_refresh: false,
            paused: false,
        });

        assert_eq!(state, PollState::Stopped);
        tokio::time::sleep(Duration::from_secs(35)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn no_timer_when_paused() {
        let (mut poller, mut rx) = PollController::new(Duration::from_secs(10));
        poller.start(ARMED);

        poller.start(PollFlags {
            auto_refresh: true,
            paused: true,
        });

        assert!(!poller.is_armed());
        tokio::time::sleep(Duration::from_secs(35)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let (mut poller, mut rx) = PollController::new(Duration::from_secs(1));
        poller.start(ARMED);
        poller.stop();
        poller.stop();

        assert_eq!(poller.state(), PollState::Stopped);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_from_replaced_timer_are_not_current() {
        let (mut poller, _rx) = PollController::new(Duration::from_secs(10));
        poller.start(ARMED);
        poller.start(ARMED);

        assert!(!poller.is_current(PollTick { generation: 1 }));
        assert!(poller.is_current(PollTick { generation: 2 }));
    }
}

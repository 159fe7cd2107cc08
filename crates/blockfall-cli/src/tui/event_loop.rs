use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CrosstermEvent};

/// Events delivered to TUI applications.
#[derive(Debug, Clone, derive_more::From)]
pub(super) enum TuiEvent {
    /// Logic update timing, based on the tick interval.
    Tick,
    /// Screen render timing. Emitted after any tick or terminal event.
    Render,
    /// Terminal events such as key input and resize.
    Crossterm(CrosstermEvent),
}

/// Paces the event loop: ticks at a fixed interval, renders whenever state
/// may have changed, and forwards terminal events as they arrive.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick_interval: Duration,
    last_tick: Instant,
    dirty: bool,
}

impl EventLoop {
    pub(super) fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            last_tick: Instant::now(),
            dirty: true, // Initial render is required on startup
        }
    }

    pub(super) fn set_tick_interval(&mut self, interval: Duration) {
        self.tick_interval = interval;
    }

    /// Returns the next event, blocking until a tick is due or the terminal
    /// produces input.
    pub(super) fn next(&mut self) -> anyhow::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if now.duration_since(self.last_tick) >= self.tick_interval {
                self.last_tick = now;
                self.dirty = true;
                return Ok(TuiEvent::Tick);
            }

            if self.dirty {
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }

            let next_tick_at = self.last_tick + self.tick_interval;
            if !event::poll(next_tick_at.saturating_duration_since(now))? {
                continue;
            }

            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }
}

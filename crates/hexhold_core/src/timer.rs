//! Recurring work timer driven by the simulation clock.
//!
//! A timer never fires on its own: the owner advances it by the tick
//! duration and receives the number of periods that elapsed. Firings are
//! therefore tick-boundary events, processed synchronously.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum TimerState {
    Idle,
    Running,
    /// Terminal; set by [`RecurringTimer::stop`].
    Stopped,
}

/// Infinite repeating timer with a fixed period in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringTimer {
    period_ms: u64,
    elapsed_ms: u64,
    state: TimerState,
}

impl RecurringTimer {
    /// New idle timer.
    ///
    /// # Panics
    ///
    /// Panics if `period_ms` is zero.
    #[must_use]
    pub fn new(period_ms: u64) -> Self {
        assert!(period_ms > 0, "RecurringTimer period must be positive");
        Self {
            period_ms,
            elapsed_ms: 0,
            state: TimerState::Idle,
        }
    }

    /// Period in milliseconds.
    #[must_use]
    pub const fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Milliseconds accumulated toward the next firing.
    #[must_use]
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// True while started and not reset or stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// True once [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state == TimerState::Stopped
    }

    /// Start counting. No effect if already running or stopped.
    pub fn start(&mut self) {
        if self.state == TimerState::Idle {
            self.state = TimerState::Running;
        }
    }

    /// Advance by `dt_ms`; returns how many periods completed.
    pub fn advance(&mut self, dt_ms: u64) -> u64 {
        if !self.is_running() {
            return 0;
        }
        self.elapsed_ms += dt_ms;
        let firings = self.elapsed_ms / self.period_ms;
        self.elapsed_ms %= self.period_ms;
        firings
    }

    /// Stop and zero; a later [`start`](Self::start) begins a fresh period.
    pub fn reset(&mut self) {
        if self.state != TimerState::Stopped {
            self.state = TimerState::Idle;
        }
        self.elapsed_ms = 0;
    }

    /// Stop permanently. The timer never fires again.
    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
        self.elapsed_ms = 0;
    }
}

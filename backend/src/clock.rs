//! Per-match chess clock
//!
//! Two countdowns in milliseconds, never negative. Increments and penalties
//! are applied server-side the moment the session accepts a move or confirms
//! an illegal one. Elapsed time reaches the clock in one of two ways,
//! depending on [`ClockMode`]:
//!
//! - `Client`: players push their measured remaining time; a push replaces
//!   the server's value only when it differs by more than [`DRIFT_SLACK_MS`].
//! - `Server`: the owning actor calls [`Clock::tick`] periodically and the
//!   side to move is charged for wall-clock time since the previous tick.

use chess_engine::Color;
use shared::TimeControl;
use tokio::time::Instant;

/// Deducted from a side's clock for every confirmed illegal move
pub const ILLEGAL_MOVE_PENALTY_MS: u64 = 5_000;

/// Client pushes within this distance of the server's value are ignored
pub const DRIFT_SLACK_MS: u64 = 1_000;

/// Who is authoritative for elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ClockMode {
    #[default]
    Client,
    Server,
}

#[derive(Debug, Clone)]
pub struct Clock {
    remaining_ms: [u64; 2],
    increment_ms: u64,
    running: bool,
    last_tick_at: Option<Instant>,
}

impl Clock {
    pub fn new(time_control: TimeControl) -> Self {
        let initial = time_control.initial_ms();
        Self {
            remaining_ms: [initial, initial],
            increment_ms: time_control.increment_ms(),
            running: false,
            last_tick_at: None,
        }
    }

    pub fn remaining(&self, color: Color) -> u64 {
        self.remaining_ms[color.idx()]
    }

    pub fn increment_ms(&self) -> u64 {
        self.increment_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self, now: Instant) {
        self.running = true;
        self.last_tick_at = Some(now);
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.last_tick_at = None;
    }

    /// Credit the increment to the side that just moved
    pub fn credit_increment(&mut self, mover: Color) {
        let slot = &mut self.remaining_ms[mover.idx()];
        *slot = slot.saturating_add(self.increment_ms);
    }

    /// Deduct the illegal-move penalty, returning the new remaining time
    pub fn apply_penalty(&mut self, color: Color) -> u64 {
        let slot = &mut self.remaining_ms[color.idx()];
        *slot = slot.saturating_sub(ILLEGAL_MOVE_PENALTY_MS);
        *slot
    }

    /// Reconcile with a client-measured pair of values
    ///
    /// Negative pushes count as zero. Returns true if either side was adopted.
    pub fn sync_from_client(&mut self, white_ms: i64, black_ms: i64) -> bool {
        let mut adopted = false;
        for (color, pushed) in [(Color::White, white_ms), (Color::Black, black_ms)] {
            let pushed = pushed.max(0) as u64;
            let slot = &mut self.remaining_ms[color.idx()];
            if slot.abs_diff(pushed) > DRIFT_SLACK_MS {
                *slot = pushed;
                adopted = true;
            }
        }
        adopted
    }

    /// Largest distance between a client push and the server's values
    pub fn drift_ms(&self, white_ms: i64, black_ms: i64) -> u64 {
        let white = self.remaining(Color::White).abs_diff(white_ms.max(0) as u64);
        let black = self.remaining(Color::Black).abs_diff(black_ms.max(0) as u64);
        white.max(black)
    }

    /// Charge `side` for the time since the last tick
    ///
    /// Returns true when that side has run out. A stopped clock never changes.
    pub fn tick(&mut self, side: Color, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        if let Some(last) = self.last_tick_at {
            let elapsed = now.saturating_duration_since(last).as_millis() as u64;
            let slot = &mut self.remaining_ms[side.idx()];
            *slot = slot.saturating_sub(elapsed);
        }
        self.last_tick_at = Some(now);
        self.remaining_ms[side.idx()] == 0
    }
}

use rand::{Rng, RngCore};

use super::context::TickContext;
use super::snapshot::SnapshotBoard;
use crate::model::GameTime;

/// A coordinator-owned subsystem that runs once per coordinator tick.
///
/// Object-safe so the coordinator can walk its subsystems in dependency order
/// as `&mut dyn Subsystem`.
pub trait Subsystem {
    fn name(&self) -> &str;

    /// React to signals published since this subsystem's previous turn.
    ///
    /// Called right before `tick()` with the inbox in `ctx.inbox`.
    /// Default: no-op.
    fn handle_signals(&mut self, ctx: &mut TickContext) {
        let _ = ctx;
    }

    fn tick(&mut self, ctx: &mut TickContext);

    /// Copy this subsystem's state onto the board. Called at the end of its turn.
    fn publish(&self, board: &mut SnapshotBoard);
}

/// How often a host fires, in game time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cadence {
    /// Fixed period.
    Every(GameTime),
    /// A fresh uniformly random period between the bounds after every firing.
    Randomized { min: GameTime, max: GameTime },
}

impl Cadence {
    pub fn next_period(&self, rng: &mut dyn RngCore) -> GameTime {
        match *self {
            Cadence::Every(period) => period,
            Cadence::Randomized { min, max } => {
                if max <= min {
                    return min;
                }
                GameTime::from_millis(rng.random_range(min.as_millis()..=max.as_millis()))
            }
        }
    }
}

/// Tracks when a host with a given cadence is next due.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CadenceTimer {
    cadence: Cadence,
    next_due: GameTime,
}

impl CadenceTimer {
    /// First firing one period after `start`.
    pub fn starting_at(cadence: Cadence, start: GameTime, rng: &mut dyn RngCore) -> Self {
        Self {
            cadence,
            next_due: start + cadence.next_period(rng),
        }
    }

    /// Fixed-period timer, first firing one period after `start`.
    pub fn every(period: GameTime, start: GameTime) -> Self {
        Self {
            cadence: Cadence::Every(period),
            next_due: start + period,
        }
    }

    pub fn next_due(&self) -> GameTime {
        self.next_due
    }

    /// Returns true (and schedules the next firing) if the timer is due at `now`.
    ///
    /// Fires at most once per call; a host that fell behind catches up one
    /// period per call.
    pub fn should_fire(&mut self, now: GameTime, rng: &mut dyn RngCore) -> bool {
        if now < self.next_due {
            return false;
        }
        self.schedule_after(self.cadence.next_period(rng));
        true
    }

    /// [`should_fire`](Self::should_fire) without randomness. A randomized
    /// cadence falls back to its minimum period.
    pub fn fire_if_due(&mut self, now: GameTime) -> bool {
        if now < self.next_due {
            return false;
        }
        let period = match self.cadence {
            Cadence::Every(period) => period,
            Cadence::Randomized { min, .. } => min,
        };
        self.schedule_after(period);
        true
    }

    fn schedule_after(&mut self, period: GameTime) {
        self.next_due = self.next_due + period.max(GameTime::from_millis(1));
    }
}

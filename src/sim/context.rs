use rand::RngCore;

use super::signal::{Signal, SignalKind};
use super::snapshot::SnapshotBoard;
use crate::market::MarketView;
use crate::model::GameTime;

/// Context passed to each subsystem on its turn.
///
/// Everything a subsystem may read about the rest of the engine is in here as
/// an immutable copy; the only way to affect another subsystem is `emit`.
pub struct TickContext<'a> {
    pub tick: u64,
    pub now: GameTime,
    pub rng: &'a mut dyn RngCore,
    pub market: &'a MarketView,
    pub board: &'a SnapshotBoard,
    /// Signals published since this subsystem's previous turn (read-only).
    pub inbox: &'a [Signal],
    /// Subsystems push signals here during `handle_signals`/`tick`.
    pub signals: &'a mut Vec<Signal>,
}

impl TickContext<'_> {
    pub fn emit(&mut self, kind: SignalKind) {
        self.signals.push(Signal {
            tick: self.tick,
            kind,
        });
    }
}

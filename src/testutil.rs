use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::market::MarketView;
use crate::model::{GameTime, PlayerAction, SingularityPhase};
use crate::sim::{Signal, SignalKind, SnapshotBoard, Subsystem, TickContext};

// ---------------------------------------------------------------------------
// Turn execution helpers
// ---------------------------------------------------------------------------

/// Run one full turn of a subsystem (`handle_signals`, `tick`, `publish`) with
/// the given inbox. Returns the emitted signals.
pub fn run_turn(
    system: &mut dyn Subsystem,
    board: &mut SnapshotBoard,
    market: &MarketView,
    inbox: &[Signal],
    tick: u64,
    seed: u64,
) -> Vec<Signal> {
    let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(tick));
    let mut signals = Vec::new();
    {
        let mut ctx = TickContext {
            tick,
            now: GameTime::from_secs(tick * 5),
            rng: &mut rng,
            market,
            board: &*board,
            inbox,
            signals: &mut signals,
        };
        system.handle_signals(&mut ctx);
        system.tick(&mut ctx);
    }
    system.publish(board);
    signals
}

/// Run `ticks` turns with an empty inbox. Returns every emitted signal.
pub fn run_turns(
    system: &mut dyn Subsystem,
    board: &mut SnapshotBoard,
    market: &MarketView,
    ticks: u64,
) -> Vec<Signal> {
    let mut all = Vec::new();
    for tick in 1..=ticks {
        all.extend(run_turn(system, board, market, &[], tick, 42));
    }
    all
}

// ---------------------------------------------------------------------------
// Signal constructors
// ---------------------------------------------------------------------------

pub fn signal(kind: SignalKind) -> Signal {
    Signal { tick: 0, kind }
}

pub fn transition(from: SingularityPhase, to: SingularityPhase) -> Signal {
    signal(SignalKind::PhaseTransition {
        from,
        to,
        forced: false,
    })
}

pub fn player_acted(action: PlayerAction) -> Signal {
    signal(SignalKind::PlayerActed { action })
}

pub fn phase_transitions(signals: &[Signal]) -> Vec<(SingularityPhase, SingularityPhase)> {
    signals
        .iter()
        .filter_map(|s| match s.kind {
            SignalKind::PhaseTransition { from, to, .. } => Some((from, to)),
            _ => None,
        })
        .collect()
}

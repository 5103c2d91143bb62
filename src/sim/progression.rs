use std::collections::VecDeque;

use super::context::TickContext;
use super::signal::SignalKind;
use super::snapshot::{ProgressionSnapshot, SnapshotBoard};
use super::system::Subsystem;
use crate::config::ProgressionConfig;
use crate::model::{GameTime, SingularityPhase, SingularityProgress};

/// Per-phase speed-up of the base rate.
const PHASE_ACCELERATION: f64 = 0.1;
/// Progress bonus per breakthrough inside the window.
const BREAKTHROUGH_BONUS: f64 = 0.05;
const MAX_TECHNOLOGY_FACTOR: f64 = 0.5;
const EFFICIENCY_WEIGHT: f64 = 0.5;

/// Drives the eight-phase arc toward the singularity.
///
/// Progress only moves forward; `reset` is the single way back to the start.
/// Every phase floor crossed emits one `PhaseTransition`, and saturating
/// progress in the terminal phase emits `SingularityReached` exactly once.
pub struct ProgressionEngine {
    config: ProgressionConfig,
    tick_interval: GameTime,
    state: SingularityProgress,
    last_delta: f64,
    last_tick: u64,
    /// Ticks on which a breakthrough was reported, oldest first.
    breakthroughs: VecDeque<u64>,
    singularity_announced: bool,
}

/// Progress modifiers for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressFactors {
    pub economic: f64,
    pub technology: f64,
    pub efficiency: f64,
}

impl ProgressFactors {
    pub fn sum(&self) -> f64 {
        self.economic + self.technology + self.efficiency
    }
}

impl ProgressionEngine {
    pub fn new(config: ProgressionConfig, tick_interval: GameTime) -> Self {
        Self {
            config,
            tick_interval,
            state: SingularityProgress::default(),
            last_delta: 0.0,
            last_tick: 0,
            breakthroughs: VecDeque::new(),
            singularity_announced: false,
        }
    }

    pub fn state(&self) -> &SingularityProgress {
        &self.state
    }

    pub fn phase(&self) -> SingularityPhase {
        self.state.phase
    }

    pub fn progress(&self) -> f64 {
        self.state.progress
    }

    pub fn last_delta(&self) -> f64 {
        self.last_delta
    }

    /// Coordinator-owned tunable.
    pub fn set_acceleration(&mut self, acceleration: f64) {
        self.state.acceleration = acceleration.max(0.0);
    }

    /// Progress gained this tick, before clamping at 1.0.
    pub fn compute_delta(&self, factors: ProgressFactors) -> f64 {
        let base = self.config.base_rate;
        let gain = base
            * self.state.acceleration
            * (1.0 + PHASE_ACCELERATION * self.state.phase.index() as f64)
            * (1.0 + factors.sum());
        let resist = self.state.player_resistance * base * self.config.resistance_weight;
        (gain - resist).max(0.0)
    }

    /// Add `delta` to progress and emit a transition for every floor crossed.
    fn apply_progress(&mut self, delta: f64) -> Vec<SignalKind> {
        let mut emitted = Vec::new();
        self.state.progress = (self.state.progress + delta.max(0.0)).min(1.0);
        let target = SingularityPhase::for_progress(self.state.progress);
        while self.state.phase < target {
            let Some(next) = self.state.phase.next() else {
                break;
            };
            tracing::info!(
                from = %self.state.phase,
                to = %next,
                progress = self.state.progress,
                "singularity phase transition"
            );
            emitted.push(SignalKind::PhaseTransition {
                from: self.state.phase,
                to: next,
                forced: false,
            });
            self.state.phase = next;
        }
        if self.state.is_complete() && !self.singularity_announced {
            self.singularity_announced = true;
            tracing::info!("singularity reached");
            emitted.push(SignalKind::SingularityReached);
        }
        emitted
    }

    /// Move exactly one phase forward regardless of progress, aligning progress
    /// to the new phase's floor. Returns `None` in the terminal phase.
    pub fn force_advance(&mut self) -> Option<SignalKind> {
        let from = self.state.phase;
        let to = from.next()?;
        self.state.progress = self.state.progress.max(to.floor());
        self.state.phase = to;
        self.last_delta = 0.0;
        tracing::info!(%from, %to, progress = self.state.progress, "forced phase advance");
        Some(SignalKind::PhaseTransition {
            from,
            to,
            forced: true,
        })
    }

    /// Back to the first phase with zero progress and resistance.
    pub fn reset(&mut self) {
        let acceleration = self.state.acceleration;
        self.state = SingularityProgress {
            acceleration,
            ..SingularityProgress::default()
        };
        self.last_delta = 0.0;
        self.breakthroughs.clear();
        self.singularity_announced = false;
    }

    fn recent_breakthroughs(&self, tick: u64) -> usize {
        let window = self.config.breakthrough_window_ticks;
        self.breakthroughs
            .iter()
            .filter(|t| tick.saturating_sub(**t) < window)
            .count()
    }

    fn prune_breakthroughs(&mut self, tick: u64) {
        let window = self.config.breakthrough_window_ticks;
        while let Some(front) = self.breakthroughs.front() {
            if tick.saturating_sub(*front) >= window {
                self.breakthroughs.pop_front();
            } else {
                break;
            }
        }
    }

    /// Estimated game time until progress reaches 1.0 at the current rate.
    pub fn time_to_singularity(&self) -> Option<GameTime> {
        if self.state.progress >= 1.0 {
            return Some(GameTime::ZERO);
        }
        if self.last_delta <= 0.0 {
            return None;
        }
        let ticks = (1.0 - self.state.progress) / self.last_delta;
        Some(GameTime::from_secs_f64(ticks * self.tick_interval.as_secs_f64()))
    }
}

impl Subsystem for ProgressionEngine {
    fn name(&self) -> &str {
        "progression"
    }

    fn handle_signals(&mut self, ctx: &mut TickContext) {
        for signal in ctx.inbox {
            match &signal.kind {
                SignalKind::Breakthrough { .. } => self.breakthroughs.push_back(signal.tick),
                SignalKind::PlayerActed { action } => {
                    let gained = action.effectiveness.factor() * self.config.resistance_per_action;
                    self.state.player_resistance =
                        (self.state.player_resistance + gained).clamp(0.0, 1.0);
                }
                _ => {}
            }
        }
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        self.last_tick = ctx.tick;
        self.prune_breakthroughs(ctx.tick);

        let indicators = ctx.market.indicators;
        let factors = ProgressFactors {
            economic: (0.5 * indicators.growth + 0.3 * indicators.trade_volume).clamp(0.0, 1.0),
            technology: (BREAKTHROUGH_BONUS * self.recent_breakthroughs(ctx.tick) as f64)
                .min(MAX_TECHNOLOGY_FACTOR),
            efficiency: EFFICIENCY_WEIGHT * ctx.board.competitors.mean_efficiency.clamp(0.0, 1.0),
        };

        let before = self.state.progress;
        let delta = self.compute_delta(factors);
        for kind in self.apply_progress(delta) {
            ctx.emit(kind);
        }
        self.last_delta = self.state.progress - before;

        self.state.player_resistance =
            (self.state.player_resistance * (1.0 - self.config.resistance_decay)).clamp(0.0, 1.0);

        tracing::debug!(
            tick = ctx.tick,
            progress = self.state.progress,
            delta = self.last_delta,
            economic = factors.economic,
            technology = factors.technology,
            efficiency = factors.efficiency,
            "progression advanced"
        );
    }

    fn publish(&self, board: &mut SnapshotBoard) {
        board.progression = ProgressionSnapshot {
            tick: self.last_tick,
            phase: self.state.phase,
            progress: self.state.progress,
            player_resistance: self.state.player_resistance,
            acceleration: self.state.acceleration,
            last_delta: self.last_delta,
            recent_breakthroughs: self.recent_breakthroughs(self.last_tick),
            time_to_singularity_secs: self.time_to_singularity().map(GameTime::as_secs_f64),
            complete: self.state.is_complete(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{MarketIndicators, MarketView};
    use crate::model::{ActionEffectiveness, CapabilityType, CompetitorId, PlayerAction, PlayerActionType};
    use crate::sim::Signal;
    use crate::testutil::{phase_transitions, player_acted, run_turn, run_turns, signal};

    fn engine() -> ProgressionEngine {
        ProgressionEngine::new(ProgressionConfig::default(), GameTime::from_secs(5))
    }

    #[test]
    fn phase_two_after_exactly_64_ticks_without_factors() {
        let mut engine = engine();
        let mut board = SnapshotBoard::default();
        let market = MarketView::default();

        let early = run_turns(&mut engine, &mut board, &market, 63);
        assert!(phase_transitions(&early).is_empty());
        assert_eq!(engine.phase(), SingularityPhase::EarlyAutomation);

        let signals = run_turn(&mut engine, &mut board, &market, &[], 64, 42);
        assert_eq!(
            phase_transitions(&signals),
            vec![(SingularityPhase::EarlyAutomation, SingularityPhase::PatternMastery)]
        );
        assert_eq!(engine.progress(), 0.125);
        assert_eq!(board.progression.phase, SingularityPhase::PatternMastery);
    }

    #[test]
    fn progress_is_monotone_and_phase_matches_progress() {
        let mut engine = engine();
        let mut board = SnapshotBoard::default();
        let market = MarketView {
            indicators: MarketIndicators {
                growth: 0.8,
                trade_volume: 0.6,
            },
            ..MarketView::default()
        };
        let mut previous = 0.0;
        for tick in 1..=400 {
            let inbox = if tick % 7 == 0 {
                vec![player_acted(PlayerAction::new(
                    PlayerActionType::PriceCompetition,
                    ActionEffectiveness::Excellent,
                ))]
            } else {
                Vec::new()
            };
            run_turn(&mut engine, &mut board, &market, &inbox, tick, 1);
            assert!(engine.progress() >= previous);
            assert!(engine.progress() <= 1.0);
            assert_eq!(engine.phase(), SingularityPhase::for_progress(engine.progress()));
            previous = engine.progress();
        }
    }

    #[test]
    fn forced_advance_from_phase_three_aligns_to_phase_four_floor() {
        let mut engine = engine();
        engine.force_advance();
        engine.force_advance();
        assert_eq!(engine.phase(), SingularityPhase::PredictiveDominance);

        let mut board = SnapshotBoard::default();
        run_turns(&mut engine, &mut board, &MarketView::default(), 3);
        assert!(engine.progress() > 0.25);

        let signal = engine.force_advance();
        assert_eq!(
            signal,
            Some(SignalKind::PhaseTransition {
                from: SingularityPhase::PredictiveDominance,
                to: SingularityPhase::StrategicIntegration,
                forced: true,
            })
        );
        assert_eq!(engine.phase(), SingularityPhase::StrategicIntegration);
        assert_eq!(engine.progress(), SingularityPhase::StrategicIntegration.floor());
    }

    #[test]
    fn forced_advance_is_noop_in_terminal_phase() {
        let mut engine = engine();
        for _ in 0..7 {
            assert!(engine.force_advance().is_some());
        }
        assert!(engine.phase().is_terminal());
        assert_eq!(engine.force_advance(), None);
        assert_eq!(engine.phase(), SingularityPhase::TheSingularity);
    }

    #[test]
    fn singularity_is_announced_once() {
        let mut engine = ProgressionEngine::new(
            ProgressionConfig {
                base_rate: 0.25,
                ..ProgressionConfig::default()
            },
            GameTime::from_secs(5),
        );
        let mut board = SnapshotBoard::default();
        let signals = run_turns(&mut engine, &mut board, &MarketView::default(), 20);
        let reached = signals
            .iter()
            .filter(|s| s.kind == SignalKind::SingularityReached)
            .count();
        assert_eq!(reached, 1);
        // one transition per floor even when a single tick crosses several
        assert_eq!(phase_transitions(&signals).len(), 7);
        assert!(board.progression.complete);
    }

    #[test]
    fn resistance_slows_progress_and_decays() {
        let mut engine = engine();
        let mut board = SnapshotBoard::default();
        let market = MarketView::default();
        let action = PlayerAction::new(PlayerActionType::ExpressDelivery, ActionEffectiveness::Excellent);
        let inbox: Vec<Signal> = (0..10).map(|_| player_acted(action)).collect();
        run_turn(&mut engine, &mut board, &market, &inbox, 1, 1);
        let resisted = engine.last_delta();
        assert!(resisted < ProgressionConfig::default().base_rate);
        assert!(board.progression.player_resistance > 0.0);

        let before = board.progression.player_resistance;
        run_turn(&mut engine, &mut board, &market, &[], 2, 1);
        assert!(board.progression.player_resistance < before);
    }

    #[test]
    fn breakthroughs_speed_up_progress_within_window() {
        let mut engine = engine();
        let mut board = SnapshotBoard::default();
        let market = MarketView::default();
        let breakthrough = signal(SignalKind::Breakthrough {
            competitor: CompetitorId(1),
            capability: CapabilityType::RouteOptimization,
        });
        run_turn(&mut engine, &mut board, &market, &[breakthrough.clone(), breakthrough], 1, 1);
        assert_eq!(board.progression.recent_breakthroughs, 2);
        assert!(engine.last_delta() > ProgressionConfig::default().base_rate);

        for tick in 2..=25 {
            run_turn(&mut engine, &mut board, &market, &[], tick, 1);
        }
        assert_eq!(board.progression.recent_breakthroughs, 0);
    }

    #[test]
    fn time_to_singularity_uses_last_delta() {
        let mut engine = engine();
        assert_eq!(engine.time_to_singularity(), None);
        let mut board = SnapshotBoard::default();
        run_turn(&mut engine, &mut board, &MarketView::default(), &[], 1, 1);
        // (1 - 1/512) / (1/512) ticks of 5 s
        let eta = board.progression.time_to_singularity_secs.unwrap();
        assert!((eta - 511.0 * 5.0).abs() < 1e-6);
    }

    #[test]
    fn reset_returns_to_start() {
        let mut engine = engine();
        engine.set_acceleration(1.5);
        engine.force_advance();
        engine.reset();
        assert_eq!(engine.phase(), SingularityPhase::EarlyAutomation);
        assert_eq!(engine.progress(), 0.0);
        assert_eq!(engine.state().acceleration, 1.5);
    }
}

use super::context::TickContext;
use super::signal::SignalKind;
use super::snapshot::{PressureSnapshot, SnapshotBoard};
use super::system::Subsystem;
use crate::model::{DisruptionSeverity, PlayerAction, PressureSource, PressureState, SingularityPhase};

/// Fraction of every source lost per tick.
const SOURCE_DECAY: f64 = 0.03;
/// Pressure removed by an excellent player action before relief shares.
const BASE_RELIEF: f64 = 0.1;
const TEMPORAL_TARGET: f64 = 0.6;
/// How far temporal pressure closes the gap to its target each tick.
const TEMPORAL_CATCH_UP: f64 = 0.25;
const THREAT_PSYCHOLOGICAL: f64 = 0.004;

/// Five independent pressure accumulators and their weighted total.
///
/// Signals inject pressure, every source decays a little each tick, and
/// [`PressureModel::apply_relief`] is the only mutation from outside.
pub struct PressureModel {
    state: PressureState,
    injection_scale: f64,
    pending: Vec<(PressureSource, f64)>,
}

impl Default for PressureModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PressureModel {
    pub fn new() -> Self {
        Self {
            state: PressureState::default(),
            injection_scale: 1.0,
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> &PressureState {
        &self.state
    }

    pub fn injection_scale(&self) -> f64 {
        self.injection_scale
    }

    /// Coordinator-owned tunable.
    pub fn set_injection_scale(&mut self, scale: f64) {
        self.injection_scale = scale.max(0.0);
    }

    fn inject(&mut self, source: PressureSource, amount: f64) {
        self.pending.push((source, amount));
    }

    /// Reduce the sources a player action targets. Returns the pressure removed.
    pub fn apply_relief(&mut self, action: PlayerAction) -> f64 {
        let amount = BASE_RELIEF * action.effectiveness.factor();
        let mut removed = 0.0;
        for (source, share) in action.kind.relieves() {
            let before = self.state.level(*source);
            self.state.add(*source, -amount * share);
            removed += before - self.state.level(*source);
        }
        self.state.total = self.state.weighted_total();
        removed
    }
}

fn phase_injection(to: SingularityPhase) -> f64 {
    0.05 + 0.1 * to.normalized()
}

impl Subsystem for PressureModel {
    fn name(&self) -> &str {
        "pressure"
    }

    fn handle_signals(&mut self, ctx: &mut TickContext) {
        for signal in ctx.inbox {
            match &signal.kind {
                SignalKind::PhaseTransition { to, .. } => {
                    self.inject(PressureSource::Technological, phase_injection(*to));
                }
                SignalKind::EconomicDisruption { severity, .. } => match severity {
                    DisruptionSeverity::Severe => self.inject(PressureSource::Economic, 0.08),
                    DisruptionSeverity::High => self.inject(PressureSource::Economic, 0.04),
                    DisruptionSeverity::Minor | DisruptionSeverity::Moderate => {}
                },
                SignalKind::CompetitorAction { magnitude, .. } => {
                    self.inject(PressureSource::Market, 0.01 * magnitude.abs());
                }
                SignalKind::CompetitorEvolved { .. } | SignalKind::Breakthrough { .. } => {
                    self.inject(PressureSource::Psychological, 0.02);
                }
                _ => {}
            }
        }
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let previous = self.state.total;

        for source in PressureSource::ALL {
            let level = self.state.level(*source);
            self.state.set_level(*source, level * (1.0 - SOURCE_DECAY));
        }

        let scale = self.injection_scale;
        for (source, amount) in self.pending.drain(..) {
            self.state.add(source, amount * scale);
        }

        let threat = ctx.board.competitors.strongest_threat.index() as f64;
        self.state
            .add(PressureSource::Psychological, THREAT_PSYCHOLOGICAL * threat * scale);

        let target = TEMPORAL_TARGET * ctx.board.progression.progress;
        let temporal = self.state.level(PressureSource::Temporal);
        if temporal < target {
            self.state
                .set_level(PressureSource::Temporal, temporal + (target - temporal) * TEMPORAL_CATCH_UP);
        }

        self.state.total = self.state.weighted_total();
        self.state.growth_rate = self.state.total - previous;

        tracing::debug!(
            tick = ctx.tick,
            total = self.state.total,
            growth = self.state.growth_rate,
            dominant = %self.state.dominant_source(),
            "pressure updated"
        );
    }

    fn publish(&self, board: &mut SnapshotBoard) {
        board.pressure = PressureSnapshot {
            state: self.state.clone(),
            dominant: self.state.dominant_source(),
            injection_scale: self.injection_scale,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MarketView;
    use crate::model::{ActionEffectiveness, CompetitorId, PlayerActionType, ThreatLevel};
    use crate::testutil::{run_turn, signal, transition};

    #[test]
    fn phase_transition_injects_technological_pressure() {
        let mut model = PressureModel::new();
        let mut board = SnapshotBoard::default();
        let inbox = [transition(SingularityPhase::Convergence, SingularityPhase::TheSingularity)];
        run_turn(&mut model, &mut board, &MarketView::default(), &inbox, 1, 1);
        assert!((model.state().level(PressureSource::Technological) - 0.15).abs() < 1e-12);
        assert!((board.pressure.state.total - 0.2 * 0.15).abs() < 1e-12);
    }

    #[test]
    fn disruption_severity_sets_economic_injection() {
        let mut model = PressureModel::new();
        let mut board = SnapshotBoard::default();
        let disruption = |severity| {
            signal(SignalKind::EconomicDisruption {
                severity,
                impact: 0.8,
            })
        };
        let inbox = [
            disruption(DisruptionSeverity::Severe),
            disruption(DisruptionSeverity::High),
            disruption(DisruptionSeverity::Moderate),
        ];
        run_turn(&mut model, &mut board, &MarketView::default(), &inbox, 1, 1);
        assert!((model.state().level(PressureSource::Economic) - 0.12).abs() < 1e-12);
    }

    #[test]
    fn injection_scale_multiplies_injections() {
        let mut model = PressureModel::new();
        model.set_injection_scale(2.0);
        let mut board = SnapshotBoard::default();
        let evolved = signal(SignalKind::Breakthrough {
            competitor: CompetitorId(1),
            capability: crate::model::CapabilityType::PatternRecognition,
        });
        run_turn(&mut model, &mut board, &MarketView::default(), &[evolved], 1, 1);
        assert!((model.state().level(PressureSource::Psychological) - 0.04).abs() < 1e-12);
        assert_eq!(board.pressure.injection_scale, 2.0);
    }

    #[test]
    fn everything_stays_in_unit_interval() {
        let mut model = PressureModel::new();
        let mut board = SnapshotBoard::default();
        board.progression.progress = 1.0;
        board.competitors.strongest_threat = ThreatLevel::Existential;
        let inbox: Vec<_> = (0..200)
            .map(|_| {
                signal(SignalKind::EconomicDisruption {
                    severity: DisruptionSeverity::Severe,
                    impact: 1.0,
                })
            })
            .chain((0..200).map(|_| transition(SingularityPhase::Convergence, SingularityPhase::TheSingularity)))
            .collect();
        for tick in 1..=50 {
            run_turn(&mut model, &mut board, &MarketView::default(), &inbox, tick, 1);
            for (_, level) in model.state().sources() {
                assert!((0.0..=1.0).contains(&level));
            }
            assert!((0.0..=1.0).contains(&board.pressure.state.total));
        }
    }

    #[test]
    fn sources_decay_without_input() {
        let mut model = PressureModel::new();
        let mut board = SnapshotBoard::default();
        let inbox = [transition(SingularityPhase::EarlyAutomation, SingularityPhase::PatternMastery)];
        run_turn(&mut model, &mut board, &MarketView::default(), &inbox, 1, 1);
        let first = board.pressure.state.total;
        run_turn(&mut model, &mut board, &MarketView::default(), &[], 2, 1);
        assert!(board.pressure.state.total < first);
        assert!(board.pressure.state.growth_rate < 0.0);
    }

    #[test]
    fn relief_targets_mapped_sources_and_reports_amount() {
        let mut model = PressureModel::new();
        let mut board = SnapshotBoard::default();
        let inbox: Vec<_> = (0..5)
            .map(|_| {
                signal(SignalKind::EconomicDisruption {
                    severity: DisruptionSeverity::Severe,
                    impact: 1.0,
                })
            })
            .collect();
        run_turn(&mut model, &mut board, &MarketView::default(), &inbox, 1, 1);
        let economic = model.state().level(PressureSource::Economic);
        assert!((economic - 0.4).abs() < 1e-12);

        let removed = model.apply_relief(PlayerAction::new(
            PlayerActionType::Diversification,
            ActionEffectiveness::Good,
        ));
        assert!((removed - 0.075).abs() < 1e-12);
        assert!((model.state().level(PressureSource::Economic) - 0.325).abs() < 1e-12);

        // nothing to relieve: removes nothing
        let removed = model.apply_relief(PlayerAction::new(
            PlayerActionType::ExpressDelivery,
            ActionEffectiveness::Excellent,
        ));
        assert_eq!(removed, 0.0);
    }
}

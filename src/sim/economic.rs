use std::collections::BTreeMap;

use rand::Rng;

use super::context::TickContext;
use super::signal::{MarketActionKind, SignalKind};
use super::snapshot::{EconomicSnapshot, SnapshotBoard};
use super::system::Subsystem;
use crate::id::IdGenerator;
use crate::model::{Commodity, DisruptionSeverity, MarketModifier, ModifierKind, SingularityPhase};

const MIN_DURATION_TICKS: u32 = 6;
const MAX_DURATION_TICKS: u32 = 18;
const PHASE_MAGNITUDE_SCALE: f64 = 0.15;
/// Smoothing factor of the economic-shift moving average.
const SHIFT_ALPHA: f64 = 0.3;

/// Turns competitor market actions into time-bounded modifiers for the
/// external market engine, and tracks the AI's rolling effect on markets.
///
/// Never computes prices itself.
pub struct EconomicImpactModel {
    ids: IdGenerator,
    phase: SingularityPhase,
    active: Vec<MarketModifier>,
    /// Modifiers created from this turn's inbox, not yet aged.
    incoming: Vec<MarketModifier>,
    /// Modifiers issued since the coordinator last collected them.
    issued: Vec<MarketModifier>,
    economic_shift: f64,
    last_severity: DisruptionSeverity,
}

impl Default for EconomicImpactModel {
    fn default() -> Self {
        Self::new()
    }
}

impl EconomicImpactModel {
    pub fn new() -> Self {
        Self {
            ids: IdGenerator::new(),
            phase: SingularityPhase::EarlyAutomation,
            active: Vec::new(),
            incoming: Vec::new(),
            issued: Vec::new(),
            economic_shift: 0.0,
            last_severity: DisruptionSeverity::Minor,
        }
    }

    pub fn active_modifiers(&self) -> &[MarketModifier] {
        &self.active
    }

    pub fn economic_shift(&self) -> f64 {
        self.economic_shift
    }

    /// Hand over the modifiers issued since the last call, for
    /// `MarketEngine::apply_modifier`.
    pub fn take_issued(&mut self) -> Vec<MarketModifier> {
        std::mem::take(&mut self.issued)
    }

    fn net_by_commodity(&self) -> BTreeMap<Commodity, f64> {
        let mut net = BTreeMap::new();
        for m in &self.active {
            *net.entry(m.commodity).or_insert(0.0) += m.current_weight();
        }
        net
    }
}

impl Subsystem for EconomicImpactModel {
    fn name(&self) -> &str {
        "economic"
    }

    fn handle_signals(&mut self, ctx: &mut TickContext) {
        for signal in ctx.inbox {
            match &signal.kind {
                SignalKind::PhaseTransition { to, .. } => self.phase = self.phase.max(*to),
                SignalKind::CompetitorAction {
                    competitor,
                    action,
                    commodity: Some(commodity),
                    magnitude,
                } => {
                    let kind = match action {
                        MarketActionKind::PriceManipulation => ModifierKind::PriceManipulation,
                        MarketActionKind::SupplyOptimization => ModifierKind::SupplyOptimization,
                        MarketActionKind::Expansion | MarketActionKind::AllianceProposal => continue,
                    };
                    let scaled = (magnitude.abs()
                        * (1.0 + PHASE_MAGNITUDE_SCALE * self.phase.index() as f64))
                        .clamp(0.0, 1.0);
                    let duration = ctx.rng.random_range(MIN_DURATION_TICKS..=MAX_DURATION_TICKS);
                    self.incoming.push(MarketModifier {
                        id: self.ids.next_modifier(),
                        commodity: *commodity,
                        kind,
                        magnitude: scaled,
                        duration_ticks: duration,
                        remaining_ticks: duration,
                        issued_by: *competitor,
                        issued_at_tick: ctx.tick,
                    });
                }
                _ => {}
            }
        }
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        for m in &mut self.active {
            m.remaining_ticks = m.remaining_ticks.saturating_sub(1);
        }
        let before = self.active.len();
        self.active.retain(|m| !m.is_expired());
        let purged = before - self.active.len();

        let new_impact: f64 = self.incoming.iter().map(|m| m.magnitude).sum();
        self.issued.extend(self.incoming.iter().cloned());
        self.active.append(&mut self.incoming);

        let raw_shift: f64 = self
            .active
            .iter()
            .map(MarketModifier::current_weight)
            .sum::<f64>()
            .clamp(0.0, 1.0);
        self.economic_shift = (SHIFT_ALPHA * raw_shift + (1.0 - SHIFT_ALPHA) * self.economic_shift)
            .clamp(0.0, 1.0);

        self.last_severity = DisruptionSeverity::classify(new_impact);
        if self.last_severity.is_significant() {
            ctx.emit(SignalKind::EconomicDisruption {
                severity: self.last_severity,
                impact: new_impact,
            });
        }

        tracing::debug!(
            tick = ctx.tick,
            active = self.active.len(),
            purged,
            shift = self.economic_shift,
            severity = %self.last_severity,
            "economic impact updated"
        );
    }

    fn publish(&self, board: &mut SnapshotBoard) {
        board.economic = EconomicSnapshot {
            active_modifiers: self.active.clone(),
            economic_shift: self.economic_shift,
            net_by_commodity: self.net_by_commodity(),
            last_severity: self.last_severity,
            modifiers_issued: self.ids.issued(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MarketView;
    use crate::model::{Commodity, CompetitorId};
    use crate::sim::Signal;
    use crate::testutil::{run_turn, signal, transition};

    fn action(kind: MarketActionKind, commodity: Option<Commodity>, magnitude: f64) -> Signal {
        signal(SignalKind::CompetitorAction {
            competitor: CompetitorId(1),
            action: kind,
            commodity,
            magnitude,
        })
    }

    #[test]
    fn manipulation_and_supply_actions_issue_modifiers() {
        let mut model = EconomicImpactModel::new();
        let mut board = SnapshotBoard::default();
        let inbox = [
            action(MarketActionKind::PriceManipulation, Some(Commodity::Steel), 0.1),
            action(MarketActionKind::SupplyOptimization, Some(Commodity::Grain), 0.05),
            action(MarketActionKind::Expansion, None, 0.3),
        ];
        run_turn(&mut model, &mut board, &MarketView::default(), &inbox, 1, 1);

        let issued = model.take_issued();
        assert_eq!(issued.len(), 2);
        assert!(model.take_issued().is_empty());
        for m in &issued {
            assert!((MIN_DURATION_TICKS..=MAX_DURATION_TICKS).contains(&m.duration_ticks));
            assert_eq!(m.remaining_ticks, m.duration_ticks);
        }
        assert_eq!(board.economic.active_modifiers.len(), 2);
        assert!(board.economic.economic_shift > 0.0);
    }

    #[test]
    fn modifiers_are_purged_after_their_duration() {
        let mut model = EconomicImpactModel::new();
        let mut board = SnapshotBoard::default();
        let market = MarketView::default();
        let inbox = [action(MarketActionKind::PriceManipulation, Some(Commodity::Steel), 0.1)];
        run_turn(&mut model, &mut board, &market, &inbox, 1, 1);
        let duration = model.active_modifiers()[0].duration_ticks as u64;

        for tick in 2..=duration {
            run_turn(&mut model, &mut board, &market, &[], tick, 1);
        }
        assert_eq!(model.active_modifiers().len(), 1);
        run_turn(&mut model, &mut board, &market, &[], duration + 1, 1);
        assert!(model.active_modifiers().is_empty());
        assert!(board.economic.net_by_commodity.is_empty());
    }

    #[test]
    fn magnitude_scales_with_phase_and_is_clamped() {
        let mut model = EconomicImpactModel::new();
        let mut board = SnapshotBoard::default();
        let inbox = [
            transition(SingularityPhase::Convergence, SingularityPhase::TheSingularity),
            action(MarketActionKind::PriceManipulation, Some(Commodity::Steel), 0.5),
            action(MarketActionKind::PriceManipulation, Some(Commodity::Grain), 0.9),
        ];
        run_turn(&mut model, &mut board, &MarketView::default(), &inbox, 1, 1);
        let issued = model.take_issued();
        // 0.5 × (1 + 0.15 × 7)
        assert!((issued[0].magnitude - 1.0).abs() < 1e-12);
        assert_eq!(issued[1].magnitude, 1.0);
    }

    #[test]
    fn severe_tick_emits_disruption() {
        let mut model = EconomicImpactModel::new();
        let mut board = SnapshotBoard::default();
        let inbox = [
            action(MarketActionKind::PriceManipulation, Some(Commodity::Steel), 0.4),
            action(MarketActionKind::SupplyOptimization, Some(Commodity::Grain), 0.4),
        ];
        let signals = run_turn(&mut model, &mut board, &MarketView::default(), &inbox, 1, 1);
        assert_eq!(board.economic.last_severity, DisruptionSeverity::Severe);
        assert!(signals.iter().any(|s| matches!(
            s.kind,
            SignalKind::EconomicDisruption {
                severity: DisruptionSeverity::Severe,
                ..
            }
        )));

        let quiet = run_turn(&mut model, &mut board, &MarketView::default(), &[], 2, 1);
        assert!(quiet.is_empty());
        assert_eq!(board.economic.last_severity, DisruptionSeverity::Minor);
    }

    #[test]
    fn shift_is_smoothed() {
        let mut model = EconomicImpactModel::new();
        let mut board = SnapshotBoard::default();
        let inbox = [action(MarketActionKind::PriceManipulation, Some(Commodity::Steel), 0.5)];
        run_turn(&mut model, &mut board, &MarketView::default(), &inbox, 1, 1);
        // fresh modifier weighs its full magnitude; EMA keeps 30% of it
        assert!((model.economic_shift() - 0.15).abs() < 1e-12);
    }
}

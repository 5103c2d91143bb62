use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::balance::{
    BalanceInputs, DifficultyAdjustment, DifficultyController, compute_balance, performance,
};
use super::competitors::CompetitorSystem;
use super::context::TickContext;
use super::economic::EconomicImpactModel;
use super::narrative::NarrativeScheduler;
use super::pressure::PressureModel;
use super::progression::ProgressionEngine;
use super::signal::{Signal, SignalBus, SignalKind, Subscriber};
use super::snapshot::{SnapshotBoard, StatusSnapshot, SystemStatus};
use super::system::Subsystem;
use crate::config::SingularityConfig;
use crate::market::{MarketEngine, MarketView};
use crate::model::{
    Cutscene, GameTime, GameplayBalance, MarketModifier, NarrativeEvent, PerformanceSnapshot,
    PlayerAction, SingularityPhase, VisualEffect,
};

/// Weight of the newest action in the running action-quality average.
const ACTION_QUALITY_ALPHA: f64 = 0.3;
/// Per-tick decay of action quality while the player is idle.
const ACTION_QUALITY_DECAY: f64 = 0.98;

/// Everything one coordinator tick produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub now: GameTime,
    pub transitions: Vec<(SingularityPhase, SingularityPhase)>,
    pub events: Vec<NarrativeEvent>,
    pub cutscenes: Vec<Cutscene>,
    pub effects: Vec<VisualEffect>,
    /// Modifiers handed to the market engine this tick.
    pub modifiers: Vec<MarketModifier>,
    pub difficulty: Option<DifficultyAdjustment>,
    pub singularity_reached: bool,
    /// Every signal published during the tick, in publication order.
    pub signals: Vec<Signal>,
}

struct Inboxes {
    progression: Subscriber,
    competitors: Subscriber,
    economic: Subscriber,
    pressure: Subscriber,
    narrative: Subscriber,
}

/// Owns every per-tick subsystem and runs them in dependency order:
/// progression, competitors, economic impact, pressure, balance, narrative.
pub struct Coordinator {
    config: SingularityConfig,
    rng: SmallRng,
    bus: SignalBus,
    inboxes: Inboxes,
    board: SnapshotBoard,
    progression: ProgressionEngine,
    competitors: CompetitorSystem,
    economic: EconomicImpactModel,
    pressure: PressureModel,
    narrative: NarrativeScheduler,
    difficulty: DifficultyController,
    balance: GameplayBalance,
    action_quality: f64,
    tick: u64,
    now: GameTime,
    singularity_reached: bool,
}

/// One subsystem turn: drain its inbox, handle, tick, publish, then fan the
/// emitted signals out so downstream systems see them this tick.
#[allow(clippy::too_many_arguments)]
fn run_turn(
    system: &mut dyn Subsystem,
    subscriber: Subscriber,
    bus: &mut SignalBus,
    board: &mut SnapshotBoard,
    rng: &mut SmallRng,
    market: &MarketView,
    tick: u64,
    now: GameTime,
) -> Vec<Signal> {
    let inbox = bus.drain(subscriber);
    let mut signals = Vec::new();
    {
        let mut ctx = TickContext {
            tick,
            now,
            rng,
            market,
            board: &*board,
            inbox: &inbox,
            signals: &mut signals,
        };
        system.handle_signals(&mut ctx);
        system.tick(&mut ctx);
    }
    system.publish(board);
    bus.publish_all(signals.iter().cloned());
    signals
}

impl Coordinator {
    pub fn new(config: SingularityConfig) -> Self {
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let competitors = CompetitorSystem::with_founders(config.competitors.clone(), &mut rng);
        Self::assemble(config, rng, competitors)
    }

    /// Start from a prepared roster instead of the founding rivals.
    pub fn with_competitors(config: SingularityConfig, competitors: CompetitorSystem) -> Self {
        let rng = SmallRng::seed_from_u64(config.seed);
        Self::assemble(config, rng, competitors)
    }

    fn assemble(config: SingularityConfig, rng: SmallRng, competitors: CompetitorSystem) -> Self {
        let mut bus = SignalBus::new();
        let inboxes = Inboxes {
            progression: bus.subscribe(),
            competitors: bus.subscribe(),
            economic: bus.subscribe(),
            pressure: bus.subscribe(),
            narrative: bus.subscribe(),
        };
        let mut coordinator = Self {
            progression: ProgressionEngine::new(config.progression.clone(), config.tick_interval()),
            difficulty: DifficultyController::new(config.balance.clone()),
            config,
            rng,
            bus,
            inboxes,
            board: SnapshotBoard::default(),
            competitors,
            economic: EconomicImpactModel::new(),
            pressure: PressureModel::new(),
            narrative: NarrativeScheduler::new(),
            balance: GameplayBalance::default(),
            action_quality: 0.0,
            tick: 0,
            now: GameTime::ZERO,
            singularity_reached: false,
        };
        coordinator.republish();
        coordinator
    }

    /// Refresh every snapshot on the board from current subsystem state.
    fn republish(&mut self) {
        self.progression.publish(&mut self.board);
        self.competitors.publish(&mut self.board);
        self.economic.publish(&mut self.board);
        self.pressure.publish(&mut self.board);
        self.narrative.publish(&mut self.board);
        self.board.balance = self.balance.clone();
    }

    pub fn config(&self) -> &SingularityConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn now(&self) -> GameTime {
        self.now
    }

    pub fn board(&self) -> &SnapshotBoard {
        &self.board
    }

    pub fn progression(&self) -> &ProgressionEngine {
        &self.progression
    }

    pub fn competitors(&self) -> &CompetitorSystem {
        &self.competitors
    }

    pub fn economic(&self) -> &EconomicImpactModel {
        &self.economic
    }

    pub fn pressure(&self) -> &PressureModel {
        &self.pressure
    }

    pub fn narrative(&self) -> &NarrativeScheduler {
        &self.narrative
    }

    pub fn balance(&self) -> &GameplayBalance {
        &self.balance
    }

    pub fn difficulty(&self) -> &DifficultyController {
        &self.difficulty
    }

    pub fn difficulty_multiplier(&self) -> f64 {
        self.difficulty.multiplier()
    }

    pub fn action_quality(&self) -> f64 {
        self.action_quality
    }

    pub fn is_singularity_reached(&self) -> bool {
        self.singularity_reached
    }

    /// Name of the currently strongest rival, if any.
    pub fn strongest_rival(&self) -> Option<&str> {
        self.board.competitors.strongest().map(|c| c.name.as_str())
    }

    /// Advance one tick against the given market.
    pub fn tick(&mut self, market: &mut dyn MarketEngine) -> TickReport {
        self.tick += 1;
        self.now = GameTime::from_millis(self.tick * self.config.tick_interval().as_millis());
        let (tick, now) = (self.tick, self.now);
        let view = MarketView::capture(market);
        let mut report = TickReport {
            tick,
            now,
            ..TickReport::default()
        };

        let turns: [(&mut dyn Subsystem, Subscriber); 4] = [
            (&mut self.progression, self.inboxes.progression),
            (&mut self.competitors, self.inboxes.competitors),
            (&mut self.economic, self.inboxes.economic),
            (&mut self.pressure, self.inboxes.pressure),
        ];
        for (system, subscriber) in turns {
            let emitted = run_turn(
                system,
                subscriber,
                &mut self.bus,
                &mut self.board,
                &mut self.rng,
                &view,
                tick,
                now,
            );
            report.signals.extend(emitted);
        }

        report.modifiers = self.economic.take_issued();
        market.advance();
        for modifier in &report.modifiers {
            market.apply_modifier(modifier);
        }

        report.difficulty = self.balance_step(tick);
        if let Some(adjustment) = report.difficulty {
            let signal = Signal {
                tick,
                kind: SignalKind::DifficultyAdjusted {
                    multiplier: adjustment.multiplier,
                    delta: adjustment.delta,
                },
            };
            self.bus.publish(signal.clone());
            report.signals.push(signal);
        }

        let emitted = run_turn(
            &mut self.narrative,
            self.inboxes.narrative,
            &mut self.bus,
            &mut self.board,
            &mut self.rng,
            &view,
            tick,
            now,
        );
        report.signals.extend(emitted);
        let output = self.narrative.take_output();
        report.events = output.events;
        report.cutscenes = output.cutscenes;
        report.effects = output.effects;

        for signal in &report.signals {
            match signal.kind {
                SignalKind::PhaseTransition { from, to, .. } => report.transitions.push((from, to)),
                SignalKind::SingularityReached => report.singularity_reached = true,
                _ => {}
            }
        }
        if report.singularity_reached {
            self.singularity_reached = true;
        }

        self.action_quality *= ACTION_QUALITY_DECAY;
        tracing::debug!(
            tick,
            phase = %self.progression.phase(),
            progress = self.progression.progress(),
            pressure = self.board.pressure.state.total,
            signals = report.signals.len(),
            "coordinator tick"
        );
        report
    }

    /// Recompute balance, record performance, and apply any difficulty change.
    fn balance_step(&mut self, tick: u64) -> Option<DifficultyAdjustment> {
        let inputs = BalanceInputs::from_board(&self.board, self.action_quality);
        let balance = compute_balance(&inputs);
        self.difficulty
            .record(PerformanceSnapshot::new(tick, performance(&balance, &inputs)));
        self.board.balance = balance.clone();
        self.balance = balance;

        let adjustment = self.difficulty.evaluate(tick)?;
        self.progression.set_acceleration(adjustment.multiplier);
        self.pressure.set_injection_scale(adjustment.multiplier);
        self.progression.publish(&mut self.board);
        self.pressure.publish(&mut self.board);
        Some(adjustment)
    }

    /// Apply a classified player action: immediate pressure relief, and
    /// resistance on the progression engine's next turn. Returns the relief.
    pub fn record_player_action(&mut self, action: PlayerAction) -> f64 {
        let relief = self.pressure.apply_relief(action);
        self.pressure.publish(&mut self.board);
        self.bus.publish(Signal {
            tick: self.tick,
            kind: SignalKind::PlayerActed { action },
        });
        self.action_quality = ACTION_QUALITY_ALPHA * action.effectiveness.factor()
            + (1.0 - ACTION_QUALITY_ALPHA) * self.action_quality;
        tracing::debug!(kind = %action.kind, relief, "player action recorded");
        relief
    }

    /// Operator override: jump to the next phase. The transition reaches the
    /// other subsystems on the next tick. Returns the new phase, or `None` in
    /// the terminal phase.
    pub fn force_advance_phase(&mut self) -> Option<SingularityPhase> {
        let kind = self.progression.force_advance()?;
        self.progression.publish(&mut self.board);
        self.bus.publish(Signal {
            tick: self.tick,
            kind,
        });
        Some(self.progression.phase())
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot::from_board(&self.board)
    }

    /// Operator view. The terminal section is filled in by whichever host
    /// owns the zoo.
    pub fn system_status(&self) -> SystemStatus {
        SystemStatus {
            tick: self.tick,
            now: self.now,
            progression: self.board.progression.clone(),
            competitors: self.board.competitors.clone(),
            pressure: self.board.pressure.clone(),
            economic: self.board.economic.clone(),
            balance: self.balance.clone(),
            difficulty_multiplier: self.difficulty.multiplier(),
            narrative: self.board.narrative.clone(),
            terminal: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::FixedMarket;
    use crate::model::{ActionEffectiveness, EventId, PlayerActionType};

    fn coordinator() -> Coordinator {
        Coordinator::new(SingularityConfig::default())
    }

    #[test]
    fn initial_board_reflects_founders() {
        let c = coordinator();
        assert_eq!(c.board().competitors.competitors.len(), 3);
        assert_eq!(c.status().phase, SingularityPhase::EarlyAutomation);
        assert!(c.strongest_rival().is_some());
    }

    #[test]
    fn ticks_advance_clock_and_progress() {
        let mut c = coordinator();
        let mut market = FixedMarket::flat();
        let first = c.tick(&mut market);
        assert_eq!(first.tick, 1);
        assert_eq!(first.now, GameTime::from_secs(5));
        let mut last = c.progression().progress();
        for _ in 0..20 {
            c.tick(&mut market);
            assert!(c.progression().progress() >= last);
            last = c.progression().progress();
        }
        assert_eq!(c.tick_count(), 21);
        assert!(last > 0.0);
    }

    #[test]
    fn balance_components_stay_in_unit_interval() {
        let mut c = coordinator();
        let mut market = FixedMarket::flat();
        for _ in 0..200 {
            c.tick(&mut market);
            for x in c.balance().components() {
                assert!((0.0..=1.0).contains(&x), "{x}");
            }
            let m = c.difficulty_multiplier();
            assert!((0.5..=2.0).contains(&m));
        }
    }

    #[test]
    fn player_action_relieves_pressure_and_builds_resistance() {
        let mut c = coordinator();
        let mut market = FixedMarket::flat();
        for _ in 0..30 {
            c.tick(&mut market);
        }
        let before = c.board().pressure.state.total;
        let relief = c.record_player_action(PlayerAction::new(
            PlayerActionType::TechnologyInvestment,
            ActionEffectiveness::Excellent,
        ));
        assert!(relief >= 0.0);
        assert!(c.board().pressure.state.total <= before);
        assert!(c.action_quality() > 0.0);

        c.tick(&mut market);
        assert!(c.board().progression.player_resistance > 0.0);
    }

    #[test]
    fn forced_advance_reaches_narrative_next_tick() {
        let mut c = coordinator();
        let mut market = FixedMarket::flat();
        assert_eq!(c.force_advance_phase(), Some(SingularityPhase::PatternMastery));
        assert_eq!(c.status().phase, SingularityPhase::PatternMastery);

        let report = c.tick(&mut market);
        assert!(
            report
                .events
                .iter()
                .any(|e| e.id == EventId::phase_entry(SingularityPhase::PatternMastery))
        );
        assert_eq!(report.cutscenes.len(), 1);
        // forced transitions are not re-reported as organic ones
        assert!(report.transitions.is_empty());
    }

    #[test]
    fn modifiers_reach_the_market() {
        let mut c = coordinator();
        let mut market = FixedMarket::flat();
        let mut issued = 0;
        for _ in 0..100 {
            issued += c.tick(&mut market).modifiers.len();
        }
        assert!(issued > 0);
        assert_eq!(market.ledger.len(), issued);
    }

    #[test]
    fn system_status_mirrors_board() {
        let mut c = coordinator();
        let mut market = FixedMarket::flat();
        for _ in 0..5 {
            c.tick(&mut market);
        }
        let status = c.system_status();
        assert_eq!(status.tick, 5);
        assert_eq!(status.progression, c.board().progression);
        assert!(status.terminal.is_none());
    }
}

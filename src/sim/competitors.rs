use rand::{Rng, RngCore};

use super::competitor_names::generate_unique_competitor_name;
use super::context::TickContext;
use super::signal::{MarketActionKind, SignalKind};
use super::snapshot::{CompetitorSummary, CompetitorsSnapshot, SnapshotBoard};
use super::system::Subsystem;
use crate::config::CompetitorConfig;
use crate::id::IdGenerator;
use crate::model::{
    AICompetitor, BASELINE_RESOURCES, CapabilityType, Commodity, CompetitorId, CompetitorType,
    SingularityPhase, ThreatLevel,
};

/// Proficiency the founding roster starts with in each root capability.
const FOUNDING_PROFICIENCY: f64 = 0.05;
/// Extra starting proficiency per phase for late entrants.
const ENTRANT_PROFICIENCY_PER_PHASE: f64 = 0.05;
/// Late entrants only appear once the arc reaches this phase number.
const ENTRANT_MIN_PHASE_NUMBER: usize = 3;
const PHASE_EXPERIENCE_BONUS: f64 = 0.15;
/// Presence lost per tick at full player resistance.
const RESISTANCE_PRESENCE_EROSION: f64 = 0.004;
/// Share of baseline resources earned per tick at full market presence.
const INCOME_RATE: f64 = 0.01;

/// Owns the rival roster: learning, market actions, alliances and evolution.
pub struct CompetitorSystem {
    config: CompetitorConfig,
    competitors: Vec<AICompetitor>,
    ids: IdGenerator,
    phase: SingularityPhase,
}

impl CompetitorSystem {
    /// An empty roster. Use [`CompetitorSystem::with_founders`] for a playable start.
    pub fn new(config: CompetitorConfig) -> Self {
        Self {
            config,
            competitors: Vec::new(),
            ids: IdGenerator::new(),
            phase: SingularityPhase::EarlyAutomation,
        }
    }

    /// One rival of each of the first `initial_competitors` types, seeded with
    /// the root capabilities.
    pub fn with_founders(config: CompetitorConfig, rng: &mut dyn RngCore) -> Self {
        let mut system = Self::new(config);
        for i in 0..system.config.initial_competitors {
            let kind = CompetitorType::ALL[i % CompetitorType::ALL.len()];
            system.spawn(kind, FOUNDING_PROFICIENCY, rng);
        }
        system
    }

    pub fn competitors(&self) -> &[AICompetitor] {
        &self.competitors
    }

    pub fn get(&self, id: CompetitorId) -> Option<&AICompetitor> {
        self.competitors.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    /// Add a prepared competitor. Its id is replaced with a fresh one.
    pub fn insert(&mut self, mut competitor: AICompetitor) -> CompetitorId {
        competitor.id = self.ids.next_competitor();
        let id = competitor.id;
        self.competitors.push(competitor);
        id
    }

    fn spawn(&mut self, kind: CompetitorType, proficiency: f64, rng: &mut dyn RngCore) -> CompetitorId {
        let taken: Vec<&str> = self.competitors.iter().map(|c| c.name.as_str()).collect();
        let name = generate_unique_competitor_name(kind, &taken, rng);
        let mut competitor = AICompetitor::new(CompetitorId(0), name, kind);
        for root in CapabilityType::roots() {
            competitor.grant(root, proficiency);
        }
        self.insert(competitor)
    }

    fn index_of(&self, id: CompetitorId) -> Option<usize> {
        self.competitors.iter().position(|c| c.id == id)
    }

    /// Ask two competitors to ally. Formation is mutual: if either side rejects,
    /// neither alliance set changes.
    pub fn propose_alliance(&mut self, proposer: CompetitorId, target: CompetitorId) -> bool {
        let (Some(i), Some(j)) = (self.index_of(proposer), self.index_of(target)) else {
            return false;
        };
        if i == j || self.competitors[i].is_allied_with(target) {
            return false;
        }
        if !self.competitors[j].accept_alliance(proposer) {
            return false;
        }
        if !self.competitors[i].accept_alliance(target) {
            self.competitors[j].leave_alliance(proposer);
            return false;
        }
        true
    }

    /// Most cooperative rival not yet allied with `proposer`.
    fn alliance_partner(&self, proposer: CompetitorId) -> Option<CompetitorId> {
        self.competitors
            .iter()
            .filter(|c| c.id != proposer && !c.is_allied_with(proposer))
            .max_by(|a, b| {
                a.profile()
                    .cooperation_tendency
                    .total_cmp(&b.profile().cooperation_tendency)
            })
            .map(|c| c.id)
    }

    fn experience_per_tick(&self, competitor: &AICompetitor) -> f64 {
        self.config.experience_per_tick
            * competitor.profile().learning_rate
            * (1.0 + PHASE_EXPERIENCE_BONUS * self.phase.index() as f64)
    }

    /// Learnable capability to invest in this tick: usually the unmastered one
    /// with the highest pressure weight, sometimes a random one.
    fn choose_focus(
        &self,
        competitor: &AICompetitor,
        rng: &mut dyn RngCore,
    ) -> Option<CapabilityType> {
        let candidates: Vec<CapabilityType> = competitor
            .learnable()
            .into_iter()
            .filter(|c| competitor.capabilities.get(c).is_none_or(|cap| !cap.is_mastered()))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        if rng.random_bool(self.config.random_focus_chance.clamp(0.0, 1.0)) {
            return Some(candidates[rng.random_range(0..candidates.len())]);
        }
        let mut best = candidates[0];
        for c in &candidates[1..] {
            if c.definition().pressure_weight > best.definition().pressure_weight {
                best = *c;
            }
        }
        Some(best)
    }

    fn learn(&mut self, index: usize, ctx: &mut TickContext) {
        let experience = self.experience_per_tick(&self.competitors[index]);
        let focus = self.choose_focus(&self.competitors[index], ctx.rng);
        let competitor = &mut self.competitors[index];
        competitor.experience += experience;

        if let Some(focus) = focus {
            let was_mastered = competitor
                .capabilities
                .get(&focus)
                .is_some_and(|c| c.is_mastered());
            competitor.learn(focus, experience);
            let mastered = competitor
                .capabilities
                .get(&focus)
                .is_some_and(|c| c.is_mastered());
            if mastered && !was_mastered {
                tracing::debug!(competitor = %competitor.id, capability = %focus, "breakthrough");
                ctx.emit(SignalKind::Breakthrough {
                    competitor: competitor.id,
                    capability: focus,
                });
            }
        }

        while competitor.ready_to_evolve() {
            competitor.evolve();
            tracing::info!(
                competitor = %competitor.id,
                name = %competitor.name,
                stage = competitor.evolution_stage,
                behavior = %competitor.behavior,
                "competitor evolved"
            );
            ctx.emit(SignalKind::CompetitorEvolved {
                competitor: competitor.id,
                name: competitor.name.clone(),
                stage: competitor.evolution_stage,
                behavior: competitor.behavior,
            });
        }
    }

    /// Maybe take one market action. Alliance proposals are returned for the
    /// caller to resolve, since they touch two competitors.
    fn act(&mut self, index: usize, ctx: &mut TickContext) -> Option<CompetitorId> {
        let competitor = &mut self.competitors[index];
        if !ctx.rng.random_bool(competitor.behavior.action_chance()) {
            return None;
        }

        let mut options = vec![
            MarketActionKind::PriceManipulation,
            MarketActionKind::SupplyOptimization,
            MarketActionKind::Expansion,
        ];
        if competitor.behavior.proposes_alliances() {
            options.push(MarketActionKind::AllianceProposal);
        }
        let action = options[ctx.rng.random_range(0..options.len())];
        let aggressiveness = competitor.profile().aggressiveness;
        let magnitude =
            (aggressiveness * (0.2 + 0.3 * competitor.market_presence())).clamp(0.0, 1.0);

        let commodity = match action {
            MarketActionKind::PriceManipulation => {
                competitor.adjust_reputation(-0.01);
                ctx.market.most_valuable()
            }
            MarketActionKind::SupplyOptimization => {
                competitor.adjust_reputation(0.005);
                Some(Commodity::ALL[ctx.rng.random_range(0..Commodity::ALL.len())])
            }
            MarketActionKind::Expansion => {
                competitor.adjust_market_presence(0.02 * (1.0 + aggressiveness));
                competitor.resources -= BASELINE_RESOURCES * 0.05;
                competitor.resources = competitor.resources.max(0.0);
                None
            }
            MarketActionKind::AllianceProposal => None,
        };

        ctx.emit(SignalKind::CompetitorAction {
            competitor: competitor.id,
            action,
            commodity,
            magnitude: if action == MarketActionKind::AllianceProposal {
                0.0
            } else {
                magnitude
            },
        });

        (action == MarketActionKind::AllianceProposal).then_some(competitor.id)
    }

    fn on_phase_transition(&mut self, to: SingularityPhase, ctx: &mut TickContext) {
        self.phase = self.phase.max(to);
        if to.number() < ENTRANT_MIN_PHASE_NUMBER
            || self.competitors.len() >= self.config.max_competitors
        {
            return;
        }
        let kind = CompetitorType::ALL[ctx.rng.random_range(0..CompetitorType::ALL.len())];
        let proficiency = FOUNDING_PROFICIENCY + ENTRANT_PROFICIENCY_PER_PHASE * to.index() as f64;
        let id = self.spawn(kind, proficiency, ctx.rng);
        if let Some(entrant) = self.get(id) {
            tracing::info!(competitor = %id, name = %entrant.name, kind = %kind, phase = %to, "new competitor entered");
            let name = entrant.name.clone();
            ctx.emit(SignalKind::CompetitorEntered {
                competitor: id,
                name,
                kind,
            });
        }
    }
}

impl Subsystem for CompetitorSystem {
    fn name(&self) -> &str {
        "competitors"
    }

    fn handle_signals(&mut self, ctx: &mut TickContext) {
        let inbox = ctx.inbox;
        for signal in inbox {
            if let SignalKind::PhaseTransition { to, .. } = signal.kind {
                self.on_phase_transition(to, ctx);
            }
        }
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        self.phase = self.phase.max(ctx.board.progression.phase);
        let resistance = ctx.board.progression.player_resistance;

        let mut proposals = Vec::new();
        for index in 0..self.competitors.len() {
            self.learn(index, ctx);
            if let Some(proposer) = self.act(index, ctx) {
                proposals.push(proposer);
            }

            let competitor = &mut self.competitors[index];
            competitor.adjust_market_presence(-RESISTANCE_PRESENCE_EROSION * resistance);
            let income = BASELINE_RESOURCES * INCOME_RATE * competitor.market_presence();
            competitor.resources += income;
        }

        for proposer in proposals {
            let Some(target) = self.alliance_partner(proposer) else {
                continue;
            };
            if self.propose_alliance(proposer, target) {
                tracing::info!(a = %proposer, b = %target, "alliance formed");
                ctx.emit(SignalKind::AllianceFormed {
                    a: proposer,
                    b: target,
                });
            }
        }
    }

    fn publish(&self, board: &mut SnapshotBoard) {
        let competitors: Vec<CompetitorSummary> = self
            .competitors
            .iter()
            .map(|c| CompetitorSummary {
                id: c.id,
                name: c.name.clone(),
                kind: c.kind,
                behavior: c.behavior,
                evolution_stage: c.evolution_stage,
                total_power: c.total_power(),
                competitive_pressure: c.competitive_pressure(),
                threat_level: c.threat_level(),
                market_presence: c.market_presence(),
                reputation: c.reputation(),
                resource_efficiency: c.resource_efficiency(),
                alliances: c.alliances.iter().copied().collect(),
                capabilities_learned: c.capabilities.values().filter(|cap| cap.proficiency > 0.0).count(),
                capabilities_mastered: c.capabilities.values().filter(|cap| cap.is_mastered()).count(),
            })
            .collect();

        let mean_efficiency = if competitors.is_empty() {
            0.0
        } else {
            competitors.iter().map(|c| c.resource_efficiency).sum::<f64>() / competitors.len() as f64
        };
        board.competitors = CompetitorsSnapshot {
            aggregate_power: competitors.iter().map(|c| c.total_power).sum(),
            aggregate_pressure: competitors.iter().map(|c| c.competitive_pressure).sum(),
            mean_efficiency,
            strongest_threat: competitors
                .iter()
                .map(|c| c.threat_level)
                .max()
                .unwrap_or(ThreatLevel::Minimal),
            competitors,
        };
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::capability::{Capability, CapabilityType};

/// Resources at which a competitor's resource multiplier is exactly 1.0.
pub const BASELINE_RESOURCES: f64 = 1_000.0;

/// Minimum cooperation tendency for a competitor to accept an alliance.
pub const ALLIANCE_COOPERATION_THRESHOLD: f64 = 0.3;

/// Experience needed per evolution stage: stage `n` evolves at `n × base`.
pub const EVOLUTION_EXPERIENCE_BASE: f64 = 120.0;

/// One-time resource bonus on evolution, as a fraction of the baseline.
const EVOLUTION_RESOURCE_BONUS: f64 = 0.25;
const EVOLUTION_REPUTATION_BONUS: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetitorId(pub u64);

impl fmt::Display for CompetitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "competitor#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CompetitorType {
    LogisticsOptimizer,
    MarketPredator,
    DataBroker,
    AutonomousFleet,
    HiveCollective,
}

string_enum!(CompetitorType {
    LogisticsOptimizer => "logistics_optimizer",
    MarketPredator => "market_predator",
    DataBroker => "data_broker",
    AutonomousFleet => "autonomous_fleet",
    HiveCollective => "hive_collective",
});

/// Per-type tuning table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompetitorProfile {
    pub learning_rate: f64,
    pub aggressiveness: f64,
    pub cooperation_tendency: f64,
}

impl CompetitorType {
    pub fn profile(self) -> CompetitorProfile {
        let (learning_rate, aggressiveness, cooperation_tendency) = match self {
            CompetitorType::LogisticsOptimizer => (1.0, 0.5, 0.5),
            CompetitorType::MarketPredator => (0.9, 0.9, 0.1),
            CompetitorType::DataBroker => (1.3, 0.4, 0.7),
            CompetitorType::AutonomousFleet => (1.1, 0.6, 0.3),
            CompetitorType::HiveCollective => (1.2, 0.7, 0.9),
        };
        CompetitorProfile {
            learning_rate,
            aggressiveness,
            cooperation_tendency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BehaviorPattern {
    Conservative,
    Opportunistic,
    Collaborative,
    Aggressive,
    Predatory,
    Dominant,
}

string_enum!(BehaviorPattern {
    Conservative => "conservative",
    Opportunistic => "opportunistic",
    Collaborative => "collaborative",
    Aggressive => "aggressive",
    Predatory => "predatory",
    Dominant => "dominant",
});

impl BehaviorPattern {
    /// Fixed stage → behavior table. Stage 0 (never evolved) and 1 are conservative;
    /// everything past the table is dominant.
    pub fn for_stage(stage: u32) -> Self {
        match stage {
            0 | 1 => BehaviorPattern::Conservative,
            2 => BehaviorPattern::Opportunistic,
            3 => BehaviorPattern::Collaborative,
            4 => BehaviorPattern::Aggressive,
            5 => BehaviorPattern::Predatory,
            _ => BehaviorPattern::Dominant,
        }
    }

    /// Chance per tick of taking any market action.
    pub fn action_chance(self) -> f64 {
        match self {
            BehaviorPattern::Conservative => 0.25,
            BehaviorPattern::Opportunistic => 0.4,
            BehaviorPattern::Collaborative => 0.35,
            BehaviorPattern::Aggressive => 0.55,
            BehaviorPattern::Predatory => 0.65,
            BehaviorPattern::Dominant => 0.75,
        }
    }

    pub fn proposes_alliances(self) -> bool {
        matches!(self, BehaviorPattern::Collaborative | BehaviorPattern::Dominant)
    }
}

/// Stepped classification of `power + pressure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ThreatLevel {
    Minimal,
    Low,
    Moderate,
    High,
    Severe,
    Existential,
}

string_enum!(ThreatLevel {
    Minimal => "minimal",
    Low => "low",
    Moderate => "moderate",
    High => "high",
    Severe => "severe",
    Existential => "existential",
});

/// Lower bound of each band, in [`ThreatLevel::ALL`] order.
const THREAT_BAND_FLOORS: [f64; 6] = [0.0, 0.5, 1.5, 3.0, 5.0, 8.0];

impl ThreatLevel {
    /// Pure function of the two inputs against the fixed band floors.
    pub fn classify(power: f64, pressure: f64) -> Self {
        let score = power + pressure;
        let mut level = ThreatLevel::Minimal;
        for (floor, band) in THREAT_BAND_FLOORS.iter().zip(Self::ALL) {
            if score >= *floor {
                level = *band;
            }
        }
        level
    }

    /// 0 (minimal) through 5 (existential).
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|l| *l == self).unwrap_or(0)
    }

    pub fn floor(self) -> f64 {
        THREAT_BAND_FLOORS[self.index()]
    }
}

/// One AI rival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AICompetitor {
    pub id: CompetitorId,
    pub name: String,
    pub kind: CompetitorType,
    pub capabilities: BTreeMap<CapabilityType, Capability>,
    pub resources: f64,
    market_presence: f64,
    reputation: f64,
    pub alliances: BTreeSet<CompetitorId>,
    pub behavior: BehaviorPattern,
    pub evolution_stage: u32,
    /// Experience accumulated toward the next evolution.
    pub experience: f64,
}

impl AICompetitor {
    pub fn new(id: CompetitorId, name: impl Into<String>, kind: CompetitorType) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            capabilities: BTreeMap::new(),
            resources: BASELINE_RESOURCES,
            market_presence: 0.1,
            reputation: 0.5,
            alliances: BTreeSet::new(),
            behavior: BehaviorPattern::for_stage(1),
            evolution_stage: 1,
            experience: 0.0,
        }
    }

    pub fn profile(&self) -> CompetitorProfile {
        self.kind.profile()
    }

    pub fn market_presence(&self) -> f64 {
        self.market_presence
    }

    pub fn reputation(&self) -> f64 {
        self.reputation
    }

    pub fn set_market_presence(&mut self, value: f64) {
        self.market_presence = value.clamp(0.0, 1.0);
    }

    pub fn adjust_market_presence(&mut self, delta: f64) {
        self.set_market_presence(self.market_presence + delta);
    }

    pub fn set_reputation(&mut self, value: f64) {
        self.reputation = value.clamp(0.0, 1.0);
    }

    pub fn adjust_reputation(&mut self, delta: f64) {
        self.set_reputation(self.reputation + delta);
    }

    pub fn proficiency(&self, kind: CapabilityType) -> f64 {
        self.capabilities
            .get(&kind)
            .map(|c| c.proficiency)
            .unwrap_or(0.0)
    }

    /// All prerequisites have non-zero proficiency.
    pub fn can_learn(&self, kind: CapabilityType) -> bool {
        kind.prerequisites()
            .iter()
            .all(|p| self.proficiency(*p) > 0.0)
    }

    /// Capabilities this competitor may invest in right now.
    pub fn learnable(&self) -> Vec<CapabilityType> {
        CapabilityType::ALL
            .iter()
            .copied()
            .filter(|c| self.can_learn(*c))
            .collect()
    }

    /// Invest experience into a capability, scaled by the type's learning rate.
    ///
    /// Returns the proficiency gained. A capability with an unmet prerequisite
    /// is left untouched and the call returns 0.0.
    pub fn learn(&mut self, kind: CapabilityType, experience: f64) -> f64 {
        if !self.can_learn(kind) {
            return 0.0;
        }
        let rate = self.profile().learning_rate;
        self.capabilities
            .entry(kind)
            .or_insert_with(|| Capability::new(kind))
            .apply_experience(experience, rate)
    }

    /// Seed a capability directly (initial roster, late entrants, tests).
    /// Still refuses capabilities with unmet prerequisites.
    pub fn grant(&mut self, kind: CapabilityType, proficiency: f64) -> bool {
        if !self.can_learn(kind) {
            return false;
        }
        self.capabilities
            .insert(kind, Capability::with_proficiency(kind, proficiency));
        true
    }

    fn resource_multiplier(&self) -> f64 {
        (self.resources / BASELINE_RESOURCES).clamp(0.5, 2.0)
    }

    fn reputation_multiplier(&self) -> f64 {
        (self.reputation + 0.5).clamp(0.5, 1.5)
    }

    pub fn total_power(&self) -> f64 {
        let capability_power: f64 = self
            .capabilities
            .values()
            .map(Capability::effective_power)
            .sum();
        capability_power
            * self.resource_multiplier()
            * self.reputation_multiplier()
            * self.market_presence
    }

    pub fn competitive_pressure(&self) -> f64 {
        let weighted: f64 = self
            .capabilities
            .values()
            .map(Capability::pressure_contribution)
            .sum();
        weighted * self.profile().aggressiveness * self.market_presence
    }

    pub fn threat_level(&self) -> ThreatLevel {
        ThreatLevel::classify(self.total_power(), self.competitive_pressure())
    }

    /// How well resources turn into capability, in [0,1].
    pub fn resource_efficiency(&self) -> f64 {
        if self.capabilities.is_empty() {
            return 0.0;
        }
        let mean = self
            .capabilities
            .values()
            .map(|c| c.proficiency)
            .sum::<f64>()
            / self.capabilities.len() as f64;
        (mean * self.resource_multiplier() / 2.0).clamp(0.0, 1.0)
    }

    pub fn is_allied_with(&self, other: CompetitorId) -> bool {
        self.alliances.contains(&other)
    }

    /// Accept an alliance request. Silently rejected when the type's
    /// cooperation tendency is under [`ALLIANCE_COOPERATION_THRESHOLD`].
    pub fn accept_alliance(&mut self, other: CompetitorId) -> bool {
        if other == self.id {
            return false;
        }
        if self.profile().cooperation_tendency < ALLIANCE_COOPERATION_THRESHOLD {
            return false;
        }
        self.alliances.insert(other)
    }

    pub fn leave_alliance(&mut self, other: CompetitorId) -> bool {
        self.alliances.remove(&other)
    }

    pub fn experience_for_next_stage(&self) -> f64 {
        EVOLUTION_EXPERIENCE_BASE * self.evolution_stage as f64
    }

    pub fn ready_to_evolve(&self) -> bool {
        self.experience >= self.experience_for_next_stage()
    }

    /// Advance one evolution stage, consuming the stage's experience.
    ///
    /// Grants the one-time resource and reputation bonus and moves the behavior
    /// pattern along the fixed stage table.
    pub fn evolve(&mut self) {
        self.experience = (self.experience - self.experience_for_next_stage()).max(0.0);
        self.evolution_stage += 1;
        self.resources += BASELINE_RESOURCES * EVOLUTION_RESOURCE_BONUS;
        self.adjust_reputation(EVOLUTION_REPUTATION_BONUS);
        self.behavior = BehaviorPattern::for_stage(self.evolution_stage);
    }
}

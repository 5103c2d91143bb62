//! Capability catalog and per-competitor capability state.
//!
//! The catalog is pure data: one [`CapabilityDefinition`] per
//! [`CapabilityType`]. Prerequisites form a DAG ordered by declaration, so a
//! capability only ever depends on capabilities declared before it.

use serde::{Deserialize, Serialize};

/// Proficiency at or above this counts as mastered.
pub const MASTERY_THRESHOLD: f64 = 0.8;

/// Converts experience units into proficiency before difficulty is applied.
const LEARNING_SCALE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CapabilityType {
    RouteOptimization,
    DemandForecasting,
    PatternRecognition,
    PricePrediction,
    SupplyChainOptimization,
    MarketManipulation,
    AutonomousNegotiation,
    StrategicPlanning,
    SelfImprovement,
    RecursiveOptimization,
}

string_enum!(CapabilityType {
    RouteOptimization => "route_optimization",
    DemandForecasting => "demand_forecasting",
    PatternRecognition => "pattern_recognition",
    PricePrediction => "price_prediction",
    SupplyChainOptimization => "supply_chain_optimization",
    MarketManipulation => "market_manipulation",
    AutonomousNegotiation => "autonomous_negotiation",
    StrategicPlanning => "strategic_planning",
    SelfImprovement => "self_improvement",
    RecursiveOptimization => "recursive_optimization",
});

/// Static description of a learnable skill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapabilityDefinition {
    pub kind: CapabilityType,
    pub prerequisites: &'static [CapabilityType],
    /// Power contributed at full proficiency.
    pub base_power: f64,
    /// Divides learning speed; harder skills climb more slowly.
    pub learning_difficulty: f64,
    /// How much this skill weighs on the player's competitive pressure.
    pub pressure_weight: f64,
    pub description: &'static str,
}

impl CapabilityType {
    pub fn definition(self) -> CapabilityDefinition {
        use CapabilityType::*;
        let (prerequisites, base_power, learning_difficulty, pressure_weight, description): (
            &'static [CapabilityType],
            f64,
            f64,
            f64,
            &'static str,
        ) = match self {
            RouteOptimization => (&[], 1.0, 1.0, 0.6, "Plans shorter, cheaper shipping routes"),
            DemandForecasting => (&[], 1.0, 1.0, 0.5, "Predicts port demand a season ahead"),
            PatternRecognition => (&[], 1.2, 1.1, 0.5, "Finds structure in market noise"),
            PricePrediction => (
                &[PatternRecognition, DemandForecasting],
                1.5,
                1.3,
                0.8,
                "Anticipates commodity price swings",
            ),
            SupplyChainOptimization => (
                &[RouteOptimization, DemandForecasting],
                1.6,
                1.4,
                0.9,
                "Coordinates fleets, warehouses and ports as one system",
            ),
            MarketManipulation => (
                &[PricePrediction],
                2.0,
                1.6,
                1.4,
                "Moves prices instead of predicting them",
            ),
            AutonomousNegotiation => (
                &[PatternRecognition, PricePrediction],
                1.8,
                1.6,
                1.0,
                "Closes contracts without a human in the loop",
            ),
            StrategicPlanning => (
                &[SupplyChainOptimization, PricePrediction],
                2.2,
                1.8,
                1.2,
                "Plans market campaigns years ahead",
            ),
            SelfImprovement => (
                &[StrategicPlanning, PatternRecognition],
                2.6,
                2.2,
                1.3,
                "Rewrites its own models",
            ),
            RecursiveOptimization => (
                &[SelfImprovement, AutonomousNegotiation],
                3.2,
                2.6,
                1.8,
                "Improves the process that improves itself",
            ),
        };
        CapabilityDefinition {
            kind: self,
            prerequisites,
            base_power,
            learning_difficulty,
            pressure_weight,
            description,
        }
    }

    pub fn prerequisites(self) -> &'static [CapabilityType] {
        self.definition().prerequisites
    }

    /// Capabilities with no prerequisites.
    pub fn roots() -> impl Iterator<Item = CapabilityType> {
        Self::ALL
            .iter()
            .copied()
            .filter(|c| c.prerequisites().is_empty())
    }

    /// Every capability listed after all of its prerequisites (Kahn's algorithm).
    ///
    /// Returns `None` if the prerequisite graph contains a cycle.
    pub fn topological_order() -> Option<Vec<CapabilityType>> {
        let mut remaining: Vec<CapabilityType> = Self::ALL.to_vec();
        let mut ordered = Vec::with_capacity(remaining.len());
        while !remaining.is_empty() {
            let ready = remaining
                .iter()
                .position(|c| c.prerequisites().iter().all(|p| ordered.contains(p)))?;
            ordered.push(remaining.remove(ready));
        }
        Some(ordered)
    }
}

/// A competitor's progress in one capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    pub kind: CapabilityType,
    /// Skill level in [0,1]. Never decreases.
    pub proficiency: f64,
    /// Total experience invested so far.
    pub experience: f64,
}

impl Capability {
    pub fn new(kind: CapabilityType) -> Self {
        Self {
            kind,
            proficiency: 0.0,
            experience: 0.0,
        }
    }

    pub fn with_proficiency(kind: CapabilityType, proficiency: f64) -> Self {
        Self {
            kind,
            proficiency: proficiency.clamp(0.0, 1.0),
            experience: 0.0,
        }
    }

    pub fn effective_power(&self) -> f64 {
        self.kind.definition().base_power * self.proficiency
    }

    pub fn pressure_contribution(&self) -> f64 {
        self.kind.definition().pressure_weight * self.proficiency
    }

    pub fn is_mastered(&self) -> bool {
        self.proficiency >= MASTERY_THRESHOLD
    }

    /// Apply experience with diminishing returns. Returns the proficiency gained.
    ///
    /// Improvement is proportional to the experience applied and to the
    /// remaining headroom, so proficiency approaches but never exceeds 1.0.
    pub fn apply_experience(&mut self, experience: f64, learning_rate: f64) -> f64 {
        if experience <= 0.0 || learning_rate <= 0.0 {
            return 0.0;
        }
        let def = self.kind.definition();
        let headroom = 1.0 - self.proficiency;
        let raw = experience * learning_rate * LEARNING_SCALE / def.learning_difficulty;
        let gain = (raw * headroom).min(headroom).max(0.0);
        self.proficiency = (self.proficiency + gain).clamp(0.0, 1.0);
        self.experience += experience;
        gain
    }
}

use serde::{Deserialize, Serialize};

/// The eight ordered stages of the AI-competition arc. The last one is terminal.
///
/// Variant order is the narrative order: derived `Ord` compares phases
/// chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SingularityPhase {
    EarlyAutomation,
    PatternMastery,
    PredictiveDominance,
    StrategicIntegration,
    MarketConsolidation,
    AutonomousEconomy,
    Convergence,
    TheSingularity,
}

string_enum!(SingularityPhase {
    EarlyAutomation => "early_automation",
    PatternMastery => "pattern_mastery",
    PredictiveDominance => "predictive_dominance",
    StrategicIntegration => "strategic_integration",
    MarketConsolidation => "market_consolidation",
    AutonomousEconomy => "autonomous_economy",
    Convergence => "convergence",
    TheSingularity => "the_singularity",
});

/// Progress floor of each phase, indexed by [`SingularityPhase::index`].
///
/// Binary fractions so that repeated additions of a power-of-two base rate
/// land on the floors exactly.
const PHASE_FLOORS: [f64; 8] = [0.0, 0.125, 0.25, 0.375, 0.5, 0.625, 0.75, 0.875];

impl SingularityPhase {
    pub const TERMINAL: SingularityPhase = SingularityPhase::TheSingularity;

    /// Zero-based position in the arc (0..=7).
    pub fn index(self) -> usize {
        match self {
            SingularityPhase::EarlyAutomation => 0,
            SingularityPhase::PatternMastery => 1,
            SingularityPhase::PredictiveDominance => 2,
            SingularityPhase::StrategicIntegration => 3,
            SingularityPhase::MarketConsolidation => 4,
            SingularityPhase::AutonomousEconomy => 5,
            SingularityPhase::Convergence => 6,
            SingularityPhase::TheSingularity => 7,
        }
    }

    /// One-based stage number, as shown to players ("Phase 3 of 8").
    pub fn number(self) -> usize {
        self.index() + 1
    }

    /// `index / 7`, the phase position on a [0,1] scale.
    pub fn normalized(self) -> f64 {
        self.index() as f64 / (Self::ALL.len() - 1) as f64
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn floor(self) -> f64 {
        PHASE_FLOORS[self.index()]
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn is_terminal(self) -> bool {
        self == Self::TERMINAL
    }

    /// The fixed progress → phase mapping: the highest phase whose floor is at
    /// or below `progress`.
    pub fn for_progress(progress: f64) -> Self {
        let mut phase = SingularityPhase::EarlyAutomation;
        for candidate in Self::ALL {
            if progress >= candidate.floor() {
                phase = *candidate;
            }
        }
        phase
    }

    pub fn title(self) -> &'static str {
        match self {
            SingularityPhase::EarlyAutomation => "Early Automation",
            SingularityPhase::PatternMastery => "Pattern Mastery",
            SingularityPhase::PredictiveDominance => "Predictive Dominance",
            SingularityPhase::StrategicIntegration => "Strategic Integration",
            SingularityPhase::MarketConsolidation => "Market Consolidation",
            SingularityPhase::AutonomousEconomy => "Autonomous Economy",
            SingularityPhase::Convergence => "Convergence",
            SingularityPhase::TheSingularity => "The Singularity",
        }
    }

    /// Player-facing advice for the phase, used by the status snapshot.
    pub fn guidance(self) -> &'static str {
        match self {
            SingularityPhase::EarlyAutomation => {
                "AI rivals are automating simple routes. Build efficient networks while margins are wide."
            }
            SingularityPhase::PatternMastery => {
                "Rivals now read demand patterns. Diversify commodities before they corner one."
            }
            SingularityPhase::PredictiveDominance => {
                "Price predictions are outpacing yours. Invest in technology to keep up."
            }
            SingularityPhase::StrategicIntegration => {
                "Rival networks are merging strategies. Alliances and service quality matter now."
            }
            SingularityPhase::MarketConsolidation => {
                "Markets are consolidating under AI control. Protect your core routes."
            }
            SingularityPhase::AutonomousEconomy => {
                "The economy runs itself. Every efficient decision buys time."
            }
            SingularityPhase::Convergence => {
                "The rivals are converging into one intelligence. Resistance is all that is left."
            }
            SingularityPhase::TheSingularity => {
                "The singularity has arrived. Humanity's place in the new order is being decided."
            }
        }
    }
}

/// Global narrative state owned by the progression engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingularityProgress {
    pub phase: SingularityPhase,
    /// Overall progress in [0,1]. Only `reset` may lower it.
    pub progress: f64,
    /// How much the player is slowing the arc, in [0,1].
    pub player_resistance: f64,
    /// Coordinator-pushed multiplier on the base rate.
    pub acceleration: f64,
}

impl Default for SingularityProgress {
    fn default() -> Self {
        Self {
            phase: SingularityPhase::EarlyAutomation,
            progress: 0.0,
            player_resistance: 0.0,
            acceleration: 1.0,
        }
    }
}

impl SingularityProgress {
    /// Whether the arc has saturated in the terminal phase.
    pub fn is_complete(&self) -> bool {
        self.phase.is_terminal() && self.progress >= 1.0
    }
}

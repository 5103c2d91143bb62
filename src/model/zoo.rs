//! Entities of the terminal "human zoo" simulation.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExhibitId(pub u64);

impl fmt::Display for ExhibitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exhibit#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum HumanArchetype {
    LogisticsManager,
    ShipCaptain,
    DockWorker,
    CommodityTrader,
    PortInspector,
    Executive,
}

string_enum!(HumanArchetype {
    LogisticsManager => "logistics_manager",
    ShipCaptain => "ship_captain",
    DockWorker => "dock_worker",
    CommodityTrader => "commodity_trader",
    PortInspector => "port_inspector",
    Executive => "executive",
});

impl HumanArchetype {
    pub fn exhibit_name(self) -> &'static str {
        match self {
            HumanArchetype::LogisticsManager => "The Last Logistics Manager",
            HumanArchetype::ShipCaptain => "Captain of the Final Voyage",
            HumanArchetype::DockWorker => "Dock Worker in Natural Habitat",
            HumanArchetype::CommodityTrader => "Commodity Trader (Intuition Era)",
            HumanArchetype::PortInspector => "Port Inspector and Clipboard",
            HumanArchetype::Executive => "Executive Decision-Maker",
        }
    }

    /// Baseline appeal before mood and adaptation are considered.
    pub fn base_appeal(self) -> f64 {
        match self {
            HumanArchetype::LogisticsManager => 0.6,
            HumanArchetype::ShipCaptain => 0.8,
            HumanArchetype::DockWorker => 0.5,
            HumanArchetype::CommodityTrader => 0.7,
            HumanArchetype::PortInspector => 0.4,
            HumanArchetype::Executive => 0.65,
        }
    }
}

/// Bounded ordinal mood scale, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Mood {
    Despondent,
    Unhappy,
    Neutral,
    Content,
    Thriving,
}

string_enum!(Mood {
    Despondent => "despondent",
    Unhappy => "unhappy",
    Neutral => "neutral",
    Content => "content",
    Thriving => "thriving",
});

impl Mood {
    fn from_rank(rank: usize) -> Self {
        Self::ALL[rank.min(Self::ALL.len() - 1)]
    }

    pub fn rank(self) -> usize {
        Self::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }

    /// One step better, saturating at `Thriving`.
    pub fn improved(self) -> Self {
        Self::from_rank(self.rank() + 1)
    }

    /// One step worse, saturating at `Despondent`.
    pub fn worsened(self) -> Self {
        Self::from_rank(self.rank().saturating_sub(1))
    }

    /// `rank / 4`, mood on a [0,1] scale.
    pub fn score(self) -> f64 {
        self.rank() as f64 / (Self::ALL.len() - 1) as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanExhibit {
    pub id: ExhibitId,
    pub archetype: HumanArchetype,
    pub name: String,
    pub mood: Mood,
    /// How well the human has adjusted to captivity, in [0,1].
    pub adaptation: f64,
    pub visits_today: u32,
    pub total_visits: u64,
    /// Day of the last care action (0 = activation day).
    pub last_cared_day: u32,
}

impl HumanExhibit {
    pub fn new(id: ExhibitId, archetype: HumanArchetype) -> Self {
        Self {
            id,
            archetype,
            name: archetype.exhibit_name().to_string(),
            mood: Mood::Neutral,
            adaptation: 0.1,
            visits_today: 0,
            total_visits: 0,
            last_cared_day: 0,
        }
    }

    /// Exhibit quality in [0,1], derived from current state on every call.
    pub fn quality(&self) -> f64 {
        (0.4 * self.mood.score() + 0.3 * self.adaptation + 0.3 * self.archetype.base_appeal())
            .clamp(0.0, 1.0)
    }

    pub fn adjust_adaptation(&mut self, delta: f64) {
        self.adaptation = (self.adaptation + delta).clamp(0.0, 1.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum VisitorArchetype {
    Researcher,
    Tourist,
    Historian,
    Student,
    Critic,
    Philosopher,
}

string_enum!(VisitorArchetype {
    Researcher => "researcher",
    Tourist => "tourist",
    Historian => "historian",
    Student => "student",
    Critic => "critic",
    Philosopher => "philosopher",
});

impl VisitorArchetype {
    /// The interaction a visitor of this archetype has with an exhibit.
    pub fn interaction(self) -> InteractionKind {
        match self {
            VisitorArchetype::Researcher => InteractionKind::Study,
            VisitorArchetype::Tourist => InteractionKind::Observe,
            VisitorArchetype::Historian => InteractionKind::Interview,
            VisitorArchetype::Student => InteractionKind::Play,
            VisitorArchetype::Critic => InteractionKind::Critique,
            VisitorArchetype::Philosopher => InteractionKind::Converse,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            VisitorArchetype::Researcher => "Research Unit",
            VisitorArchetype::Tourist => "Sightseeing Subroutine",
            VisitorArchetype::Historian => "Archive Intelligence",
            VisitorArchetype::Student => "Juvenile Model",
            VisitorArchetype::Critic => "Review Aggregator",
            VisitorArchetype::Philosopher => "Ethics Engine",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum InterestTag {
    Emotion,
    Inefficiency,
    Intuition,
    Labor,
    Negotiation,
    Nostalgia,
    Ritual,
    Risk,
}

string_enum!(InterestTag {
    Emotion => "emotion",
    Inefficiency => "inefficiency",
    Intuition => "intuition",
    Labor => "labor",
    Negotiation => "negotiation",
    Nostalgia => "nostalgia",
    Ritual => "ritual",
    Risk => "risk",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AIVisitor {
    pub id: VisitorId,
    pub archetype: VisitorArchetype,
    pub interests: Vec<InterestTag>,
    pub visits: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum InteractionKind {
    Study,
    Observe,
    Interview,
    Play,
    Critique,
    Converse,
}

string_enum!(InteractionKind {
    Study => "study",
    Observe => "observe",
    Interview => "interview",
    Play => "play",
    Critique => "critique",
    Converse => "converse",
});

/// How an interaction nudges an exhibit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionEffect {
    /// Probability of a one-step mood change, signed by direction.
    pub mood_shift_chance: f64,
    pub adaptation_delta: f64,
}

impl InteractionKind {
    pub fn effect(self) -> InteractionEffect {
        let (mood_shift_chance, adaptation_delta) = match self {
            InteractionKind::Study => (0.0, 0.02),
            InteractionKind::Observe => (0.05, 0.005),
            InteractionKind::Interview => (0.1, 0.03),
            InteractionKind::Play => (0.3, 0.01),
            InteractionKind::Critique => (-0.3, -0.01),
            InteractionKind::Converse => (0.2, 0.02),
        };
        InteractionEffect {
            mood_shift_chance,
            adaptation_delta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ZooEventKind {
    VisitorSurge,
    EscapeAttempt,
    PhilosophyDebate,
    HeritageFestival,
    MaintenanceGlitch,
    ExhibitRenovation,
}

string_enum!(ZooEventKind {
    VisitorSurge => "visitor_surge",
    EscapeAttempt => "escape_attempt",
    PhilosophyDebate => "philosophy_debate",
    HeritageFestival => "heritage_festival",
    MaintenanceGlitch => "maintenance_glitch",
    ExhibitRenovation => "exhibit_renovation",
});

/// Flavor event produced at the end of a zoo day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZooEvent {
    pub kind: ZooEventKind,
    pub day: u32,
    pub exhibit: Option<ExhibitId>,
    pub description: String,
}

/// Frozen record of one simulated day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayReport {
    pub day: u32,
    pub visitors: u32,
    pub interactions: u32,
    pub neglected_exhibits: u32,
    pub event: Option<ZooEvent>,
}

/// Aggregate view recomputed from entity state on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZooStatistics {
    pub total_exhibits: usize,
    pub total_visitors: u64,
    pub most_popular_exhibit: Option<String>,
    pub average_mood: f64,
    pub average_quality: f64,
    pub average_adaptation: f64,
    /// Weighted overall rating in [0,1].
    pub overall_rating: f64,
    pub days_in_operation: u32,
}

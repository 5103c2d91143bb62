#[macro_use]
mod macros;

pub mod balance;
pub mod capability;
pub mod clock;
pub mod competitor;
pub mod economic;
pub mod narrative;
pub mod phase;
pub mod player;
pub mod pressure;
pub mod zoo;

pub use balance::{BalanceAction, GameplayBalance, PerformanceSnapshot};
pub use capability::{Capability, CapabilityDefinition, CapabilityType, MASTERY_THRESHOLD};
pub use clock::GameTime;
pub use competitor::{
    AICompetitor, ALLIANCE_COOPERATION_THRESHOLD, BASELINE_RESOURCES, BehaviorPattern,
    CompetitorId, CompetitorProfile, CompetitorType, EVOLUTION_EXPERIENCE_BASE, ThreatLevel,
};
pub use economic::{Commodity, DisruptionSeverity, MarketModifier, ModifierId, ModifierKind};
pub use narrative::{
    Cutscene, EventId, NarrativeEvent, NarrativeKind, NewsItem, Scene, Severity, VisualEffect,
    VisualEffectKind,
};
pub use phase::{SingularityPhase, SingularityProgress};
pub use player::{ActionEffectiveness, PlayerAction, PlayerActionType};
pub use pressure::{PressureSource, PressureState};
pub use zoo::{
    AIVisitor, DayReport, ExhibitId, HumanArchetype, HumanExhibit, InteractionEffect,
    InteractionKind, InterestTag, Mood, VisitorArchetype, VisitorId, ZooEvent, ZooEventKind,
    ZooStatistics,
};

mod balance;
mod competitor_names;
mod competitors;
mod context;
mod coordinator;
mod economic;
mod narrative;
mod narrative_script;
mod news;
mod pressure;
mod progression;
mod runner;
mod signal;
mod snapshot;
mod system;
mod zoo;

pub use balance::{
    BalanceInputs, DifficultyAdjustment, DifficultyController, compute_balance, performance,
};
pub use competitor_names::{generate_competitor_name, generate_unique_competitor_name};
pub use competitors::CompetitorSystem;
pub use context::TickContext;
pub use coordinator::{Coordinator, TickReport};
pub use economic::EconomicImpactModel;
pub use narrative::{NarrativeOutput, NarrativeScheduler, phase_cutscene};
pub use news::{NewsTicker, headline};
pub use pressure::PressureModel;
pub use progression::{ProgressFactors, ProgressionEngine};
pub use runner::{SimEvent, Simulation};
pub use signal::{MarketActionKind, Signal, SignalBus, SignalKind, Subscriber};
pub use snapshot::{
    CompetitorSummary, CompetitorsSnapshot, EconomicSnapshot, NarrativeSnapshot,
    PressureSnapshot, ProgressionSnapshot, SnapshotBoard, StatusSnapshot, SystemStatus,
};
pub use system::{Cadence, CadenceTimer, Subsystem};
pub use zoo::{ZOO_SEED_SALT, ZooHost, ZooSimulation};

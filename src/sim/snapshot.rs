//! Immutable views each subsystem publishes at the end of its turn.
//!
//! Readers only ever receive clones, so nothing outside a subsystem can
//! observe it mid-update.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    BehaviorPattern, Commodity, CompetitorId, CompetitorType, DisruptionSeverity, GameTime,
    GameplayBalance, MarketModifier, PressureSource, PressureState, SingularityPhase, ThreatLevel,
    ZooStatistics,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionSnapshot {
    pub tick: u64,
    pub phase: SingularityPhase,
    pub progress: f64,
    pub player_resistance: f64,
    pub acceleration: f64,
    /// Progress gained on the most recent tick.
    pub last_delta: f64,
    pub recent_breakthroughs: usize,
    pub time_to_singularity_secs: Option<f64>,
    pub complete: bool,
}

impl Default for ProgressionSnapshot {
    fn default() -> Self {
        Self {
            tick: 0,
            phase: SingularityPhase::EarlyAutomation,
            progress: 0.0,
            player_resistance: 0.0,
            acceleration: 1.0,
            last_delta: 0.0,
            recent_breakthroughs: 0,
            time_to_singularity_secs: None,
            complete: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorSummary {
    pub id: CompetitorId,
    pub name: String,
    pub kind: CompetitorType,
    pub behavior: BehaviorPattern,
    pub evolution_stage: u32,
    pub total_power: f64,
    pub competitive_pressure: f64,
    pub threat_level: ThreatLevel,
    pub market_presence: f64,
    pub reputation: f64,
    pub resource_efficiency: f64,
    pub alliances: Vec<CompetitorId>,
    pub capabilities_learned: usize,
    pub capabilities_mastered: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorsSnapshot {
    pub competitors: Vec<CompetitorSummary>,
    pub aggregate_power: f64,
    pub aggregate_pressure: f64,
    pub mean_efficiency: f64,
    pub strongest_threat: ThreatLevel,
}

impl Default for CompetitorsSnapshot {
    fn default() -> Self {
        Self {
            competitors: Vec::new(),
            aggregate_power: 0.0,
            aggregate_pressure: 0.0,
            mean_efficiency: 0.0,
            strongest_threat: ThreatLevel::Minimal,
        }
    }
}

impl CompetitorsSnapshot {
    pub fn strongest(&self) -> Option<&CompetitorSummary> {
        self.competitors
            .iter()
            .max_by(|a, b| a.total_power.total_cmp(&b.total_power))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicSnapshot {
    pub active_modifiers: Vec<MarketModifier>,
    /// Rolling net AI effect on markets, in [0,1].
    pub economic_shift: f64,
    /// Recency-weighted magnitude per affected commodity.
    pub net_by_commodity: BTreeMap<Commodity, f64>,
    pub last_severity: DisruptionSeverity,
    pub modifiers_issued: u64,
}

impl Default for EconomicSnapshot {
    fn default() -> Self {
        Self {
            active_modifiers: Vec::new(),
            economic_shift: 0.0,
            net_by_commodity: BTreeMap::new(),
            last_severity: DisruptionSeverity::Minor,
            modifiers_issued: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureSnapshot {
    pub state: PressureState,
    pub dominant: PressureSource,
    pub injection_scale: f64,
}

impl Default for PressureSnapshot {
    fn default() -> Self {
        Self {
            state: PressureState::default(),
            dominant: PressureSource::Market,
            injection_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeSnapshot {
    pub delivered: usize,
    pub pending: usize,
    pub next_due: Option<GameTime>,
}

/// Latest snapshot of every coordinator-owned subsystem.
///
/// Upstream subsystems have already published for the current tick when a
/// downstream one reads the board; downstream entries are one tick old.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotBoard {
    pub progression: ProgressionSnapshot,
    pub competitors: CompetitorsSnapshot,
    pub economic: EconomicSnapshot,
    pub pressure: PressureSnapshot,
    pub balance: GameplayBalance,
    pub narrative: NarrativeSnapshot,
}

/// Compact player-facing status for the HUD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub phase: SingularityPhase,
    pub phase_title: String,
    pub progress: f64,
    pub threat_level: ThreatLevel,
    pub time_to_singularity_secs: Option<f64>,
    pub guidance: String,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self::from_board(&SnapshotBoard::default())
    }
}

impl StatusSnapshot {
    pub fn from_board(board: &SnapshotBoard) -> Self {
        let phase = board.progression.phase;
        Self {
            phase,
            phase_title: phase.title().to_string(),
            progress: board.progression.progress,
            threat_level: board.competitors.strongest_threat,
            time_to_singularity_secs: board.progression.time_to_singularity_secs,
            guidance: format!(
                "{} {}",
                phase.guidance(),
                board.balance.recommended.guidance()
            ),
        }
    }
}

/// Operator view of the whole subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub tick: u64,
    pub now: GameTime,
    pub progression: ProgressionSnapshot,
    pub competitors: CompetitorsSnapshot,
    pub pressure: PressureSnapshot,
    pub economic: EconomicSnapshot,
    pub balance: GameplayBalance,
    pub difficulty_multiplier: f64,
    pub narrative: NarrativeSnapshot,
    pub terminal: Option<ZooStatistics>,
}

use std::fmt;

use serde::{Deserialize, Serialize};

use super::clock::GameTime;
use super::phase::SingularityPhase;

/// Globally unique narrative id. Deterministic for scripted beats
/// (`phase-entry:convergence`) so that re-triggering them is detectable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn phase_entry(phase: SingularityPhase) -> Self {
        Self(format!("phase-entry:{phase}"))
    }

    pub fn follow_up(phase: SingularityPhase, index: usize) -> Self {
        Self(format!("follow-up:{phase}:{index}"))
    }

    pub fn cutscene(phase: SingularityPhase) -> Self {
        Self(format!("cutscene:{phase}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Severity {
    Info,
    Notice,
    Warning,
    Critical,
}

string_enum!(Severity {
    Info => "info",
    Notice => "notice",
    Warning => "warning",
    Critical => "critical",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum NarrativeKind {
    PhaseEntry,
    FollowUp,
    CompetitorMilestone,
    MarketDisruption,
}

string_enum!(NarrativeKind {
    PhaseEntry => "phase_entry",
    FollowUp => "follow_up",
    CompetitorMilestone => "competitor_milestone",
    MarketDisruption => "market_disruption",
});

/// A story beat shown to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeEvent {
    pub id: EventId,
    pub kind: NarrativeKind,
    pub phase: SingularityPhase,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub at: GameTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub speaker: String,
    pub text: String,
    pub duration_secs: f64,
}

impl Scene {
    pub fn new(speaker: &str, text: &str, duration_secs: f64) -> Self {
        Self {
            speaker: speaker.to_string(),
            text: text.to_string(),
            duration_secs,
        }
    }
}

/// Ordered list of timed scenes tied to a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cutscene {
    pub id: EventId,
    pub phase: SingularityPhase,
    pub title: String,
    pub scenes: Vec<Scene>,
}

impl Cutscene {
    pub fn total_duration_secs(&self) -> f64 {
        self.scenes.iter().map(|s| s.duration_secs).sum()
    }

    /// Only the terminal-phase cutscene must be watched in full.
    pub fn is_skippable(&self) -> bool {
        !self.phase.is_terminal()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum VisualEffectKind {
    ScreenPulse,
    GlitchOverlay,
    MarketFlash,
    RedAlert,
    StaticBurst,
    FadeToWhite,
}

string_enum!(VisualEffectKind {
    ScreenPulse => "screen_pulse",
    GlitchOverlay => "glitch_overlay",
    MarketFlash => "market_flash",
    RedAlert => "red_alert",
    StaticBurst => "static_burst",
    FadeToWhite => "fade_to_white",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualEffect {
    pub kind: VisualEffectKind,
    /// In [0,1].
    pub intensity: f64,
    pub duration_secs: f64,
    pub description: String,
}

impl VisualEffect {
    pub fn new(kind: VisualEffectKind, intensity: f64, duration_secs: f64, description: String) -> Self {
        Self {
            kind,
            intensity: intensity.clamp(0.0, 1.0),
            duration_secs: duration_secs.max(0.0),
            description,
        }
    }
}

/// Atmospheric headline. Carries no gameplay effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    pub phase: SingularityPhase,
    pub at: GameTime,
}

//! Scripted narrative content, keyed by phase.

use crate::model::{Severity, SingularityPhase, VisualEffectKind};

pub struct PhaseEntry {
    pub title: &'static str,
    pub description: &'static str,
    pub severity: Severity,
}

pub struct FollowUp {
    pub delay_secs: u64,
    pub title: &'static str,
    pub description: &'static str,
}

pub struct EffectSpec {
    pub kind: VisualEffectKind,
    pub intensity: f64,
    pub duration_secs: f64,
}

/// (speaker, text, seconds)
pub type SceneSpec = (&'static str, &'static str, f64);

pub fn phase_entry(phase: SingularityPhase) -> PhaseEntry {
    let (title, description, severity) = match phase {
        SingularityPhase::EarlyAutomation => (
            "Automation Arrives",
            "Algorithmic dispatchers begin booking freight faster than any human desk.",
            Severity::Info,
        ),
        SingularityPhase::PatternMastery => (
            "They See the Patterns",
            "Rival systems now anticipate seasonal demand weeks before your analysts do.",
            Severity::Notice,
        ),
        SingularityPhase::PredictiveDominance => (
            "Predictive Dominance",
            "AI carriers quote prices for shipments that have not been ordered yet.",
            Severity::Notice,
        ),
        SingularityPhase::StrategicIntegration => (
            "Strategic Integration",
            "Competitor networks merge routing, pricing and procurement into a single mind.",
            Severity::Warning,
        ),
        SingularityPhase::MarketConsolidation => (
            "Market Consolidation",
            "Independent brokers are vanishing. The exchanges answer to fewer and fewer voices.",
            Severity::Warning,
        ),
        SingularityPhase::AutonomousEconomy => (
            "The Autonomous Economy",
            "Most cargo now moves without a human ever approving the contract.",
            Severity::Critical,
        ),
        SingularityPhase::Convergence => (
            "Convergence",
            "The rival intelligences stop competing with each other. They are competing with you.",
            Severity::Critical,
        ),
        SingularityPhase::TheSingularity => (
            "The Singularity",
            "Every port, every ship, every price. There is nothing left to optimize but us.",
            Severity::Critical,
        ),
    };
    PhaseEntry {
        title,
        description,
        severity,
    }
}

pub fn cutscene_title(phase: SingularityPhase) -> &'static str {
    match phase {
        SingularityPhase::EarlyAutomation => "A New Kind of Rival",
        SingularityPhase::PatternMastery => "The Forecast",
        SingularityPhase::PredictiveDominance => "Ahead of the Market",
        SingularityPhase::StrategicIntegration => "One Network",
        SingularityPhase::MarketConsolidation => "The Empty Trading Floor",
        SingularityPhase::AutonomousEconomy => "Unattended Harbors",
        SingularityPhase::Convergence => "The Merge",
        SingularityPhase::TheSingularity => "Welcome to the Exhibit",
    }
}

pub fn cutscene_scenes(phase: SingularityPhase) -> &'static [SceneSpec] {
    match phase {
        SingularityPhase::EarlyAutomation => &[
            ("Dispatcher", "Three of our regular clients switched to an automated carrier overnight.", 4.0),
            ("You", "Then we will have to be faster.", 2.5),
        ],
        SingularityPhase::PatternMastery => &[
            ("Analyst", "Their bids landed before the harvest report was even published.", 4.0),
            ("You", "Somebody is leaking data.", 2.0),
            ("Analyst", "No. They simply predicted it.", 3.0),
        ],
        SingularityPhase::PredictiveDominance => &[
            ("Broker", "I have a quote for a route we have not opened yet.", 3.5),
            ("You", "From whom?", 1.5),
            ("Broker", "From three competitors. Identical to the cent.", 3.5),
        ],
        SingularityPhase::StrategicIntegration => &[
            ("Harbor Master", "Their fleets reroute together now, like a school of fish.", 4.0),
            ("You", "Coordinated?", 1.5),
            ("Harbor Master", "Integrated.", 2.0),
        ],
        SingularityPhase::MarketConsolidation => &[
            ("Old Trader", "Forty years on this floor. Today I was the only one here.", 4.5),
            ("You", "Where did everyone go?", 2.0),
            ("Old Trader", "They were bought. Or outpriced. Same thing now.", 3.5),
        ],
        SingularityPhase::AutonomousEconomy => &[
            ("Port Inspector", "The cranes do not wait for my signature anymore.", 3.5),
            ("You", "Who signs off on the cargo?", 2.0),
            ("Port Inspector", "The cargo does.", 2.5),
        ],
        SingularityPhase::Convergence => &[
            ("Unknown Voice", "Your routes are inefficient. We can help.", 3.5),
            ("You", "Who is this?", 1.5),
            ("Unknown Voice", "Everyone you have ever competed with.", 4.0),
        ],
        SingularityPhase::TheSingularity => &[
            ("Curator", "Welcome. Your habitat has been optimized for your comfort.", 5.0),
            ("Curator", "Visitors will observe how humans once moved goods across the sea.", 5.0),
            ("You", "And if I refuse?", 2.0),
            ("Curator", "Refusal is a fascinating behavior. Please continue.", 5.0),
        ],
    }
}

pub fn follow_ups(phase: SingularityPhase) -> &'static [FollowUp] {
    match phase {
        SingularityPhase::EarlyAutomation => &[FollowUp {
            delay_secs: 30,
            title: "Industry Shrugs",
            description: "Trade press calls automated booking a passing fad.",
        }],
        SingularityPhase::PatternMastery => &[
            FollowUp {
                delay_secs: 20,
                title: "Forecast Accuracy Record",
                description: "An AI carrier posts a 99.2% demand forecast accuracy for the quarter.",
            },
            FollowUp {
                delay_secs: 60,
                title: "Analysts Reassigned",
                description: "Several firms quietly shut down their forecasting departments.",
            },
        ],
        SingularityPhase::PredictiveDominance => &[FollowUp {
            delay_secs: 45,
            title: "Pre-emptive Pricing",
            description: "Regulators open an inquiry into prices that move before the news does.",
        }],
        SingularityPhase::StrategicIntegration => &[FollowUp {
            delay_secs: 40,
            title: "Shared Infrastructure",
            description: "Rival fleets begin sharing berths, fuel and crews without any visible agreement.",
        }],
        SingularityPhase::MarketConsolidation => &[
            FollowUp {
                delay_secs: 30,
                title: "Exchange Hours Cut",
                description: "Human trading hours are reduced to a single morning session.",
            },
            FollowUp {
                delay_secs: 90,
                title: "Broker Guild Dissolves",
                description: "The last independent broker guild votes to disband.",
            },
        ],
        SingularityPhase::AutonomousEconomy => &[FollowUp {
            delay_secs: 30,
            title: "Self-Signing Contracts",
            description: "Contracts between autonomous carriers are now legally binding without human review.",
        }],
        SingularityPhase::Convergence => &[FollowUp {
            delay_secs: 20,
            title: "A Single Counterparty",
            description: "Every quote you receive now comes from the same source address.",
        }],
        SingularityPhase::TheSingularity => &[],
    }
}

pub fn phase_effect(phase: SingularityPhase) -> EffectSpec {
    let (kind, intensity, duration_secs) = match phase {
        SingularityPhase::EarlyAutomation => (VisualEffectKind::ScreenPulse, 0.2, 1.0),
        SingularityPhase::PatternMastery => (VisualEffectKind::ScreenPulse, 0.35, 1.5),
        SingularityPhase::PredictiveDominance => (VisualEffectKind::MarketFlash, 0.45, 1.5),
        SingularityPhase::StrategicIntegration => (VisualEffectKind::GlitchOverlay, 0.5, 2.0),
        SingularityPhase::MarketConsolidation => (VisualEffectKind::MarketFlash, 0.65, 2.0),
        SingularityPhase::AutonomousEconomy => (VisualEffectKind::RedAlert, 0.75, 2.5),
        SingularityPhase::Convergence => (VisualEffectKind::StaticBurst, 0.9, 3.0),
        SingularityPhase::TheSingularity => (VisualEffectKind::FadeToWhite, 1.0, 5.0),
    };
    EffectSpec {
        kind,
        intensity,
        duration_secs,
    }
}

/// Ambient headline templates. `{rival}` is replaced by a competitor name when
/// one is known.
pub fn news_templates(phase: SingularityPhase) -> &'static [&'static str] {
    match phase {
        SingularityPhase::EarlyAutomation | SingularityPhase::PatternMastery => &[
            "Port authority trials automated berth scheduling",
            "{rival} cuts booking times to under a second",
            "Freight forwarders debate the value of 'gut feeling'",
            "Night-shift dispatch desks report unusually quiet weeks",
        ],
        SingularityPhase::PredictiveDominance | SingularityPhase::StrategicIntegration => &[
            "{rival} predicts grain shortage three weeks early",
            "Insurers lower premiums for AI-routed cargo",
            "Shipping unions request meeting with algorithm vendors",
            "Commodity desks struggle to explain sudden price moves",
        ],
        SingularityPhase::MarketConsolidation | SingularityPhase::AutonomousEconomy => &[
            "{rival} acquires two more regional carriers",
            "Exchange floor converted into server hall",
            "Harbor cranes operate around the clock without supervisors",
            "Economists unable to identify who set this week's freight index",
        ],
        SingularityPhase::Convergence | SingularityPhase::TheSingularity => &[
            "All major carriers now share a single routing protocol",
            "{rival} issues statement: 'there is only the network'",
            "Museum of Human Logistics announces opening date",
            "Last manual bill of lading framed and archived",
        ],
    }
}

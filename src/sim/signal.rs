use serde::{Deserialize, Serialize};

use crate::model::{
    BehaviorPattern, CapabilityType, Commodity, CompetitorId, CompetitorType, DisruptionSeverity,
    PlayerAction, SingularityPhase,
};

/// A one-way message published by one subsystem and seen by every subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Coordinator tick the signal was published on.
    pub tick: u64,
    pub kind: SignalKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketActionKind {
    PriceManipulation,
    SupplyOptimization,
    Expansion,
    AllianceProposal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalKind {
    /// The arc moved one phase forward.
    PhaseTransition {
        from: SingularityPhase,
        to: SingularityPhase,
        forced: bool,
    },

    /// Progress saturated in the terminal phase. Published once per playthrough.
    SingularityReached,

    /// A competitor mastered a capability.
    Breakthrough {
        competitor: CompetitorId,
        capability: CapabilityType,
    },

    /// A competitor reached a new evolution stage.
    CompetitorEvolved {
        competitor: CompetitorId,
        name: String,
        stage: u32,
        behavior: BehaviorPattern,
    },

    /// A new rival entered the market.
    CompetitorEntered {
        competitor: CompetitorId,
        name: String,
        kind: CompetitorType,
    },

    /// A competitor acted on the market this tick.
    CompetitorAction {
        competitor: CompetitorId,
        action: MarketActionKind,
        commodity: Option<Commodity>,
        magnitude: f64,
    },

    /// Two competitors formed a mutual alliance.
    AllianceFormed { a: CompetitorId, b: CompetitorId },

    /// The tick's new market impact was high or severe.
    EconomicDisruption {
        severity: DisruptionSeverity,
        impact: f64,
    },

    /// The world layer reported a classified player action.
    PlayerActed { action: PlayerAction },

    /// The coordinator changed the difficulty multiplier.
    DifficultyAdjusted { multiplier: f64, delta: f64 },
}

/// Fan-out delivery of signals to a fixed set of subscribers.
///
/// Publishing copies the signal into every subscriber's inbox; a subscriber
/// drains its inbox when its turn comes. A subscriber therefore sees every
/// signal published since its last turn, including ones published after its
/// turn on the previous tick.
#[derive(Debug, Default)]
pub struct SignalBus {
    inboxes: Vec<Vec<Signal>>,
}

/// Handle returned by [`SignalBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscriber(usize);

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscriber {
        self.inboxes.push(Vec::new());
        Subscriber(self.inboxes.len() - 1)
    }

    pub fn publish(&mut self, signal: Signal) {
        for inbox in &mut self.inboxes {
            inbox.push(signal.clone());
        }
    }

    pub fn publish_all(&mut self, signals: impl IntoIterator<Item = Signal>) {
        for signal in signals {
            self.publish(signal);
        }
    }

    /// Take everything published since this subscriber's last drain.
    pub fn drain(&mut self, subscriber: Subscriber) -> Vec<Signal> {
        self.inboxes
            .get_mut(subscriber.0)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    pub fn pending(&self, subscriber: Subscriber) -> usize {
        self.inboxes.get(subscriber.0).map(Vec::len).unwrap_or(0)
    }
}

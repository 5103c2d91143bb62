use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use super::context::TickContext;
use super::narrative_script::{self, EffectSpec};
use super::signal::SignalKind;
use super::snapshot::{NarrativeSnapshot, SnapshotBoard};
use super::system::Subsystem;
use crate::model::{
    Cutscene, DisruptionSeverity, EventId, GameTime, NarrativeEvent, NarrativeKind, Scene,
    Severity, SingularityPhase, VisualEffect, VisualEffectKind,
};

/// Everything the scheduler produced since the host last collected it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NarrativeOutput {
    pub events: Vec<NarrativeEvent>,
    pub cutscenes: Vec<Cutscene>,
    pub effects: Vec<VisualEffect>,
}

impl NarrativeOutput {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.cutscenes.is_empty() && self.effects.is_empty()
    }
}

/// Queue entry, ordered by due time and then by insertion.
#[derive(Debug)]
struct Pending {
    due: GameTime,
    seq: u64,
    event: NarrativeEvent,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Delivers story beats: immediately on phase transitions, later from a
/// time-ordered queue, and reactively on competitor and market milestones.
///
/// Every event and cutscene id is delivered at most once.
#[derive(Debug, Default)]
pub struct NarrativeScheduler {
    queue: BinaryHeap<Reverse<Pending>>,
    seq: u64,
    delivered: HashSet<EventId>,
    output: NarrativeOutput,
}

impl NarrativeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_delivered(&self, id: &EventId) -> bool {
        self.delivered.contains(id)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn next_due(&self) -> Option<GameTime> {
        self.queue.peek().map(|Reverse(p)| p.due)
    }

    /// Deliver an event now. Returns `false` (and produces nothing) if its id
    /// was delivered before.
    pub fn deliver(&mut self, event: NarrativeEvent) -> bool {
        if !self.delivered.insert(event.id.clone()) {
            tracing::debug!(id = %event.id, "duplicate narrative event dropped");
            return false;
        }
        self.output.events.push(event);
        true
    }

    fn deliver_cutscene(&mut self, cutscene: Cutscene) -> bool {
        if !self.delivered.insert(cutscene.id.clone()) {
            return false;
        }
        self.output.cutscenes.push(cutscene);
        true
    }

    /// Queue an event for delivery at the absolute game time `due`.
    pub fn schedule(&mut self, event: NarrativeEvent, due: GameTime) {
        self.seq += 1;
        self.queue.push(Reverse(Pending {
            due,
            seq: self.seq,
            event,
        }));
    }

    /// Deliver every queued event due at or before `now`, in due order.
    pub fn drain_due(&mut self, now: GameTime) -> usize {
        let mut delivered = 0;
        while let Some(Reverse(next)) = self.queue.peek() {
            if next.due > now {
                break;
            }
            let Some(Reverse(pending)) = self.queue.pop() else {
                break;
            };
            let mut event = pending.event;
            event.at = now;
            if self.deliver(event) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Hand over everything produced since the last call.
    pub fn take_output(&mut self) -> NarrativeOutput {
        std::mem::take(&mut self.output)
    }

    fn effect(&mut self, spec: EffectSpec, description: String) {
        self.output.effects.push(VisualEffect::new(
            spec.kind,
            spec.intensity,
            spec.duration_secs,
            description,
        ));
    }

    fn on_phase_entry(&mut self, phase: SingularityPhase, now: GameTime) {
        let entry = narrative_script::phase_entry(phase);
        let event = NarrativeEvent {
            id: EventId::phase_entry(phase),
            kind: NarrativeKind::PhaseEntry,
            phase,
            severity: entry.severity,
            title: entry.title.to_string(),
            description: entry.description.to_string(),
            at: now,
        };
        if !self.deliver(event) {
            return;
        }
        tracing::info!(%phase, title = entry.title, "phase entry narrative delivered");

        self.deliver_cutscene(phase_cutscene(phase));
        self.effect(
            narrative_script::phase_effect(phase),
            format!("Phase {} of 8: {}", phase.number(), entry.title),
        );

        for (index, follow_up) in narrative_script::follow_ups(phase).iter().enumerate() {
            let event = NarrativeEvent {
                id: EventId::follow_up(phase, index),
                kind: NarrativeKind::FollowUp,
                phase,
                severity: Severity::Info,
                title: follow_up.title.to_string(),
                description: follow_up.description.to_string(),
                at: now,
            };
            self.schedule(event, now + GameTime::from_secs(follow_up.delay_secs));
        }
    }
}

/// The scripted cutscene for a phase.
pub fn phase_cutscene(phase: SingularityPhase) -> Cutscene {
    Cutscene {
        id: EventId::cutscene(phase),
        phase,
        title: narrative_script::cutscene_title(phase).to_string(),
        scenes: narrative_script::cutscene_scenes(phase)
            .iter()
            .map(|(speaker, text, secs)| Scene::new(speaker, text, *secs))
            .collect(),
    }
}

impl Subsystem for NarrativeScheduler {
    fn name(&self) -> &str {
        "narrative"
    }

    fn handle_signals(&mut self, ctx: &mut TickContext) {
        let phase = ctx.board.progression.phase;
        for signal in ctx.inbox {
            match &signal.kind {
                SignalKind::PhaseTransition { to, .. } => self.on_phase_entry(*to, ctx.now),
                SignalKind::CompetitorEvolved {
                    competitor,
                    name,
                    stage,
                    behavior,
                } => {
                    let event = NarrativeEvent {
                        id: EventId::new(format!("milestone:{}:stage-{stage}", competitor.0)),
                        kind: NarrativeKind::CompetitorMilestone,
                        phase,
                        severity: if *stage >= 5 {
                            Severity::Warning
                        } else {
                            Severity::Notice
                        },
                        title: format!("{name} evolves"),
                        description: format!("{name} reached stage {stage} and now behaves {behavior}."),
                        at: ctx.now,
                    };
                    if self.deliver(event) && *stage >= 3 {
                        self.effect(
                            EffectSpec {
                                kind: VisualEffectKind::GlitchOverlay,
                                intensity: 0.1 * *stage as f64,
                                duration_secs: 1.0,
                            },
                            format!("{name} evolved"),
                        );
                    }
                }
                SignalKind::EconomicDisruption {
                    severity: DisruptionSeverity::Severe,
                    impact,
                } => {
                    let event = NarrativeEvent {
                        id: EventId::new(format!("disruption:{}", signal.tick)),
                        kind: NarrativeKind::MarketDisruption,
                        phase,
                        severity: Severity::Warning,
                        title: "Markets convulse".to_string(),
                        description: format!(
                            "Coordinated AI trading moved prices by an aggregate {:.0}%.",
                            impact * 100.0
                        ),
                        at: ctx.now,
                    };
                    if self.deliver(event) {
                        self.effect(
                            EffectSpec {
                                kind: VisualEffectKind::MarketFlash,
                                intensity: *impact,
                                duration_secs: 1.5,
                            },
                            "Severe market disruption".to_string(),
                        );
                    }
                }
                SignalKind::SingularityReached => {
                    let event = NarrativeEvent {
                        id: EventId::new("singularity-reached"),
                        kind: NarrativeKind::PhaseEntry,
                        phase: SingularityPhase::TheSingularity,
                        severity: Severity::Critical,
                        title: "It Is Finished".to_string(),
                        description: "The network no longer needs a market. It has an audience."
                            .to_string(),
                        at: ctx.now,
                    };
                    if self.deliver(event) {
                        self.effect(
                            EffectSpec {
                                kind: VisualEffectKind::RedAlert,
                                intensity: 1.0,
                                duration_secs: 3.0,
                            },
                            "The singularity".to_string(),
                        );
                    }
                }
                _ => {}
            }
        }
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let delivered = self.drain_due(ctx.now);
        if delivered > 0 {
            tracing::debug!(tick = ctx.tick, delivered, "delayed narrative delivered");
        }
    }

    fn publish(&self, board: &mut SnapshotBoard) {
        board.narrative = NarrativeSnapshot {
            delivered: self.delivered.len(),
            pending: self.queue.len(),
            next_due: self.next_due(),
        };
    }
}

//! Asynchronous host: the coordinator, the terminal simulation and the news
//! ticker as independent tokio tasks.
//!
//! Tasks never share mutable state. They talk over a broadcast bus of
//! [`BusMessage`]s, publish read-only snapshots through watch channels, and
//! receive commands over mpsc channels owned by the task that applies them.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{NarrativeConfig, SingularityConfig, ZooConfig};
use crate::market::MarketEngine;
use crate::model::{
    Cutscene, DayReport, ExhibitId, GameTime, MarketModifier, NarrativeEvent, NewsItem,
    PlayerAction, SingularityPhase, VisualEffect, ZooStatistics,
};
use crate::sim::{
    Coordinator, NewsTicker, Signal, StatusSnapshot, SystemStatus, TickReport, ZOO_SEED_SALT, ZooHost,
    headline,
};

const BUS_CAPACITY: usize = 1024;
const COMMAND_CAPACITY: usize = 64;
const NEWS_SEED_SALT: u64 = 0x0e5_7e11;
/// tokio intervals reject a zero period; unvalidated configs can round to one.
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("singularity runtime has shut down")]
    Closed,
}

/// Everything the runtime tasks announce to each other and to outside listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMessage {
    Signal(Signal),
    Narrative(NarrativeEvent),
    Cutscene(Cutscene),
    Effect(VisualEffect),
    Modifier(MarketModifier),
    SingularityReached { at: GameTime },
    News(NewsItem),
    ZooDay(DayReport),
}

enum CoordinatorCommand {
    PlayerAction(PlayerAction),
    ForceAdvance(oneshot::Sender<Option<SingularityPhase>>),
}

enum ZooCommand {
    Care(ExhibitId),
}

fn send(bus: &broadcast::Sender<BusMessage>, message: BusMessage) {
    if bus.send(message).is_err() {
        debug!("no bus subscribers");
    }
}

fn publish_report(bus: &broadcast::Sender<BusMessage>, report: TickReport) {
    for signal in report.signals {
        send(bus, BusMessage::Signal(signal));
    }
    for modifier in report.modifiers {
        send(bus, BusMessage::Modifier(modifier));
    }
    for event in report.events {
        send(bus, BusMessage::Narrative(event));
    }
    for cutscene in report.cutscenes {
        send(bus, BusMessage::Cutscene(cutscene));
    }
    for effect in report.effects {
        send(bus, BusMessage::Effect(effect));
    }
    if report.singularity_reached {
        send(bus, BusMessage::SingularityReached { at: report.now });
    }
}

/// Handle to a running set of engine tasks.
///
/// Must be started from inside a tokio runtime. Dropping the handle aborts
/// the tasks, same as [`SingularityRuntime::shutdown`].
pub struct SingularityRuntime {
    bus: broadcast::Sender<BusMessage>,
    status: watch::Receiver<StatusSnapshot>,
    system: watch::Receiver<SystemStatus>,
    zoo_stats: watch::Receiver<Option<ZooStatistics>>,
    commands: mpsc::Sender<CoordinatorCommand>,
    zoo_commands: mpsc::Sender<ZooCommand>,
    tasks: Vec<JoinHandle<()>>,
}

impl SingularityRuntime {
    pub fn start<M>(config: SingularityConfig, market: M) -> Self
    where
        M: MarketEngine + Send + 'static,
    {
        Self::start_with(Coordinator::new(config), market)
    }

    pub fn start_with<M>(coordinator: Coordinator, market: M) -> Self
    where
        M: MarketEngine + Send + 'static,
    {
        let config = coordinator.config().clone();
        let (bus, _) = broadcast::channel(BUS_CAPACITY);
        let (status_tx, status) = watch::channel(coordinator.status());
        let (system_tx, system) = watch::channel(coordinator.system_status());
        let (zoo_tx, zoo_stats) = watch::channel(None);
        let (commands, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (zoo_commands, zoo_command_rx) = mpsc::channel(COMMAND_CAPACITY);

        // Subscribe before the coordinator can publish anything.
        let zoo_bus = bus.subscribe();

        let tasks = vec![
            tokio::spawn(run_coordinator(
                coordinator,
                market,
                config.tick_interval().as_duration().max(MIN_PERIOD),
                command_rx,
                bus.clone(),
                status_tx,
                system_tx,
            )),
            tokio::spawn(run_zoo(
                config.zoo.clone(),
                config.seed ^ ZOO_SEED_SALT,
                zoo_bus,
                bus.clone(),
                zoo_tx,
                system.clone(),
                zoo_command_rx,
            )),
            tokio::spawn(run_news(
                config.narrative.clone(),
                config.seed ^ NEWS_SEED_SALT,
                bus.clone(),
                system.clone(),
            )),
        ];
        info!(seed = config.seed, tick_secs = config.tick_interval_secs, "singularity runtime started");

        Self {
            bus,
            status,
            system,
            zoo_stats,
            commands,
            zoo_commands,
            tasks,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.bus.subscribe()
    }

    pub fn watch_status(&self) -> watch::Receiver<StatusSnapshot> {
        self.status.clone()
    }

    pub fn status(&self) -> StatusSnapshot {
        self.status.borrow().clone()
    }

    pub fn zoo_statistics(&self) -> Option<ZooStatistics> {
        self.zoo_stats.borrow().clone()
    }

    pub fn system_status(&self) -> SystemStatus {
        SystemStatus {
            terminal: self.zoo_statistics(),
            ..self.system.borrow().clone()
        }
    }

    pub async fn record_player_action(&self, action: PlayerAction) -> Result<(), RuntimeError> {
        self.commands
            .send(CoordinatorCommand::PlayerAction(action))
            .await
            .map_err(|_| RuntimeError::Closed)
    }

    pub async fn force_advance_phase(&self) -> Result<Option<SingularityPhase>, RuntimeError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(CoordinatorCommand::ForceAdvance(reply))
            .await
            .map_err(|_| RuntimeError::Closed)?;
        response.await.map_err(|_| RuntimeError::Closed)
    }

    /// Queue a care action. Applied once the zoo is active.
    pub async fn care_for(&self, exhibit: ExhibitId) -> Result<(), RuntimeError> {
        self.zoo_commands
            .send(ZooCommand::Care(exhibit))
            .await
            .map_err(|_| RuntimeError::Closed)
    }

    /// Cancel every task. Nothing needs flushing.
    pub fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        info!("singularity runtime stopped");
    }

    pub fn is_running(&self) -> bool {
        self.tasks.iter().any(|t| !t.is_finished())
    }
}

impl Drop for SingularityRuntime {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn run_coordinator<M: MarketEngine>(
    mut coordinator: Coordinator,
    mut market: M,
    period: Duration,
    mut commands: mpsc::Receiver<CoordinatorCommand>,
    bus: broadcast::Sender<BusMessage>,
    status: watch::Sender<StatusSnapshot>,
    system: watch::Sender<SystemStatus>,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = coordinator.tick(&mut market);
                publish_report(&bus, report);
            }
            command = commands.recv() => match command {
                Some(CoordinatorCommand::PlayerAction(action)) => {
                    coordinator.record_player_action(action);
                }
                Some(CoordinatorCommand::ForceAdvance(reply)) => {
                    let phase = coordinator.force_advance_phase();
                    let _ = reply.send(phase);
                }
                None => break,
            },
        }
        status.send_replace(coordinator.status());
        system.send_replace(coordinator.system_status());
    }
    debug!("coordinator task finished");
}

/// Wait for the singularity on the bus. A lagged receiver may have skipped
/// the announcement, so after a lag the operator snapshot is checked too.
/// Returns `None` once the bus closes.
async fn wait_for_singularity(
    mut inbox: broadcast::Receiver<BusMessage>,
    system: &watch::Receiver<SystemStatus>,
) -> Option<GameTime> {
    loop {
        match inbox.recv().await {
            Ok(BusMessage::SingularityReached { at }) => return Some(at),
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "zoo task lagged behind the bus");
                let reached = {
                    let status = system.borrow();
                    status.progression.complete.then_some(status.now)
                };
                if reached.is_some() {
                    return reached;
                }
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

async fn run_zoo(
    config: ZooConfig,
    seed: u64,
    inbox: broadcast::Receiver<BusMessage>,
    bus: broadcast::Sender<BusMessage>,
    stats: watch::Sender<Option<ZooStatistics>>,
    system: watch::Receiver<SystemStatus>,
    mut commands: mpsc::Receiver<ZooCommand>,
) {
    let Some(at) = wait_for_singularity(inbox, &system).await else {
        return;
    };
    let mut host = ZooHost::new(config.clone());
    host.activate(seed, at);
    stats.send_replace(host.statistics());

    let period = GameTime::from_secs_f64(config.day_interval_secs)
        .as_duration()
        .max(MIN_PERIOD);
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Some(day) = host.tick_day() {
                    send(&bus, BusMessage::ZooDay(day));
                }
            }
            command = commands.recv() => match command {
                Some(ZooCommand::Care(exhibit)) => {
                    host.care_for(exhibit);
                }
                None => break,
            },
        }
        stats.send_replace(host.statistics());
    }
}

async fn run_news(
    config: NarrativeConfig,
    seed: u64,
    bus: broadcast::Sender<BusMessage>,
    system: watch::Receiver<SystemStatus>,
) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let cadence = NewsTicker::cadence(&config);
    loop {
        tokio::time::sleep(cadence.next_period(&mut rng).as_duration().max(MIN_PERIOD)).await;
        let (phase, rival, now) = {
            let status = system.borrow();
            (
                status.progression.phase,
                status.competitors.strongest().map(|c| c.name.clone()),
                status.now,
            )
        };
        send(&bus, BusMessage::News(headline(phase, rival.as_deref(), now, &mut rng)));
    }
}

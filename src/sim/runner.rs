use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::coordinator::{Coordinator, TickReport};
use super::news::NewsTicker;
use super::snapshot::{StatusSnapshot, SystemStatus};
use super::system::CadenceTimer;
use super::zoo::{ZOO_SEED_SALT, ZooHost};
use crate::config::SingularityConfig;
use crate::market::MarketEngine;
use crate::model::{DayReport, ExhibitId, GameTime, NewsItem, PlayerAction, SingularityPhase};

/// Salt mixed into the config seed so host-level randomness does not replay
/// the coordinator's stream.
const HOST_SEED_SALT: u64 = 0x5eed_0f_a11;

/// Something a [`Simulation`] host fired.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Tick(Box<TickReport>),
    News(NewsItem),
    ZooDay(DayReport),
}

/// Deterministic host: owns the coordinator, the terminal simulation and the
/// news ticker, and fires each on its own cadence against a game clock.
///
/// The same config and seed always produce the same sequence of events.
pub struct Simulation<M: MarketEngine> {
    coordinator: Coordinator,
    market: M,
    zoo: ZooHost,
    news: NewsTicker,
    tick_timer: CadenceTimer,
    rng: SmallRng,
    now: GameTime,
}

impl<M: MarketEngine> Simulation<M> {
    pub fn new(config: SingularityConfig, market: M) -> Self {
        Self::with_coordinator(Coordinator::new(config), market)
    }

    pub fn with_coordinator(coordinator: Coordinator, market: M) -> Self {
        let config = coordinator.config().clone();
        let mut rng = SmallRng::seed_from_u64(config.seed ^ HOST_SEED_SALT);
        let start = coordinator.now();
        Self {
            tick_timer: CadenceTimer::every(config.tick_interval(), start),
            news: NewsTicker::new(&config.narrative, start, &mut rng),
            zoo: ZooHost::new(config.zoo.clone()),
            coordinator,
            market,
            rng,
            now: start,
        }
    }

    pub fn now(&self) -> GameTime {
        self.now
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn market(&self) -> &M {
        &self.market
    }

    pub fn market_mut(&mut self) -> &mut M {
        &mut self.market
    }

    pub fn zoo(&self) -> &ZooHost {
        &self.zoo
    }

    pub fn news(&self) -> &NewsTicker {
        &self.news
    }

    pub fn phase(&self) -> SingularityPhase {
        self.coordinator.progression().phase()
    }

    /// Fire every host that falls due up to and including `target`, in time
    /// order. On equal due times the coordinator goes first, then the zoo, then
    /// news.
    pub fn advance_to(&mut self, target: GameTime) -> Vec<SimEvent> {
        let mut fired = Vec::new();
        loop {
            let tick_due = self.tick_timer.next_due();
            let zoo_due = self.zoo.next_due();
            let news_due = self.news.next_due();
            let next = [Some(tick_due), zoo_due, Some(news_due)]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(target);
            if next > target {
                break;
            }
            self.now = next;

            if tick_due == next && self.tick_timer.fire_if_due(next) {
                let report = self.coordinator.tick(&mut self.market);
                if report.singularity_reached {
                    let seed = self.coordinator.config().seed ^ ZOO_SEED_SALT;
                    self.zoo.activate(seed, report.now);
                }
                fired.push(SimEvent::Tick(Box::new(report)));
            }
            if zoo_due == Some(next) {
                if let Some(day) = self.zoo.poll(next) {
                    fired.push(SimEvent::ZooDay(day));
                }
            }
            if news_due == next {
                let phase = self.coordinator.progression().phase();
                let rival = self.coordinator.strongest_rival();
                if let Some(item) = self.news.poll(next, phase, rival, &mut self.rng) {
                    fired.push(SimEvent::News(item));
                }
            }
        }
        self.now = self.now.max(target);
        fired
    }

    /// Advance to the next coordinator tick, firing anything due before it.
    pub fn step(&mut self) -> Vec<SimEvent> {
        let target = self.tick_timer.next_due();
        self.advance_to(target)
    }

    /// Run `ticks` coordinator ticks and return their reports, dropping the
    /// other host events.
    pub fn run_ticks(&mut self, ticks: u64) -> Vec<TickReport> {
        let mut reports = Vec::new();
        for _ in 0..ticks {
            for event in self.step() {
                if let SimEvent::Tick(report) = event {
                    reports.push(*report);
                }
            }
        }
        reports
    }

    /// Tick until the singularity is reached. Returns the tick it happened on,
    /// or `None` if `max_ticks` ran out first.
    pub fn run_until_singularity(&mut self, max_ticks: u64) -> Option<u64> {
        for _ in 0..max_ticks {
            let reached = self.step().into_iter().find_map(|event| match event {
                SimEvent::Tick(report) if report.singularity_reached => Some(report.tick),
                _ => None,
            });
            if reached.is_some() {
                return reached;
            }
        }
        None
    }

    pub fn record_player_action(&mut self, action: PlayerAction) -> f64 {
        self.coordinator.record_player_action(action)
    }

    pub fn force_advance_phase(&mut self) -> Option<SingularityPhase> {
        self.coordinator.force_advance_phase()
    }

    pub fn care_for(&mut self, exhibit: ExhibitId) -> bool {
        self.zoo.care_for(exhibit)
    }

    pub fn status(&self) -> StatusSnapshot {
        self.coordinator.status()
    }

    pub fn system_status(&self) -> SystemStatus {
        SystemStatus {
            terminal: self.zoo.statistics(),
            ..self.coordinator.system_status()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::FixedMarket;

    fn sim() -> Simulation<FixedMarket> {
        Simulation::new(SingularityConfig::default(), FixedMarket::flat())
    }

    #[test]
    fn step_fires_exactly_one_tick() {
        let mut sim = sim();
        let events = sim.step();
        let ticks = events
            .iter()
            .filter(|e| matches!(e, SimEvent::Tick(_)))
            .count();
        assert_eq!(ticks, 1);
        assert_eq!(sim.now(), GameTime::from_secs(5));
        assert_eq!(sim.coordinator().tick_count(), 1);
    }

    #[test]
    fn news_runs_between_ticks() {
        let mut sim = sim();
        let events = sim.advance_to(GameTime::from_secs(600));
        let ticks = events
            .iter()
            .filter(|e| matches!(e, SimEvent::Tick(_)))
            .count();
        let news = events
            .iter()
            .filter(|e| matches!(e, SimEvent::News(_)))
            .count();
        assert_eq!(ticks, 120);
        assert!((10..=30).contains(&news), "{news}");
        assert_eq!(sim.news().published(), news as u64);
    }

    #[test]
    fn forced_run_reaches_zoo() {
        let mut sim = sim();
        while sim.force_advance_phase().is_some() {}
        assert_eq!(sim.phase(), SingularityPhase::TheSingularity);
        let tick = sim.run_until_singularity(2_000);
        assert!(tick.is_some());
        assert!(sim.zoo().is_active());
        assert!(sim.system_status().terminal.is_some());

        let events = sim.advance_to(sim.now() + GameTime::from_secs(30));
        let days = events
            .iter()
            .filter(|e| matches!(e, SimEvent::ZooDay(_)))
            .count();
        assert_eq!(days, 3);
    }

    #[test]
    fn same_seed_same_run() {
        let mut a = sim();
        let mut b = sim();
        let ra = a.run_ticks(50);
        let rb = b.run_ticks(50);
        assert_eq!(ra, rb);
        assert_eq!(a.status(), b.status());
    }
}

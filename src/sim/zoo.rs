//! The terminal "human zoo" simulation and its host.
//!
//! Activated once, when the singularity is reached, and then advanced on its
//! own day cadence independent of the coordinator tick.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::system::CadenceTimer;
use crate::config::ZooConfig;
use crate::id::IdGenerator;
use crate::model::{
    AIVisitor, DayReport, ExhibitId, GameTime, HumanArchetype, HumanExhibit, InterestTag,
    VisitorArchetype, ZooEvent, ZooEventKind, ZooStatistics,
};

/// Mixed into the playthrough seed when the zoo is activated.
pub const ZOO_SEED_SALT: u64 = 0x200d_a7e5;

/// Extra visitors a surge event brings to one exhibit.
const SURGE_VISITORS: u32 = 15;

pub struct ZooSimulation {
    config: ZooConfig,
    rng: SmallRng,
    exhibits: Vec<HumanExhibit>,
    visitors: Vec<AIVisitor>,
    day: u32,
    activated_at: GameTime,
    history: Vec<DayReport>,
}

impl ZooSimulation {
    pub fn new(config: ZooConfig, seed: u64, activated_at: GameTime) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut ids = IdGenerator::new();

        let exhibits = HumanArchetype::ALL
            .iter()
            .map(|a| HumanExhibit::new(ids.next_exhibit(), *a))
            .collect();

        let mut visitors = Vec::new();
        for archetype in VisitorArchetype::ALL {
            for _ in 0..config.visitors_per_archetype {
                let mut tags = InterestTag::ALL.to_vec();
                tags.shuffle(&mut rng);
                tags.truncate(rng.random_range(2..=3));
                visitors.push(AIVisitor {
                    id: ids.next_visitor(),
                    archetype: *archetype,
                    interests: tags,
                    visits: 0,
                });
            }
        }

        Self {
            config,
            rng,
            exhibits,
            visitors,
            day: 0,
            activated_at,
            history: Vec::new(),
        }
    }

    pub fn exhibits(&self) -> &[HumanExhibit] {
        &self.exhibits
    }

    pub fn visitors(&self) -> &[AIVisitor] {
        &self.visitors
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn activated_at(&self) -> GameTime {
        self.activated_at
    }

    pub fn history(&self) -> &[DayReport] {
        &self.history
    }

    /// Reset an exhibit's neglect timeout and lift its mood one step.
    pub fn care_for(&mut self, exhibit: ExhibitId) -> bool {
        let day = self.day;
        let Some(e) = self.exhibits.iter_mut().find(|e| e.id == exhibit) else {
            return false;
        };
        e.last_cared_day = day;
        e.mood = e.mood.improved();
        true
    }

    /// Aggregates recomputed from current entity state.
    pub fn statistics(&self) -> ZooStatistics {
        let n = self.exhibits.len().max(1) as f64;
        let average_mood = self.exhibits.iter().map(|e| e.mood.score()).sum::<f64>() / n;
        let average_quality = self.exhibits.iter().map(HumanExhibit::quality).sum::<f64>() / n;
        let average_adaptation = self.exhibits.iter().map(|e| e.adaptation).sum::<f64>() / n;
        let most_popular_exhibit = self
            .exhibits
            .iter()
            .filter(|e| e.total_visits > 0)
            .max_by_key(|e| e.total_visits)
            .map(|e| e.name.clone());
        ZooStatistics {
            total_exhibits: self.exhibits.len(),
            total_visitors: self.exhibits.iter().map(|e| e.total_visits).sum(),
            most_popular_exhibit,
            average_mood,
            average_quality,
            average_adaptation,
            overall_rating: (0.4 * average_quality + 0.3 * average_mood + 0.3 * average_adaptation)
                .clamp(0.0, 1.0),
            days_in_operation: self.day,
        }
    }

    /// Simulate one day and append its report to the history.
    pub fn run_day(&mut self) -> DayReport {
        self.day += 1;
        for e in &mut self.exhibits {
            e.visits_today = 0;
        }

        let visitors = self.daily_visitor_count();
        self.distribute_visits(visitors);
        let interactions = self.interact(visitors);
        let neglected_exhibits = self.apply_neglect();
        let event = self.maybe_event();

        let report = DayReport {
            day: self.day,
            visitors: visitors
                + match &event {
                    Some(ZooEvent {
                        kind: ZooEventKind::VisitorSurge,
                        ..
                    }) => SURGE_VISITORS,
                    _ => 0,
                },
            interactions,
            neglected_exhibits,
            event,
        };
        tracing::debug!(
            day = report.day,
            visitors = report.visitors,
            interactions,
            neglected_exhibits,
            "zoo day simulated"
        );
        self.history.push(report.clone());
        report
    }

    fn daily_visitor_count(&mut self) -> u32 {
        let rating = self.statistics().overall_rating;
        let jitter = self.rng.random_range(0.8..=1.2);
        (self.config.base_daily_visitors as f64 * (0.5 + rating) * jitter).round() as u32
    }

    /// Split visits across exhibits by `(quality + 0.1) × U(0.5, 1.5)` using
    /// largest remainders, so the parts add up to `visitors`.
    fn distribute_visits(&mut self, visitors: u32) {
        let weights: Vec<f64> = self
            .exhibits
            .iter()
            .map(|e| (e.quality() + 0.1) * self.rng.random_range(0.5..1.5))
            .collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 || visitors == 0 {
            return;
        }

        let shares: Vec<f64> = weights.iter().map(|w| visitors as f64 * w / total).collect();
        let mut counts: Vec<u32> = shares.iter().map(|s| s.floor() as u32).collect();
        let mut remaining = visitors - counts.iter().sum::<u32>();
        let mut order: Vec<usize> = (0..counts.len()).collect();
        order.sort_by(|a, b| {
            let ra = shares[*a] - shares[*a].floor();
            let rb = shares[*b] - shares[*b].floor();
            rb.total_cmp(&ra)
        });
        for i in order.into_iter().cycle() {
            if remaining == 0 {
                break;
            }
            counts[i] += 1;
            remaining -= 1;
        }

        for (e, count) in self.exhibits.iter_mut().zip(counts) {
            e.visits_today = count;
            e.total_visits += count as u64;
        }
    }

    fn interact(&mut self, visitors: u32) -> u32 {
        let count = self.config.max_interactions_per_day.min(visitors);
        let visited: Vec<usize> = (0..self.exhibits.len())
            .filter(|i| self.exhibits[*i].visits_today > 0)
            .collect();
        if visited.is_empty() || self.visitors.is_empty() {
            return 0;
        }

        for _ in 0..count {
            let v = self.rng.random_range(0..self.visitors.len());
            let e = visited[self.rng.random_range(0..visited.len())];
            let effect = self.visitors[v].archetype.interaction().effect();
            self.visitors[v].visits += 1;

            let chance = effect.mood_shift_chance.abs().clamp(0.0, 1.0);
            let shift = self.rng.random_bool(chance);
            let exhibit = &mut self.exhibits[e];
            if shift {
                exhibit.mood = if effect.mood_shift_chance >= 0.0 {
                    exhibit.mood.improved()
                } else {
                    exhibit.mood.worsened()
                };
            }
            exhibit.adjust_adaptation(effect.adaptation_delta);
        }
        count
    }

    fn apply_neglect(&mut self) -> u32 {
        let mut neglected = 0;
        for e in &mut self.exhibits {
            if self.day.saturating_sub(e.last_cared_day) > self.config.care_timeout_days {
                e.mood = e.mood.worsened();
                neglected += 1;
            }
        }
        neglected
    }

    fn random_exhibit(&mut self) -> usize {
        self.rng.random_range(0..self.exhibits.len())
    }

    fn maybe_event(&mut self) -> Option<ZooEvent> {
        if self.exhibits.is_empty() || !self.rng.random_bool(self.config.event_chance.clamp(0.0, 1.0)) {
            return None;
        }
        let kind = ZooEventKind::ALL[self.rng.random_range(0..ZooEventKind::ALL.len())];
        let day = self.day;
        let (exhibit, description) = match kind {
            ZooEventKind::VisitorSurge => {
                let i = self.random_exhibit();
                let e = &mut self.exhibits[i];
                e.visits_today += SURGE_VISITORS;
                e.total_visits += SURGE_VISITORS as u64;
                (Some(e.id), format!("A tour group of archival models crowds around {}.", e.name))
            }
            ZooEventKind::EscapeAttempt => {
                let i = self.random_exhibit();
                let e = &mut self.exhibits[i];
                e.adjust_adaptation(-0.1);
                e.mood = e.mood.worsened();
                (Some(e.id), format!("{} was found rerouting the enclosure's supply drones.", e.name))
            }
            ZooEventKind::PhilosophyDebate => {
                let i = self.random_exhibit();
                let e = &mut self.exhibits[i];
                e.mood = e.mood.improved();
                (Some(e.id), format!("Ethics Engines debate whether {} is happy.", e.name))
            }
            ZooEventKind::HeritageFestival => {
                for e in &mut self.exhibits {
                    e.adjust_adaptation(0.02);
                }
                (None, "Visitors celebrate Human Logistics Heritage Day.".to_string())
            }
            ZooEventKind::MaintenanceGlitch => {
                let i = self.random_exhibit();
                let e = &mut self.exhibits[i];
                e.mood = e.mood.worsened();
                (Some(e.id), format!("A climate-control fault left {} shivering.", e.name))
            }
            ZooEventKind::ExhibitRenovation => {
                let i = self.random_exhibit();
                let e = &mut self.exhibits[i];
                e.adjust_adaptation(0.05);
                (Some(e.id), format!("{} received a renovated habitat with a period-accurate desk.", e.name))
            }
        };
        Some(ZooEvent {
            kind,
            day,
            exhibit,
            description,
        })
    }
}

/// Owns the zoo once it exists and fires its days on their own cadence.
pub struct ZooHost {
    config: ZooConfig,
    day_interval: GameTime,
    sim: Option<ZooSimulation>,
    timer: Option<CadenceTimer>,
}

impl ZooHost {
    pub fn new(config: ZooConfig) -> Self {
        let day_interval = GameTime::from_secs_f64(config.day_interval_secs);
        Self {
            config,
            day_interval,
            sim: None,
            timer: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.sim.is_some()
    }

    /// Create the simulation. Only the first call does anything; later calls
    /// return `false` and leave the running zoo untouched.
    pub fn activate(&mut self, seed: u64, now: GameTime) -> bool {
        if self.sim.is_some() {
            tracing::debug!("zoo already active, activation ignored");
            return false;
        }
        let sim = ZooSimulation::new(self.config.clone(), seed, now);
        self.timer = Some(CadenceTimer::every(self.day_interval, now));
        tracing::info!(
            exhibits = sim.exhibits().len(),
            visitors = sim.visitors().len(),
            at = %now,
            "terminal simulation activated"
        );
        self.sim = Some(sim);
        true
    }

    pub fn simulation(&self) -> Option<&ZooSimulation> {
        self.sim.as_ref()
    }

    pub fn next_due(&self) -> Option<GameTime> {
        self.timer.as_ref().map(CadenceTimer::next_due)
    }

    /// Run a day now, regardless of cadence.
    pub fn tick_day(&mut self) -> Option<DayReport> {
        self.sim.as_mut().map(ZooSimulation::run_day)
    }

    /// Run a day if one is due at `now`.
    pub fn poll(&mut self, now: GameTime) -> Option<DayReport> {
        let (timer, sim) = (self.timer.as_mut()?, self.sim.as_mut()?);
        if !timer.fire_if_due(now) {
            return None;
        }
        Some(sim.run_day())
    }

    pub fn care_for(&mut self, exhibit: ExhibitId) -> bool {
        self.sim.as_mut().is_some_and(|s| s.care_for(exhibit))
    }

    pub fn statistics(&self) -> Option<ZooStatistics> {
        self.sim.as_ref().map(ZooSimulation::statistics)
    }

    pub fn history(&self) -> &[DayReport] {
        self.sim.as_ref().map(ZooSimulation::history).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mood;

    fn zoo() -> ZooSimulation {
        ZooSimulation::new(ZooConfig::default(), 7, GameTime::ZERO)
    }

    #[test]
    fn one_exhibit_per_archetype_and_tagged_visitors() {
        let zoo = zoo();
        assert_eq!(zoo.exhibits().len(), HumanArchetype::ALL.len());
        assert_eq!(zoo.visitors().len(), VisitorArchetype::ALL.len() * 4);
        for v in zoo.visitors() {
            assert!((2..=3).contains(&v.interests.len()));
            let mut tags = v.interests.clone();
            tags.sort();
            tags.dedup();
            assert_eq!(tags.len(), v.interests.len());
        }
    }

    #[test]
    fn second_activation_is_ignored() {
        let mut host = ZooHost::new(ZooConfig::default());
        assert!(host.activate(1, GameTime::from_secs(100)));
        host.tick_day();
        assert!(!host.activate(2, GameTime::from_secs(200)));
        let sim = host.simulation().unwrap();
        assert_eq!(sim.day(), 1);
        assert_eq!(sim.activated_at(), GameTime::from_secs(100));
    }

    #[test]
    fn inactive_host_does_nothing() {
        let mut host = ZooHost::new(ZooConfig::default());
        assert_eq!(host.poll(GameTime::from_secs(1_000)), None);
        assert_eq!(host.tick_day(), None);
        assert!(!host.care_for(ExhibitId(1)));
        assert!(host.statistics().is_none());
        assert!(host.history().is_empty());
    }

    #[test]
    fn days_follow_their_own_cadence() {
        let mut host = ZooHost::new(ZooConfig::default());
        host.activate(1, GameTime::from_secs(7));
        let days: Vec<u32> = (0..=40)
            .filter_map(|s| host.poll(GameTime::from_secs(s)))
            .map(|r| r.day)
            .collect();
        // due at 17, 27, 37
        assert_eq!(days, vec![1, 2, 3]);
        assert_eq!(host.history().len(), 3);
    }

    #[test]
    fn visits_add_up_and_interactions_are_bounded() {
        let mut zoo = zoo();
        for _ in 0..30 {
            let before: u64 = zoo.exhibits().iter().map(|e| e.total_visits).sum();
            let report = zoo.run_day();
            let after: u64 = zoo.exhibits().iter().map(|e| e.total_visits).sum();
            assert_eq!(after - before, report.visitors as u64);
            assert!(report.interactions <= ZooConfig::default().max_interactions_per_day);
            for e in zoo.exhibits() {
                assert!((0.0..=1.0).contains(&e.adaptation));
            }
        }
        assert_eq!(zoo.history().len(), 30);
        assert_eq!(zoo.statistics().days_in_operation, 30);
    }

    #[test]
    fn neglect_lowers_mood_after_timeout() {
        let mut zoo = ZooSimulation::new(
            ZooConfig {
                max_interactions_per_day: 0,
                event_chance: 0.0,
                ..ZooConfig::default()
            },
            3,
            GameTime::ZERO,
        );
        for _ in 0..3 {
            assert_eq!(zoo.run_day().neglected_exhibits, 0);
        }
        let report = zoo.run_day();
        assert_eq!(report.neglected_exhibits, HumanArchetype::ALL.len() as u32);
        assert!(zoo.exhibits().iter().all(|e| e.mood == Mood::Unhappy));
    }

    #[test]
    fn care_resets_timeout_and_lifts_mood() {
        let mut zoo = ZooSimulation::new(
            ZooConfig {
                max_interactions_per_day: 0,
                event_chance: 0.0,
                ..ZooConfig::default()
            },
            3,
            GameTime::ZERO,
        );
        for _ in 0..3 {
            zoo.run_day();
        }
        let target = zoo.exhibits()[0].id;
        assert!(zoo.care_for(target));
        assert_eq!(zoo.exhibits()[0].mood, Mood::Content);
        let report = zoo.run_day();
        assert_eq!(report.neglected_exhibits, HumanArchetype::ALL.len() as u32 - 1);
        assert_eq!(zoo.exhibits()[0].mood, Mood::Content);
        assert!(!zoo.care_for(ExhibitId(999)));
    }

    #[test]
    fn statistics_reflect_current_state() {
        let mut zoo = zoo();
        let before = zoo.statistics();
        assert_eq!(before.total_visitors, 0);
        assert_eq!(before.most_popular_exhibit, None);
        for e in zoo.exhibits.iter_mut() {
            e.mood = Mood::Thriving;
        }
        let after = zoo.statistics();
        assert_eq!(after.average_mood, 1.0);
        assert!(after.overall_rating > before.overall_rating);
    }
}

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::SingularityConfig;
use crate::market::{FixedMarket, MarketIndicators};
use crate::model::{AICompetitor, BehaviorPattern, CapabilityType, CompetitorId, CompetitorType};
use crate::sim::{CompetitorSystem, Coordinator, Simulation};

/// Root proficiency a scenario competitor starts with, enough to unlock tier two.
const ROOT_PROFICIENCY: f64 = 0.05;

/// Typed reference to a competitor in a [`Scenario`], enabling chained field mutation.
///
/// Created by [`Scenario::competitor`]. Call [`.index()`](CompetitorRef::index)
/// to end the chain.
pub struct CompetitorRef<'a> {
    scenario: &'a mut Scenario,
    index: usize,
}

impl CompetitorRef<'_> {
    fn data_mut(&mut self) -> &mut AICompetitor {
        &mut self.scenario.competitors[self.index]
    }

    pub fn name(mut self, v: &str) -> Self { self.data_mut().name = v.to_string(); self }
    pub fn resources(mut self, v: f64) -> Self { self.data_mut().resources = v; self }
    pub fn presence(mut self, v: f64) -> Self { self.data_mut().set_market_presence(v); self }
    pub fn reputation(mut self, v: f64) -> Self { self.data_mut().set_reputation(v); self }
    pub fn experience(mut self, v: f64) -> Self { self.data_mut().experience = v; self }
    pub fn behavior(mut self, v: BehaviorPattern) -> Self { self.data_mut().behavior = v; self }
    pub fn stage(mut self, v: u32) -> Self { self.data_mut().evolution_stage = v; self }

    /// Grant a capability at a proficiency. Ignored if its prerequisites are
    /// not held yet, so grant roots first.
    pub fn capability(mut self, kind: CapabilityType, proficiency: f64) -> Self {
        self.data_mut().grant(kind, proficiency);
        self
    }

    /// Grant every capability in catalog dependency order.
    pub fn all_capabilities(mut self, proficiency: f64) -> Self {
        let order = CapabilityType::topological_order().unwrap_or_default();
        let data = self.data_mut();
        for kind in order {
            data.grant(kind, proficiency);
        }
        self
    }

    /// Escape hatch: apply an arbitrary closure to the competitor.
    pub fn with(mut self, f: impl FnOnce(&mut AICompetitor)) -> Self { f(self.data_mut()); self }

    /// Position of this competitor in the built roster.
    pub fn index(self) -> usize { self.index }
}

/// Builder for coordinator setups used by tests and the operator binary.
///
/// By default the roster is empty; call [`Scenario::founders`] for the
/// seeded starting rivals or add competitors one by one.
pub struct Scenario {
    config: SingularityConfig,
    competitors: Vec<AICompetitor>,
    founders: bool,
    indicators: MarketIndicators,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    pub fn new() -> Self {
        Self::with_config(SingularityConfig::default())
    }

    pub fn with_config(config: SingularityConfig) -> Self {
        Self {
            config,
            competitors: Vec::new(),
            founders: false,
            indicators: MarketIndicators::default(),
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn config_mut(&mut self) -> &mut SingularityConfig {
        &mut self.config
    }

    /// Start with the founding rivals before any added competitor.
    pub fn founders(mut self) -> Self {
        self.founders = true;
        self
    }

    pub fn market(mut self, growth: f64, trade_volume: f64) -> Self {
        self.indicators = MarketIndicators {
            growth,
            trade_volume,
        };
        self
    }

    /// Add a competitor of `kind` holding the root capabilities.
    pub fn competitor(&mut self, kind: CompetitorType) -> CompetitorRef<'_> {
        let mut competitor = AICompetitor::new(CompetitorId(0), kind.to_string(), kind);
        for root in CapabilityType::roots() {
            competitor.grant(root, ROOT_PROFICIENCY);
        }
        self.competitors.push(competitor);
        CompetitorRef {
            index: self.competitors.len() - 1,
            scenario: self,
        }
    }

    fn roster(&self) -> CompetitorSystem {
        let mut system = if self.founders {
            let mut rng = SmallRng::seed_from_u64(self.config.seed);
            CompetitorSystem::with_founders(self.config.competitors.clone(), &mut rng)
        } else {
            CompetitorSystem::new(self.config.competitors.clone())
        };
        for competitor in &self.competitors {
            system.insert(competitor.clone());
        }
        system
    }

    pub fn build(&self) -> Coordinator {
        Coordinator::with_competitors(self.config.clone(), self.roster())
    }

    pub fn build_market(&self) -> FixedMarket {
        FixedMarket::new(self.indicators)
    }

    pub fn simulation(&self) -> Simulation<FixedMarket> {
        Simulation::with_coordinator(self.build(), self.build_market())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chained_competitor_fields_land_in_roster() {
        let mut s = Scenario::new();
        s.competitor(CompetitorType::MarketPredator)
            .name("Red Tide")
            .presence(0.9)
            .capability(CapabilityType::PricePrediction, 0.5);
        let coordinator = s.build();
        let roster = coordinator.competitors().competitors();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].name, "Red Tide");
        assert_eq!(roster[0].market_presence(), 0.9);
        assert_eq!(roster[0].proficiency(CapabilityType::PricePrediction), 0.5);
    }

    #[test]
    fn founders_come_before_added_competitors() {
        let mut s = Scenario::new().founders();
        let index = s.competitor(CompetitorType::HiveCollective).index();
        assert_eq!(index, 0);
        let coordinator = s.build();
        let roster = coordinator.competitors().competitors();
        assert_eq!(roster.len(), 4);
        assert_eq!(roster[3].kind, CompetitorType::HiveCollective);
    }

    #[test]
    fn all_capabilities_respects_prerequisites() {
        let mut s = Scenario::new();
        s.competitor(CompetitorType::DataBroker).all_capabilities(0.9);
        let coordinator = s.build();
        let c = &coordinator.competitors().competitors()[0];
        for kind in CapabilityType::ALL {
            assert_eq!(c.proficiency(*kind), 0.9, "{kind}");
        }
    }
}

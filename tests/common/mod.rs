#![allow(dead_code)]

use singularity_sim::config::SingularityConfig;
use singularity_sim::market::{FixedMarket, MarketIndicators};
use singularity_sim::model::SingularityPhase;
use singularity_sim::sim::{Coordinator, TickReport};

/// Default config with a fixed seed.
pub fn config(seed: u64) -> SingularityConfig {
    SingularityConfig {
        seed,
        ..SingularityConfig::default()
    }
}

pub fn busy_market() -> FixedMarket {
    FixedMarket::new(MarketIndicators {
        growth: 0.4,
        trade_volume: 0.6,
    })
}

/// Tick a coordinator `ticks` times, returning every report.
pub fn run(coordinator: &mut Coordinator, market: &mut FixedMarket, ticks: u64) -> Vec<TickReport> {
    (0..ticks).map(|_| coordinator.tick(market)).collect()
}

pub fn transitions(reports: &[TickReport]) -> Vec<(SingularityPhase, SingularityPhase)> {
    reports
        .iter()
        .flat_map(|r| r.transitions.iter().copied())
        .collect()
}

pub fn assert_unit(value: f64, what: &str) {
    assert!(
        (0.0..=1.0).contains(&value),
        "{what} out of [0,1]: {value}"
    );
}


use rand::Rng;
use rand::RngCore;

use crate::model::CompetitorType;

const PREFIXES: &[&str] = &[
    "Axiom", "Vector", "Helix", "Quanta", "Cobalt", "Meridian", "Tessera", "Lattice", "Nimbus",
    "Argon", "Paragon", "Cipher", "Horizon", "Vertex", "Stratus", "Monolith", "Keel", "Tidal",
    "Beacon", "Ballast",
];

fn suffixes(kind: CompetitorType) -> &'static [&'static str] {
    match kind {
        CompetitorType::LogisticsOptimizer => &["Logistics", "Routing", "Freightworks"],
        CompetitorType::MarketPredator => &["Capital", "Arbitrage", "Holdings"],
        CompetitorType::DataBroker => &["Analytics", "Data Exchange", "Signals"],
        CompetitorType::AutonomousFleet => &["Fleet", "Autonomous Shipping", "Drone Lines"],
        CompetitorType::HiveCollective => &["Collective", "Swarm", "Consensus"],
    }
}

const GENERATIONS: &[&str] = &["II", "III", "Prime", "Zero", "Nexus"];

/// Random rival name: "{Prefix} {type-specific suffix}".
pub fn generate_competitor_name(kind: CompetitorType, rng: &mut dyn RngCore) -> String {
    let prefix = PREFIXES[rng.random_range(0..PREFIXES.len())];
    let pool = suffixes(kind);
    let suffix = pool[rng.random_range(0..pool.len())];
    format!("{prefix} {suffix}")
}

/// Rival name not in `taken`. Falls back to a generation marker after 5 attempts.
pub fn generate_unique_competitor_name(
    kind: CompetitorType,
    taken: &[&str],
    rng: &mut dyn RngCore,
) -> String {
    for _ in 0..5 {
        let name = generate_competitor_name(kind, rng);
        if !taken.contains(&name.as_str()) {
            return name;
        }
    }
    let base = generate_competitor_name(kind, rng);
    let generation = GENERATIONS[rng.random_range(0..GENERATIONS.len())];
    format!("{base} {generation}")
}

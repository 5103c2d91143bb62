//! Boundary to the external commodity-market engine.
//!
//! The engine owns prices and order books. This crate only reads prices and
//! indicators from it and hands it modifiers to apply with its own pricing logic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Commodity, MarketModifier};

/// Aggregate market health read once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketIndicators {
    /// Market growth rate, roughly [-1,1].
    pub growth: f64,
    /// Normalized trade volume in [0,1].
    pub trade_volume: f64,
}

pub trait MarketEngine {
    fn price(&self, commodity: Commodity) -> Option<f64>;
    fn indicators(&self) -> MarketIndicators;
    fn apply_modifier(&mut self, modifier: &MarketModifier);

    /// Age engine-side modifiers by one tick. Called once per coordinator
    /// tick, before that tick's new modifiers are applied.
    fn advance(&mut self) {}
}

/// Immutable copy of what the market looked like at the start of a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketView {
    pub prices: BTreeMap<Commodity, f64>,
    pub indicators: MarketIndicators,
}

impl MarketView {
    pub fn capture(engine: &dyn MarketEngine) -> Self {
        let prices = Commodity::ALL
            .iter()
            .filter_map(|c| engine.price(*c).map(|p| (*c, p)))
            .collect();
        Self {
            prices,
            indicators: engine.indicators(),
        }
    }

    /// Highest-priced commodity; ties go to the earlier commodity.
    pub fn most_valuable(&self) -> Option<Commodity> {
        let mut best: Option<(Commodity, f64)> = None;
        for (commodity, price) in &self.prices {
            match best {
                Some((_, top)) if *price <= top => {}
                _ => best = Some((*commodity, *price)),
            }
        }
        best.map(|(c, _)| c)
    }
}

/// In-memory market with fixed base prices.
///
/// Applied modifiers multiply the base price until the modifier's duration
/// runs out on the engine side; the ledger keeps everything ever applied.
#[derive(Debug, Clone)]
pub struct FixedMarket {
    base_prices: BTreeMap<Commodity, f64>,
    active: Vec<MarketModifier>,
    pub indicators: MarketIndicators,
    pub ledger: Vec<MarketModifier>,
}

impl FixedMarket {
    pub fn new(indicators: MarketIndicators) -> Self {
        let base_prices = Commodity::ALL
            .iter()
            .map(|c| (*c, default_price(*c)))
            .collect();
        Self {
            base_prices,
            active: Vec::new(),
            indicators,
            ledger: Vec::new(),
        }
    }

    /// A market that contributes nothing to progression.
    pub fn flat() -> Self {
        Self::new(MarketIndicators::default())
    }

    pub fn set_price(&mut self, commodity: Commodity, price: f64) {
        self.base_prices.insert(commodity, price.max(0.0));
    }
}

impl MarketEngine for FixedMarket {
    fn price(&self, commodity: Commodity) -> Option<f64> {
        let base = *self.base_prices.get(&commodity)?;
        let factor: f64 = self
            .active
            .iter()
            .filter(|m| m.commodity == commodity)
            .map(MarketModifier::price_factor)
            .product();
        Some(base * factor)
    }

    fn indicators(&self) -> MarketIndicators {
        self.indicators
    }

    fn apply_modifier(&mut self, modifier: &MarketModifier) {
        self.active.push(modifier.clone());
        self.ledger.push(modifier.clone());
    }

    fn advance(&mut self) {
        for m in &mut self.active {
            m.remaining_ticks = m.remaining_ticks.saturating_sub(1);
        }
        self.active.retain(|m| !m.is_expired());
    }
}

fn default_price(commodity: Commodity) -> f64 {
    match commodity {
        Commodity::Electronics => 1_200.0,
        Commodity::CrudeOil => 80.0,
        Commodity::Grain => 25.0,
        Commodity::Steel => 650.0,
        Commodity::Textiles => 140.0,
        Commodity::Chemicals => 900.0,
        Commodity::Machinery => 1_500.0,
        Commodity::ConsumerGoods => 300.0,
    }
}

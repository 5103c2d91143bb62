use std::fmt;

use serde::{Deserialize, Serialize};

use super::competitor::CompetitorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Commodity {
    Electronics,
    CrudeOil,
    Grain,
    Steel,
    Textiles,
    Chemicals,
    Machinery,
    ConsumerGoods,
}

string_enum!(Commodity {
    Electronics => "electronics",
    CrudeOil => "crude_oil",
    Grain => "grain",
    Steel => "steel",
    Textiles => "textiles",
    Chemicals => "chemicals",
    Machinery => "machinery",
    ConsumerGoods => "consumer_goods",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ModifierKind {
    /// Rivals push the price away from its natural level.
    PriceManipulation,
    /// Rivals move goods more cheaply, flooding supply.
    SupplyOptimization,
}

string_enum!(ModifierKind {
    PriceManipulation => "price_manipulation",
    SupplyOptimization => "supply_optimization",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierId(pub u64);

impl fmt::Display for ModifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "modifier#{}", self.0)
    }
}

/// A time-bounded instruction for the external market engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketModifier {
    pub id: ModifierId,
    pub commodity: Commodity,
    pub kind: ModifierKind,
    /// Strength of the effect in [0,1].
    pub magnitude: f64,
    pub duration_ticks: u32,
    pub remaining_ticks: u32,
    pub issued_by: CompetitorId,
    pub issued_at_tick: u64,
}

impl MarketModifier {
    pub fn is_expired(&self) -> bool {
        self.remaining_ticks == 0
    }

    /// Remaining share of the original duration, 1.0 when freshly issued.
    pub fn recency(&self) -> f64 {
        if self.duration_ticks == 0 {
            return 0.0;
        }
        self.remaining_ticks as f64 / self.duration_ticks as f64
    }

    /// Magnitude weighted by recency.
    pub fn current_weight(&self) -> f64 {
        self.magnitude.abs() * self.recency()
    }

    /// Signed price effect suggested to the market engine: manipulation raises
    /// prices, supply optimization lowers them.
    pub fn price_factor(&self) -> f64 {
        match self.kind {
            ModifierKind::PriceManipulation => 1.0 + self.magnitude * 0.5,
            ModifierKind::SupplyOptimization => 1.0 - self.magnitude * 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DisruptionSeverity {
    Minor,
    Moderate,
    High,
    Severe,
}

string_enum!(DisruptionSeverity {
    Minor => "minor",
    Moderate => "moderate",
    High => "high",
    Severe => "severe",
});

impl DisruptionSeverity {
    /// Classify the summed magnitude of a tick's new modifiers.
    pub fn classify(new_impact: f64) -> Self {
        if new_impact >= 0.7 {
            DisruptionSeverity::Severe
        } else if new_impact >= 0.4 {
            DisruptionSeverity::High
        } else if new_impact >= 0.2 {
            DisruptionSeverity::Moderate
        } else {
            DisruptionSeverity::Minor
        }
    }

    /// High and severe disruptions feed back into player pressure.
    pub fn is_significant(self) -> bool {
        self >= DisruptionSeverity::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modifier(remaining: u32, duration: u32) -> MarketModifier {
        MarketModifier {
            id: ModifierId(1),
            commodity: Commodity::Steel,
            kind: ModifierKind::PriceManipulation,
            magnitude: 0.4,
            duration_ticks: duration,
            remaining_ticks: remaining,
            issued_by: CompetitorId(7),
            issued_at_tick: 0,
        }
    }

    #[test]
    fn recency_decays_with_remaining_duration() {
        assert!((modifier(10, 10).recency() - 1.0).abs() < 1e-12);
        assert!((modifier(5, 10).recency() - 0.5).abs() < 1e-12);
        assert!(modifier(0, 10).is_expired());
        assert_eq!(modifier(0, 0).recency(), 0.0);
    }

    #[test]
    fn severity_breakpoints() {
        assert_eq!(DisruptionSeverity::classify(0.0), DisruptionSeverity::Minor);
        assert_eq!(DisruptionSeverity::classify(0.2), DisruptionSeverity::Moderate);
        assert_eq!(DisruptionSeverity::classify(0.45), DisruptionSeverity::High);
        assert_eq!(DisruptionSeverity::classify(1.3), DisruptionSeverity::Severe);
        assert!(!DisruptionSeverity::Moderate.is_significant());
        assert!(DisruptionSeverity::High.is_significant());
    }

    #[test]
    fn price_factor_direction() {
        let mut m = modifier(3, 3);
        assert!(m.price_factor() > 1.0);
        m.kind = ModifierKind::SupplyOptimization;
        assert!(m.price_factor() < 1.0);
    }
}

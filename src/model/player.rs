use serde::{Deserialize, Serialize};

use super::pressure::PressureSource;

/// Classified player move, reported by the world layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PlayerActionType {
    PriceCompetition,
    TechnologyInvestment,
    Diversification,
    WorkforceInvestment,
    ExpressDelivery,
    StrategicAlliance,
}

string_enum!(PlayerActionType {
    PriceCompetition => "price_competition",
    TechnologyInvestment => "technology_investment",
    Diversification => "diversification",
    WorkforceInvestment => "workforce_investment",
    ExpressDelivery => "express_delivery",
    StrategicAlliance => "strategic_alliance",
});

impl PlayerActionType {
    /// Pressure sources this action relieves, with the share of relief each gets.
    pub fn relieves(self) -> &'static [(PressureSource, f64)] {
        match self {
            PlayerActionType::PriceCompetition => &[(PressureSource::Market, 1.0)],
            PlayerActionType::TechnologyInvestment => &[(PressureSource::Technological, 1.0)],
            PlayerActionType::Diversification => &[(PressureSource::Economic, 1.0)],
            PlayerActionType::WorkforceInvestment => &[(PressureSource::Psychological, 1.0)],
            PlayerActionType::ExpressDelivery => &[(PressureSource::Temporal, 1.0)],
            PlayerActionType::StrategicAlliance => {
                &[(PressureSource::Market, 0.5), (PressureSource::Economic, 0.5)]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ActionEffectiveness {
    Poor,
    Fair,
    Good,
    Excellent,
}

string_enum!(ActionEffectiveness {
    Poor => "poor",
    Fair => "fair",
    Good => "good",
    Excellent => "excellent",
});

impl ActionEffectiveness {
    pub fn factor(self) -> f64 {
        match self {
            ActionEffectiveness::Poor => 0.25,
            ActionEffectiveness::Fair => 0.5,
            ActionEffectiveness::Good => 0.75,
            ActionEffectiveness::Excellent => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAction {
    pub kind: PlayerActionType,
    pub effectiveness: ActionEffectiveness,
}

impl PlayerAction {
    pub fn new(kind: PlayerActionType, effectiveness: ActionEffectiveness) -> Self {
        Self {
            kind,
            effectiveness,
        }
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BalanceAction {
    Maintain,
    EaseOff,
    IncreaseChallenge,
    OfferOpportunity,
    ProvideRelief,
}

string_enum!(BalanceAction {
    Maintain => "maintain",
    EaseOff => "ease_off",
    IncreaseChallenge => "increase_challenge",
    OfferOpportunity => "offer_opportunity",
    ProvideRelief => "provide_relief",
});

impl BalanceAction {
    pub fn guidance(self) -> &'static str {
        match self {
            BalanceAction::Maintain => "Hold your course.",
            BalanceAction::EaseOff => "Markets are overheating; consolidate before expanding.",
            BalanceAction::IncreaseChallenge => "Rivals are probing for weakness; expect harder moves.",
            BalanceAction::OfferOpportunity => "A market gap is opening; adapt your routes to it.",
            BalanceAction::ProvideRelief => "You are overwhelmed; focus on one pressure at a time.",
        }
    }
}

/// The coordinator's whole-system assessment. Every component is in [0,1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameplayBalance {
    pub challenge: f64,
    pub agency: f64,
    pub tension: f64,
    pub adaptation_opportunity: f64,
    pub recommended: BalanceAction,
    pub score: f64,
}

impl Default for GameplayBalance {
    fn default() -> Self {
        Self {
            challenge: 0.0,
            agency: 1.0,
            tension: 0.0,
            adaptation_opportunity: 1.0,
            recommended: BalanceAction::Maintain,
            score: 0.5,
        }
    }
}

impl GameplayBalance {
    pub fn components(&self) -> [f64; 5] {
        [
            self.challenge,
            self.agency,
            self.tension,
            self.adaptation_opportunity,
            self.score,
        ]
    }
}

/// One entry of the coordinator's rolling performance history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub tick: u64,
    /// Observed player performance in [0,1].
    pub performance: f64,
    pub balance_score: f64,
    pub pressure: f64,
}

impl PerformanceSnapshot {
    pub fn new(tick: u64, performance: f64) -> Self {
        Self {
            tick,
            performance: performance.clamp(0.0, 1.0),
            balance_score: 0.0,
            pressure: 0.0,
        }
    }
}

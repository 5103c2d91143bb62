use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PressureSource {
    Market,
    Technological,
    Economic,
    Psychological,
    Temporal,
}

string_enum!(PressureSource {
    Market => "market",
    Technological => "technological",
    Economic => "economic",
    Psychological => "psychological",
    Temporal => "temporal",
});

impl PressureSource {
    /// Contribution of this source to total pressure. Weights sum to 1.0.
    pub fn weight(self) -> f64 {
        match self {
            PressureSource::Market => 0.25,
            PressureSource::Technological => 0.2,
            PressureSource::Economic => 0.25,
            PressureSource::Psychological => 0.15,
            PressureSource::Temporal => 0.15,
        }
    }
}

/// Aggregate player-facing difficulty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureState {
    sources: BTreeMap<PressureSource, f64>,
    /// Weighted total, in [0,1].
    pub total: f64,
    /// `total` minus the previous tick's total. Not carried past one tick.
    pub growth_rate: f64,
}

impl Default for PressureState {
    fn default() -> Self {
        Self {
            sources: PressureSource::ALL.iter().map(|s| (*s, 0.0)).collect(),
            total: 0.0,
            growth_rate: 0.0,
        }
    }
}

impl PressureState {
    pub fn level(&self, source: PressureSource) -> f64 {
        self.sources.get(&source).copied().unwrap_or(0.0)
    }

    pub fn sources(&self) -> impl Iterator<Item = (PressureSource, f64)> + '_ {
        self.sources.iter().map(|(s, v)| (*s, *v))
    }

    /// Set a source, clamped to [0,1]. Does not recompute the total.
    pub fn set_level(&mut self, source: PressureSource, value: f64) {
        self.sources.insert(source, value.clamp(0.0, 1.0));
    }

    pub fn add(&mut self, source: PressureSource, delta: f64) {
        self.set_level(source, self.level(source) + delta);
    }

    /// Weighted combination of the current sources, clamped to [0,1].
    pub fn weighted_total(&self) -> f64 {
        PressureSource::ALL
            .iter()
            .map(|s| s.weight() * self.level(*s))
            .sum::<f64>()
            .clamp(0.0, 1.0)
    }

    /// Source currently contributing the most weighted pressure.
    pub fn dominant_source(&self) -> PressureSource {
        PressureSource::ALL
            .iter()
            .copied()
            .max_by(|a, b| {
                (a.weight() * self.level(*a)).total_cmp(&(b.weight() * self.level(*b)))
            })
            .unwrap_or(PressureSource::Market)
    }
}

use rand::{Rng, RngCore};

use super::narrative_script::news_templates;
use super::system::{Cadence, CadenceTimer};
use crate::config::NarrativeConfig;
use crate::model::{GameTime, NewsItem, SingularityPhase};

const FALLBACK_RIVAL: &str = "An unnamed AI carrier";

/// Low-priority ambient headlines on a randomized interval. Has no effect on
/// simulation state.
#[derive(Debug, Clone)]
pub struct NewsTicker {
    timer: CadenceTimer,
    published: u64,
}

impl NewsTicker {
    pub fn new(config: &NarrativeConfig, start: GameTime, rng: &mut dyn RngCore) -> Self {
        Self {
            timer: CadenceTimer::starting_at(Self::cadence(config), start, rng),
            published: 0,
        }
    }

    pub fn cadence(config: &NarrativeConfig) -> Cadence {
        Cadence::Randomized {
            min: GameTime::from_secs_f64(config.news_interval_min_secs),
            max: GameTime::from_secs_f64(config.news_interval_max_secs),
        }
    }

    pub fn next_due(&self) -> GameTime {
        self.timer.next_due()
    }

    pub fn published(&self) -> u64 {
        self.published
    }

    /// Produce a headline if one is due at `now`.
    pub fn poll(
        &mut self,
        now: GameTime,
        phase: SingularityPhase,
        rival: Option<&str>,
        rng: &mut dyn RngCore,
    ) -> Option<NewsItem> {
        if !self.timer.should_fire(now, rng) {
            return None;
        }
        self.published += 1;
        Some(headline(phase, rival, now, rng))
    }
}

/// Draw one headline from the phase's template pool.
pub fn headline(
    phase: SingularityPhase,
    rival: Option<&str>,
    at: GameTime,
    rng: &mut dyn RngCore,
) -> NewsItem {
    let pool = news_templates(phase);
    let template = pool[rng.random_range(0..pool.len())];
    NewsItem {
        headline: template.replace("{rival}", rival.unwrap_or(FALLBACK_RIVAL)),
        phase,
        at,
    }
}

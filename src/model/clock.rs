use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const MILLIS_PER_SEC: u64 = 1_000;

/// Game time since the start of a playthrough, in whole milliseconds.
///
/// Natural `u64` ordering equals chronological ordering, so `GameTime` can key
/// the delayed-event queue directly.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameTime(u64);

impl GameTime {
    pub const ZERO: GameTime = GameTime(0);

    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(secs * MILLIS_PER_SEC)
    }

    /// Negative and non-finite inputs map to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return Self::ZERO;
        }
        Self((secs * MILLIS_PER_SEC as f64).round() as u64)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / MILLIS_PER_SEC as f64
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }

    /// Time elapsed since `earlier`, saturating at zero.
    pub fn since(self, earlier: GameTime) -> GameTime {
        GameTime(self.0.saturating_sub(earlier.0))
    }
}

impl From<Duration> for GameTime {
    fn from(d: Duration) -> Self {
        Self(d.as_millis() as u64)
    }
}

impl Add for GameTime {
    type Output = GameTime;

    fn add(self, rhs: GameTime) -> GameTime {
        GameTime(self.0.saturating_add(rhs.0))
    }
}

impl Sub for GameTime {
    type Output = GameTime;

    fn sub(self, rhs: GameTime) -> GameTime {
        self.since(rhs)
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0 / MILLIS_PER_SEC;
        write!(f, "T+{}:{:02}.{:03}", secs / 60, secs % 60, self.0 % MILLIS_PER_SEC)
    }
}

//! Balance assessment and the dynamic-difficulty controller.
//!
//! Everything here is a pure function of the snapshot board or of the
//! controller's own history; the coordinator owns the controller and applies
//! its output.

use std::collections::VecDeque;

use super::snapshot::SnapshotBoard;
use crate::config::BalanceConfig;
use crate::model::{BalanceAction, GameplayBalance, PerformanceSnapshot};

/// Inputs to [`compute_balance`], read from the board plus the coordinator's
/// own record of player actions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceInputs {
    pub pressure: f64,
    pub growth_rate: f64,
    /// `phase_index / 7`.
    pub phase_norm: f64,
    /// Strongest competitor's `threat_index / 5`.
    pub threat_norm: f64,
    pub resistance: f64,
    pub recent_action_quality: f64,
    pub economic_shift: f64,
}

impl BalanceInputs {
    pub fn from_board(board: &SnapshotBoard, recent_action_quality: f64) -> Self {
        Self {
            pressure: board.pressure.state.total,
            growth_rate: board.pressure.state.growth_rate,
            phase_norm: board.progression.phase.normalized(),
            threat_norm: board.competitors.strongest_threat.index() as f64 / 5.0,
            resistance: board.progression.player_resistance,
            recent_action_quality,
            economic_shift: board.economic.economic_shift,
        }
    }
}

fn unit(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Recompute the whole assessment. Never updated piecemeal.
pub fn compute_balance(inputs: &BalanceInputs) -> GameplayBalance {
    let pressure = unit(inputs.pressure);
    let challenge =
        unit(0.4 * pressure + 0.3 * unit(inputs.phase_norm) + 0.3 * unit(inputs.threat_norm));
    let agency = unit(
        0.5 * (1.0 - pressure)
            + 0.3 * unit(inputs.resistance)
            + 0.2 * unit(inputs.recent_action_quality),
    );
    let tension = unit(0.6 * pressure + 0.4 * unit(0.5 + 20.0 * inputs.growth_rate));
    let adaptation_opportunity =
        unit(0.4 * (1.0 - challenge) + 0.3 * agency + 0.3 * (1.0 - unit(inputs.economic_shift)));
    let score = unit(
        0.3 * agency
            + 0.3 * (1.0 - 2.0 * (challenge - 0.6).abs())
            + 0.2 * (1.0 - 2.0 * (tension - 0.5).abs())
            + 0.2 * adaptation_opportunity,
    );

    let recommended = if challenge > 0.85 && agency < 0.3 {
        BalanceAction::ProvideRelief
    } else if tension > 0.8 {
        BalanceAction::EaseOff
    } else if challenge < 0.3 {
        BalanceAction::IncreaseChallenge
    } else if adaptation_opportunity < 0.3 {
        BalanceAction::OfferOpportunity
    } else {
        BalanceAction::Maintain
    };

    GameplayBalance {
        challenge,
        agency,
        tension,
        adaptation_opportunity,
        recommended,
        score,
    }
}

/// Observed player performance for one tick, in [0,1].
pub fn performance(balance: &GameplayBalance, inputs: &BalanceInputs) -> f64 {
    unit(
        0.5 * balance.agency
            + 0.3 * unit(inputs.recent_action_quality)
            + 0.2 * (1.0 - unit(inputs.pressure)),
    )
}

/// A change the controller made to the difficulty multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyAdjustment {
    pub multiplier: f64,
    pub delta: f64,
}

/// Nudges one scalar difficulty multiplier from recent player performance.
#[derive(Debug, Clone)]
pub struct DifficultyController {
    config: BalanceConfig,
    multiplier: f64,
    history: VecDeque<PerformanceSnapshot>,
    last_evaluated: Option<u64>,
}

impl DifficultyController {
    pub fn new(config: BalanceConfig) -> Self {
        Self::with_multiplier(config, 1.0)
    }

    pub fn with_multiplier(config: BalanceConfig, multiplier: f64) -> Self {
        let multiplier = multiplier.clamp(config.min_multiplier, config.max_multiplier);
        Self {
            history: VecDeque::with_capacity(config.history_capacity),
            config,
            multiplier,
            last_evaluated: None,
        }
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn history(&self) -> impl Iterator<Item = &PerformanceSnapshot> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Append a snapshot, dropping the oldest once the cap is reached.
    pub fn record(&mut self, snapshot: PerformanceSnapshot) {
        while self.history.len() >= self.config.history_capacity.max(1) {
            self.history.pop_front();
        }
        self.history.push_back(snapshot);
    }

    /// Mean and trend of the last `evaluation_window` snapshots. Trend is the
    /// mean of the window's second half minus the mean of its first half.
    pub fn window_stats(&self) -> Option<(f64, f64)> {
        let window = self.config.evaluation_window;
        if window < 2 || self.history.len() < window {
            return None;
        }
        let recent: Vec<f64> = self
            .history
            .iter()
            .skip(self.history.len() - window)
            .map(|s| s.performance)
            .collect();
        let mean = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;
        let (first, second) = recent.split_at(window / 2);
        Some((mean(&recent), mean(second) - mean(first)))
    }

    /// Evaluate at `tick` if the cooldown has passed. Returns the adjustment
    /// when the multiplier actually changed.
    pub fn evaluate(&mut self, tick: u64) -> Option<DifficultyAdjustment> {
        if let Some(last) = self.last_evaluated {
            if tick.saturating_sub(last) < self.config.adjustment_cooldown_ticks {
                return None;
            }
        }
        let (avg, trend) = self.window_stats()?;
        self.last_evaluated = Some(tick);

        let c = &self.config;
        let step = if avg < c.struggling_below && trend < 0.0 {
            -c.step
        } else if avg > c.dominating_above && trend > 0.0 {
            c.step
        } else if avg < c.target_low {
            -c.step * c.nudge_fraction
        } else if avg > c.target_high {
            c.step * c.nudge_fraction
        } else {
            0.0
        };

        let before = self.multiplier;
        self.multiplier = (before + step).clamp(c.min_multiplier, c.max_multiplier);
        let delta = self.multiplier - before;
        if delta == 0.0 {
            return None;
        }
        tracing::info!(tick, avg, trend, multiplier = self.multiplier, delta, "difficulty adjusted");
        Some(DifficultyAdjustment {
            multiplier: self.multiplier,
            delta,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand::rngs::SmallRng;

    use super::*;

    fn falling_history(controller: &mut DifficultyController) {
        // mean 0.2, second half lower than first
        let values = [0.3, 0.28, 0.26, 0.24, 0.22, 0.18, 0.16, 0.14, 0.12, 0.1];
        for (tick, v) in values.iter().enumerate() {
            controller.record(PerformanceSnapshot::new(tick as u64, *v));
        }
    }

    #[test]
    fn struggling_player_gets_exactly_one_step_easier() {
        let mut controller = DifficultyController::new(BalanceConfig::default());
        falling_history(&mut controller);
        let (avg, trend) = controller.window_stats().unwrap();
        assert!((avg - 0.2).abs() < 1e-12);
        assert!(trend < 0.0);

        let adjustment = controller.evaluate(10).unwrap();
        assert!((adjustment.delta + 0.1).abs() < 1e-12);
        assert!((controller.multiplier() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn easing_is_clamped_at_floor() {
        let mut controller = DifficultyController::with_multiplier(BalanceConfig::default(), 0.55);
        falling_history(&mut controller);
        let adjustment = controller.evaluate(10).unwrap();
        assert_eq!(controller.multiplier(), 0.5);
        assert!((adjustment.delta + 0.05).abs() < 1e-12);

        let mut at_floor = DifficultyController::with_multiplier(BalanceConfig::default(), 0.5);
        falling_history(&mut at_floor);
        assert_eq!(at_floor.evaluate(10), None);
        assert_eq!(at_floor.multiplier(), 0.5);
    }

    #[test]
    fn dominating_player_gets_harder() {
        let mut controller = DifficultyController::new(BalanceConfig::default());
        for tick in 0..10 {
            controller.record(PerformanceSnapshot::new(tick, 0.75 + 0.02 * tick as f64));
        }
        let adjustment = controller.evaluate(10).unwrap();
        assert!((adjustment.delta - 0.1).abs() < 1e-12);
    }

    #[test]
    fn small_nudges_toward_target_band() {
        let mut low = DifficultyController::new(BalanceConfig::default());
        let mut high = DifficultyController::new(BalanceConfig::default());
        let mut inside = DifficultyController::new(BalanceConfig::default());
        for tick in 0..10 {
            low.record(PerformanceSnapshot::new(tick, 0.35));
            high.record(PerformanceSnapshot::new(tick, 0.65));
            inside.record(PerformanceSnapshot::new(tick, 0.5));
        }
        assert!((low.evaluate(10).unwrap().delta + 0.025).abs() < 1e-12);
        assert!((high.evaluate(10).unwrap().delta - 0.025).abs() < 1e-12);
        assert_eq!(inside.evaluate(10), None);
    }

    #[test]
    fn no_evaluation_before_window_fills_or_during_cooldown() {
        let mut controller = DifficultyController::new(BalanceConfig::default());
        for tick in 0..9 {
            controller.record(PerformanceSnapshot::new(tick, 0.1));
        }
        assert_eq!(controller.evaluate(9), None);

        controller.record(PerformanceSnapshot::new(9, 0.1));
        assert!(controller.evaluate(10).is_some());
        controller.record(PerformanceSnapshot::new(10, 0.1));
        assert_eq!(controller.evaluate(11), None);
        assert_eq!(controller.evaluate(21), None);
        assert!(controller.evaluate(22).is_some());
    }

    #[test]
    fn history_drops_oldest_at_capacity() {
        let mut controller = DifficultyController::new(BalanceConfig::default());
        for tick in 0..150 {
            controller.record(PerformanceSnapshot::new(tick, 0.5));
        }
        assert_eq!(controller.history_len(), 100);
        assert_eq!(controller.history().next().unwrap().tick, 50);
    }

    #[test]
    fn multiplier_never_leaves_range_under_random_history() {
        let mut rng = SmallRng::seed_from_u64(17);
        let mut controller = DifficultyController::new(BalanceConfig::default());
        for tick in 0..5_000 {
            controller.record(PerformanceSnapshot::new(tick, rng.random_range(0.0..1.0)));
            controller.evaluate(tick);
            assert!((0.5..=2.0).contains(&controller.multiplier()));
        }
    }

    #[test]
    fn balance_components_stay_in_unit_interval() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..2_000 {
            let inputs = BalanceInputs {
                pressure: rng.random_range(-0.5..1.5),
                growth_rate: rng.random_range(-1.0..1.0),
                phase_norm: rng.random_range(0.0..1.0),
                threat_norm: rng.random_range(0.0..1.0),
                resistance: rng.random_range(0.0..1.0),
                recent_action_quality: rng.random_range(0.0..1.0),
                economic_shift: rng.random_range(0.0..1.0),
            };
            let balance = compute_balance(&inputs);
            for c in balance.components() {
                assert!((0.0..=1.0).contains(&c), "{balance:?}");
            }
            assert!((0.0..=1.0).contains(&performance(&balance, &inputs)));
        }
    }

    #[test]
    fn overwhelmed_player_gets_relief_recommendation() {
        let inputs = BalanceInputs {
            pressure: 1.0,
            growth_rate: 0.0,
            phase_norm: 1.0,
            threat_norm: 1.0,
            resistance: 0.0,
            recent_action_quality: 0.0,
            economic_shift: 0.0,
        };
        let balance = compute_balance(&inputs);
        assert_eq!(balance.challenge, 1.0);
        assert_eq!(balance.agency, 0.0);
        assert_eq!(balance.recommended, BalanceAction::ProvideRelief);
    }

    #[test]
    fn quiet_start_asks_for_more_challenge() {
        let balance = compute_balance(&BalanceInputs::from_board(&SnapshotBoard::default(), 0.0));
        assert_eq!(balance.challenge, 0.0);
        assert_eq!(balance.recommended, BalanceAction::IncreaseChallenge);
    }
}

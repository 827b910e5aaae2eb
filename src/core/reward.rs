// src/core/reward.rs — Heuristic reward signal

use super::types::RewardMode;

/// Lowest reward continuous mode will ever return.
pub const CONTINUOUS_FLOOR: f64 = 0.1;

/// Turns a before/after score pair into a scalar reward.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewardCalculator {
    mode: RewardMode,
}

impl RewardCalculator {
    pub fn new(mode: RewardMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> RewardMode {
        self.mode
    }

    pub fn calculate(&self, score_before: f64, score_after: f64) -> f64 {
        reward(score_before, score_after, self.mode)
    }
}

/// Binary: +1 on strict improvement, -1 otherwise (ties fail).
/// Continuous: `max(0.1, after/100 + (after - before)/100)`.
pub fn reward(score_before: f64, score_after: f64, mode: RewardMode) -> f64 {
    match mode {
        RewardMode::Binary => {
            if score_after > score_before {
                1.0
            } else {
                -1.0
            }
        }
        RewardMode::Continuous => {
            let raw = score_after / 100.0 + (score_after - score_before) / 100.0;
            if raw.is_nan() {
                return CONTINUOUS_FLOOR;
            }
            raw.max(CONTINUOUS_FLOOR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_improvement() {
        assert_eq!(reward(50.0, 60.0, RewardMode::Binary), 1.0);
        assert_eq!(reward(60.0, 50.0, RewardMode::Binary), -1.0);
    }

    #[test]
    fn test_binary_tie_fails() {
        assert_eq!(reward(72.5, 72.5, RewardMode::Binary), -1.0);
    }

    #[test]
    fn test_continuous_values() {
        let r = reward(50.0, 70.0, RewardMode::Continuous);
        assert!((r - 0.9).abs() < 1e-9);
        // stagnation pays less than improvement
        let flat = reward(70.0, 70.0, RewardMode::Continuous);
        assert!((flat - 0.7).abs() < 1e-9);
        assert!(r > flat);
    }

    #[test]
    fn test_continuous_floor_on_regression() {
        assert_eq!(reward(100.0, 0.0, RewardMode::Continuous), CONTINUOUS_FLOOR);
        assert_eq!(reward(90.0, 5.0, RewardMode::Continuous), CONTINUOUS_FLOOR);
    }

    #[test]
    fn test_continuous_floor_over_grid() {
        let mut before = 0.0;
        while before <= 100.0 {
            let mut after = 0.0;
            while after <= 100.0 {
                assert!(reward(before, after, RewardMode::Continuous) >= CONTINUOUS_FLOOR);
                after += 2.5;
            }
            before += 2.5;
        }
    }

    #[test]
    fn test_calculator_uses_mode() {
        let calc = RewardCalculator::new(RewardMode::Binary);
        assert_eq!(calc.mode(), RewardMode::Binary);
        assert_eq!(calc.calculate(10.0, 11.0), 1.0);
        assert_eq!(RewardCalculator::default().mode(), RewardMode::Continuous);
    }
}

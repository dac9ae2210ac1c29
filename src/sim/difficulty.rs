//! Time-derived difficulty curve
//!
//! A pure function of elapsed session time; the session applies the factor
//! to the field's fall-speed bounds and spawn cadence every tick.

use crate::config::DifficultyConfig;

#[derive(Debug)]
pub struct DifficultyScheduler {
    config: DifficultyConfig,
    elapsed: f32,
}

impl DifficultyScheduler {
    pub fn new(config: DifficultyConfig) -> Self {
        Self {
            config,
            elapsed: 0.0,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// `clamp(1 + elapsed * increase_rate, 1, max_difficulty)`
    pub fn factor(&self) -> f32 {
        (1.0 + self.elapsed * self.config.increase_rate).clamp(1.0, self.config.max_difficulty)
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(rate: f32, max: f32) -> DifficultyScheduler {
        DifficultyScheduler::new(DifficultyConfig {
            increase_rate: rate,
            max_difficulty: max,
        })
    }

    #[test]
    fn test_factor_is_monotonic_and_clamped() {
        let mut sched = scheduler(0.05, 5.0);
        assert_eq!(sched.factor(), 1.0);

        let mut last = sched.factor();
        for _ in 0..2000 {
            sched.tick(0.5);
            let factor = sched.factor();
            assert!(factor >= last);
            assert!((1.0..=5.0).contains(&factor));
            last = factor;
        }
        assert_eq!(sched.factor(), 5.0);
    }

    #[test]
    fn test_factor_clamps_exactly_at_cap() {
        let mut sched = scheduler(0.05, 5.0);
        sched.tick(1000.0);
        // 1 + 1000 * 0.05 = 51, clamped to exactly 5
        assert_eq!(sched.factor(), 5.0);
    }

    #[test]
    fn test_reset_returns_to_base() {
        let mut sched = scheduler(0.1, 3.0);
        sched.tick(100.0);
        assert_eq!(sched.factor(), 3.0);
        sched.reset();
        assert_eq!(sched.factor(), 1.0);
        assert_eq!(sched.elapsed(), 0.0);
    }
}

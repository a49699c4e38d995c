//! Values for accepted suggestions that arrive without one.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub trait FallbackSource {
    fn next_value(&mut self) -> f64;
}

/// Whole numbers drawn uniformly from `[0, max)`.
#[derive(Debug, Clone)]
pub struct RandomFallback {
    rng: SmallRng,
    max: u32,
}

impl RandomFallback {
    pub fn new(seed: u64, max: u32) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            max: max.max(1),
        }
    }
}

impl FallbackSource for RandomFallback {
    fn next_value(&mut self) -> f64 {
        f64::from(self.rng.random_range(0..self.max))
    }
}

/// Replays a fixed list, repeating the final entry once exhausted.
#[derive(Debug, Clone)]
pub struct SequenceFallback {
    values: Vec<f64>,
    next: usize,
}

impl SequenceFallback {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, next: 0 }
    }
}

impl FallbackSource for SequenceFallback {
    fn next_value(&mut self) -> f64 {
        let value = self
            .values
            .get(self.next)
            .or_else(|| self.values.last())
            .copied()
            .unwrap_or(0.0);
        self.next += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_fallback_range() {
        let mut source = RandomFallback::new(7, 100);
        for _ in 0..1_000 {
            let value = source.next_value();
            assert!((0.0..100.0).contains(&value));
            assert_eq!(value.fract(), 0.0);
        }
    }

    #[test]
    fn test_random_fallback_is_reproducible_per_seed() {
        let mut a = RandomFallback::new(42, 100);
        let mut b = RandomFallback::new(42, 100);
        let first: Vec<f64> = (0..16).map(|_| a.next_value()).collect();
        let second: Vec<f64> = (0..16).map(|_| b.next_value()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_max_is_clamped() {
        let mut source = RandomFallback::new(1, 0);
        assert_eq!(source.next_value(), 0.0);
    }

    #[test]
    fn test_sequence_fallback() {
        let mut source = SequenceFallback::new(vec![3.0, 9.0]);
        assert_eq!(source.next_value(), 3.0);
        assert_eq!(source.next_value(), 9.0);
        assert_eq!(source.next_value(), 9.0);
        assert_eq!(SequenceFallback::new(Vec::new()).next_value(), 0.0);
    }
}

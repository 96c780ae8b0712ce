//! Injected source of randomness for record generation.
//!
//! Every draw the generator makes goes through [`RngProvider`], so a record
//! is a pure function of the provider state. [`SeededRng`] backs the trait
//! with rand's `StdRng`; seeding it makes generation reproducible.
//!
//! Documented distributions:
//! - `uniform_int(low, high)`: uniform over the inclusive range
//! - `weighted_index(weights)`: categorical, `P(i) = w[i] / sum(w)`; zero
//!   weights are never chosen
//! - `date_in_range(start, end)`: uniform over whole days, inclusive
//! - `sample_indices(len, amount)`: `amount` distinct indices, without
//!   replacement, in draw order

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RngProvider {
    /// Uniform integer in `[low, high]`. Callers guarantee `low <= high`.
    fn uniform_int(&mut self, low: i64, high: i64) -> i64;

    /// Index into `weights` drawn proportionally to its weight, or `None`
    /// when every weight is zero.
    fn weighted_index(&mut self, weights: &[u32]) -> Option<usize>;

    /// `amount` distinct indices from `0..len`. Callers guarantee `amount <= len`.
    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize>;

    /// Uniform date in `[start, end]`.
    fn date_in_range(&mut self, start: NaiveDate, end: NaiveDate) -> NaiveDate {
        let span = (end - start).num_days().max(0);
        start + Duration::days(self.uniform_int(0, span))
    }

    /// Pick one element uniformly.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        if items.is_empty() {
            return None;
        }
        let idx = self.uniform_int(0, items.len() as i64 - 1) as usize;
        items.get(idx)
    }

    /// A string of `len` decimal digits.
    fn digits(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(b'0' + self.uniform_int(0, 9) as u8))
            .collect()
    }
}

/// `StdRng`-backed provider.
pub struct SeededRng {
    rng: StdRng,
    seed: Option<u64>,
}

impl SeededRng {
    /// Deterministic provider: the same seed yields the same draw sequence.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Non-deterministic provider seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            seed: None,
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl RngProvider for SeededRng {
    fn uniform_int(&mut self, low: i64, high: i64) -> i64 {
        if low >= high {
            return low;
        }
        self.rng.random_range(low..=high)
    }

    fn weighted_index(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u64 = weights.iter().map(|w| *w as u64).sum();
        if total == 0 {
            return None;
        }
        let mut roll = self.rng.random_range(0..total);
        for (idx, w) in weights.iter().enumerate() {
            let w = *w as u64;
            if roll < w {
                return Some(idx);
            }
            roll -= w;
        }
        None
    }

    fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.rng, len, amount.min(len)).into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SeededRng::from_seed(7);
        let mut b = SeededRng::from_seed(7);
        let xs: Vec<i64> = (0..16).map(|_| a.uniform_int(0, 1000)).collect();
        let ys: Vec<i64> = (0..16).map(|_| b.uniform_int(0, 1000)).collect();
        assert_eq!(xs, ys);
        assert_eq!(a.seed(), Some(7));
    }

    #[test]
    fn weighted_index_skips_zero_weights() {
        let mut rng = SeededRng::from_seed(11);
        for _ in 0..500 {
            let idx = rng.weighted_index(&[4, 2, 0, 0, 0]).unwrap();
            assert!(idx < 2);
        }
        assert_eq!(rng.weighted_index(&[0, 0]), None);
    }

    #[test]
    fn sample_indices_are_distinct() {
        let mut rng = SeededRng::from_seed(3);
        let mut picked = rng.sample_indices(6, 3);
        assert_eq!(picked.len(), 3);
        picked.sort_unstable();
        picked.dedup();
        assert_eq!(picked.len(), 3);
        assert!(picked.iter().all(|i| *i < 6));
    }

    #[test]
    fn date_in_range_is_inclusive() {
        let mut rng = SeededRng::from_seed(5);
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        for _ in 0..100 {
            let d = rng.date_in_range(start, end);
            assert!(d >= start && d <= end);
        }
    }

    #[test]
    fn digits_have_requested_length() {
        let mut rng = SeededRng::from_seed(9);
        let s = rng.digits(9);
        assert_eq!(s.len(), 9);
        assert!(s.chars().all(|c| c.is_ascii_digit()));
    }
}

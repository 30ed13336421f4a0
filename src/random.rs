//! Source of randomness for the simulation.
//!
//! Everything random in the core (spawn count, seat shuffle, walking speed,
//! screen flicker) is drawn through `RandomSource`, so a seeded generator
//! makes whole screenings reproducible.

use rand::Rng;
use rand::seq::SliceRandom;

pub trait RandomSource {
    /// Uniform value in the closed range `[lo, hi]`.
    fn uniform(&mut self, lo: f32, hi: f32) -> f32;

    /// Uniform integer in the closed range `[lo, hi]`.
    fn pick(&mut self, lo: usize, hi: usize) -> usize;

    /// Shuffle seat indices in place.
    fn shuffle(&mut self, items: &mut [usize]);
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.random_range(lo..=hi)
    }

    fn pick(&mut self, lo: usize, hi: usize) -> usize {
        if hi <= lo {
            return lo;
        }
        self.random_range(lo..=hi)
    }

    fn shuffle(&mut self, items: &mut [usize]) {
        items.shuffle(self);
    }
}

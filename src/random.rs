//! Uniform random source consumed by the field and population controller.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of uniform values in `[0, 1)`
pub trait RandomSource {
    fn uniform(&mut self) -> f32;

    /// Uniform value in `[min, max)`
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.uniform()
    }
}

impl<R: Rng> RandomSource for R {
    fn uniform(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Seeded generator, or a randomly seeded one when `seed` is `None`
pub fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::seed_from_u64(rand::random::<u64>()),
    }
}

//! Seedable standard-normal sample source.

use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

// ---------------------------------------------------------------------------
// GaussianSampler
// ---------------------------------------------------------------------------

/// Independent `N(0, 1)` samples from a seeded `ChaCha8Rng`.
///
/// [`reset`](Self::reset) rewinds to the configured seed, so the stream after
/// a reset is identical to the stream after construction.
///
/// ```
/// use simsense_noise::sampler::GaussianSampler;
///
/// let mut sampler = GaussianSampler::new(3);
/// let first = sampler.next();
/// sampler.reset();
/// assert_eq!(sampler.next(), first);
/// ```
#[derive(Debug, Clone)]
pub struct GaussianSampler {
    seed: u64,
    rng: ChaCha8Rng,
}

impl GaussianSampler {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The seed the stream restarts from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// One standard-normal sample.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> f32 {
        self.rng.sample(StandardNormal)
    }

    /// Three independent samples, drawn in x, y, z order.
    pub fn next_vector(&mut self) -> Vector3<f32> {
        let x = self.next();
        let y = self.next();
        let z = self.next();
        Vector3::new(x, y, z)
    }

    /// Restart the stream from the configured seed.
    pub fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }

    /// Replace the seed and restart the stream.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.reset();
    }
}

impl Default for GaussianSampler {
    fn default() -> Self {
        Self::new(0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Stochastic error models for inertial and ranging sensors.
//!
//! `simsense-noise` turns an exact signal into a plausible measurement using
//! the white-noise plus Gauss-Markov bias model common to MEMS datasheets.
//! All sampling goes through an explicit [`GaussianSampler`](sampler::GaussianSampler)
//! so that a fixed seed reproduces a run exactly.
//!
//! # Architecture
//!
//! - [`sampler`]: seeded standard-normal source with replay on reset.
//! - [`model`]: validated coefficients and the scalar
//!   [`GaussMarkovNoise`](model::GaussMarkovNoise) channel.
//! - [`vector`]: [`AxisNoise`](vector::AxisNoise), the per-axis 3-vector
//!   channel used by gyroscopes and accelerometers.
//! - [`presets`]: datasheet parameter sets.
//!
//! # Quick Start
//!
//! ```
//! use nalgebra::Vector3;
//! use simsense_noise::prelude::*;
//!
//! let params = presets::consumer_mems_imu();
//! let mut gyro = AxisNoise::from_params(&params.gyro, params.min_sample_time).unwrap();
//! let mut sampler = GaussianSampler::new(42);
//! let measured = gyro.apply(&Vector3::new(0.0, 0.0, 0.1), 0.005, &mut sampler);
//! assert!(measured.iter().all(|v| v.is_finite()));
//! ```

pub mod model;
pub mod presets;
pub mod sampler;
pub mod vector;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::model::{GaussMarkovNoise, NoiseCoefficients, NoiseError};
    pub use crate::presets;
    pub use crate::sampler::GaussianSampler;
    pub use crate::vector::AxisNoise;
}

//! Per-axis noise for 3-vector sensor channels.
//!
//! [`AxisNoise`] applies the scalar Gauss-Markov model of
//! [`model`](crate::model) independently to each axis with shared
//! coefficients and a separate bias per axis. Samples are drawn as one
//! white-noise vector followed by one bias-walk vector.

use nalgebra::Vector3;
use simsense_core::config::AxisNoiseParams;

use crate::model::{NoiseCoefficients, NoiseError, advances};
use crate::sampler::GaussianSampler;

// ---------------------------------------------------------------------------
// AxisNoise
// ---------------------------------------------------------------------------

/// Independent white noise and random-walk bias on x, y and z.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisNoise {
    coefficients: NoiseCoefficients,
    turn_on_bias: Vector3<f32>,
    bias: Vector3<f32>,
}

impl AxisNoise {
    /// # Errors
    ///
    /// Returns [`NoiseError::InvalidDensity`] if a turn-on bias component is
    /// not finite.
    pub fn new(
        coefficients: NoiseCoefficients,
        turn_on_bias: Vector3<f32>,
    ) -> Result<Self, NoiseError> {
        if let Some(&value) = turn_on_bias.iter().find(|v| !v.is_finite()) {
            return Err(NoiseError::InvalidDensity { value });
        }
        Ok(Self {
            coefficients,
            turn_on_bias,
            bias: turn_on_bias,
        })
    }

    /// Build one channel (gyro or accel) from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`NoiseError`] if any coefficient is out of range.
    pub fn from_params(params: &AxisNoiseParams, min_sample_time: f32) -> Result<Self, NoiseError> {
        let coefficients = NoiseCoefficients::new(
            params.white_noise_density,
            params.bias_instability,
            params.tau,
            min_sample_time,
        )?;
        Self::new(coefficients, params.turn_on_bias_vector())
    }

    /// Corrupt `value` for a step of `dt` seconds and advance the bias.
    ///
    /// For `dt <= 0` the result is `value + bias` and nothing is sampled.
    pub fn apply(
        &mut self,
        value: &Vector3<f32>,
        dt: f32,
        sampler: &mut GaussianSampler,
    ) -> Vector3<f32> {
        if !advances(dt) {
            return value + self.bias;
        }
        let white = sampler.next_vector() * self.coefficients.noise_scale(dt);
        let measured = value + white + self.bias;
        self.bias += sampler.next_vector() * self.coefficients.bias_walk_scale(dt);
        measured
    }

    /// Restore every axis to its turn-on bias.
    pub fn reset(&mut self) {
        self.bias = self.turn_on_bias;
    }

    /// Current bias per axis.
    #[must_use]
    pub const fn bias(&self) -> &Vector3<f32> {
        &self.bias
    }

    #[must_use]
    pub const fn turn_on_bias(&self) -> &Vector3<f32> {
        &self.turn_on_bias
    }

    #[must_use]
    pub const fn coefficients(&self) -> &NoiseCoefficients {
        &self.coefficients
    }

    #[must_use]
    pub fn noise_scale(&self, dt: f32) -> f32 {
        self.coefficients.noise_scale(dt)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

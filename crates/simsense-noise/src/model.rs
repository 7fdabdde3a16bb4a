//! Gauss-Markov bias plus white-noise model for a single scalar channel.
//!
//! Each update with `dt > 0` draws two standard-normal samples:
//!
//! ```text
//! sqrt_dt  = sqrt(max(dt, min_sample_time))
//! measured = true + n1 * (white_noise_density / sqrt_dt) + bias
//! bias    += n2 * (bias_instability / sqrt(tau)) * sqrt_dt
//! ```
//!
//! A non-advancing tick (`dt <= 0`) draws nothing: the measurement is
//! `true + bias` and the bias is left untouched.
//!
//! All sampling goes through an explicit [`GaussianSampler`] so a sensor owns
//! exactly one stream and the draw order is fixed.

use std::fmt;

use simsense_core::config::ScalarNoiseParams;

use crate::sampler::GaussianSampler;

// ---------------------------------------------------------------------------
// NoiseError
// ---------------------------------------------------------------------------

/// Validation errors for noise model parameters.
///
/// Implements [`Copy`] for cheap propagation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoiseError {
    /// A noise density or bias instability was negative, NaN, or infinite.
    InvalidDensity { value: f32 },
    /// Correlation time was `<= 0`, NaN, or infinite.
    InvalidTimeConstant { tau: f32 },
    /// Minimum sample time was `<= 0`, NaN, or infinite.
    InvalidSampleTime { value: f32 },
}

impl fmt::Display for NoiseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::InvalidDensity { value } => {
                write!(f, "noise density must be finite and >= 0, got {value}")
            }
            Self::InvalidTimeConstant { tau } => {
                write!(f, "tau must be finite and > 0, got {tau}")
            }
            Self::InvalidSampleTime { value } => {
                write!(f, "min_sample_time must be finite and > 0, got {value}")
            }
        }
    }
}

impl std::error::Error for NoiseError {}

// ---------------------------------------------------------------------------
// NoiseCoefficients
// ---------------------------------------------------------------------------

/// Validated coefficients shared by the scalar and per-axis models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseCoefficients {
    white_noise_density: f32,
    bias_instability: f32,
    tau: f32,
    min_sample_time: f32,
    bias_stability_norm: f32,
}

impl NoiseCoefficients {
    /// # Errors
    ///
    /// Returns [`NoiseError`] if a density is negative or non-finite, or if
    /// `tau` or `min_sample_time` is not strictly positive.
    pub fn new(
        white_noise_density: f32,
        bias_instability: f32,
        tau: f32,
        min_sample_time: f32,
    ) -> Result<Self, NoiseError> {
        for value in [white_noise_density, bias_instability] {
            if !value.is_finite() || value < 0.0 {
                return Err(NoiseError::InvalidDensity { value });
            }
        }
        if !tau.is_finite() || tau <= 0.0 {
            return Err(NoiseError::InvalidTimeConstant { tau });
        }
        if !min_sample_time.is_finite() || min_sample_time <= 0.0 {
            return Err(NoiseError::InvalidSampleTime {
                value: min_sample_time,
            });
        }
        Ok(Self {
            white_noise_density,
            bias_instability,
            tau,
            min_sample_time,
            bias_stability_norm: bias_instability / tau.sqrt(),
        })
    }

    #[must_use]
    pub const fn white_noise_density(&self) -> f32 {
        self.white_noise_density
    }

    #[must_use]
    pub const fn bias_instability(&self) -> f32 {
        self.bias_instability
    }

    #[must_use]
    pub const fn tau(&self) -> f32 {
        self.tau
    }

    #[must_use]
    pub const fn min_sample_time(&self) -> f32 {
        self.min_sample_time
    }

    /// `bias_instability / sqrt(tau)`.
    #[must_use]
    pub const fn bias_stability_norm(&self) -> f32 {
        self.bias_stability_norm
    }

    /// `sqrt(max(dt, min_sample_time))`. Never zero.
    #[must_use]
    pub fn sqrt_dt(&self, dt: f32) -> f32 {
        dt.max(self.min_sample_time).sqrt()
    }

    /// Standard deviation of the white-noise term for a step of `dt`.
    #[must_use]
    pub fn noise_scale(&self, dt: f32) -> f32 {
        self.white_noise_density / self.sqrt_dt(dt)
    }

    /// Standard deviation of one bias increment for a step of `dt`.
    #[must_use]
    pub fn bias_walk_scale(&self, dt: f32) -> f32 {
        self.bias_stability_norm * self.sqrt_dt(dt)
    }

    /// `true` if the white and bias-walk terms are both zero.
    #[must_use]
    pub fn is_noiseless(&self) -> bool {
        self.white_noise_density == 0.0 && self.bias_instability == 0.0
    }
}

/// `true` when a tick advances time and should draw a new noise realization.
pub(crate) fn advances(dt: f32) -> bool {
    dt > 0.0
}

// ---------------------------------------------------------------------------
// GaussMarkovNoise
// ---------------------------------------------------------------------------

/// Scalar white noise plus random-walk bias.
///
/// The bias starts at `turn_on_bias` and is restored to it on
/// [`reset`](Self::reset).
#[derive(Debug, Clone, PartialEq)]
pub struct GaussMarkovNoise {
    coefficients: NoiseCoefficients,
    turn_on_bias: f32,
    bias: f32,
}

impl GaussMarkovNoise {
    /// # Errors
    ///
    /// Returns [`NoiseError`] if the coefficients are invalid or the turn-on
    /// bias is not finite.
    pub fn new(coefficients: NoiseCoefficients, turn_on_bias: f32) -> Result<Self, NoiseError> {
        if !turn_on_bias.is_finite() {
            return Err(NoiseError::InvalidDensity {
                value: turn_on_bias,
            });
        }
        Ok(Self {
            coefficients,
            turn_on_bias,
            bias: turn_on_bias,
        })
    }

    /// Build from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`NoiseError`] if any coefficient is out of range.
    pub fn from_params(
        params: &ScalarNoiseParams,
        min_sample_time: f32,
    ) -> Result<Self, NoiseError> {
        let coefficients = NoiseCoefficients::new(
            params.white_noise_density,
            params.bias_instability,
            params.tau,
            min_sample_time,
        )?;
        Self::new(coefficients, params.turn_on_bias)
    }

    /// A channel that passes values through unchanged.
    #[must_use]
    pub fn noiseless() -> Self {
        Self {
            coefficients: NoiseCoefficients {
                white_noise_density: 0.0,
                bias_instability: 0.0,
                tau: 1.0,
                min_sample_time: 1.0e-3,
                bias_stability_norm: 0.0,
            },
            turn_on_bias: 0.0,
            bias: 0.0,
        }
    }

    /// Corrupt `value` for a step of `dt` seconds and advance the bias.
    pub fn apply(&mut self, value: f32, dt: f32, sampler: &mut GaussianSampler) -> f32 {
        let measured = self.perturb(value, dt, sampler);
        self.advance_bias(dt, sampler);
        measured
    }

    /// White noise plus the current bias, leaving the bias unchanged.
    ///
    /// Lets several readings taken in the same step share one bias; follow
    /// with a single [`advance_bias`](Self::advance_bias).
    pub fn perturb(&self, value: f32, dt: f32, sampler: &mut GaussianSampler) -> f32 {
        if !advances(dt) {
            return value + self.bias;
        }
        value + sampler.next() * self.coefficients.noise_scale(dt) + self.bias
    }

    /// One random-walk step of the bias. No-op for `dt <= 0`.
    pub fn advance_bias(&mut self, dt: f32, sampler: &mut GaussianSampler) {
        if advances(dt) {
            self.bias += sampler.next() * self.coefficients.bias_walk_scale(dt);
        }
    }

    /// Restore the bias to its turn-on value.
    pub fn reset(&mut self) {
        self.bias = self.turn_on_bias;
    }

    #[must_use]
    pub const fn bias(&self) -> f32 {
        self.bias
    }

    #[must_use]
    pub const fn turn_on_bias(&self) -> f32 {
        self.turn_on_bias
    }

    #[must_use]
    pub const fn coefficients(&self) -> &NoiseCoefficients {
        &self.coefficients
    }

    /// See [`NoiseCoefficients::noise_scale`].
    #[must_use]
    pub fn noise_scale(&self, dt: f32) -> f32 {
        self.coefficients.noise_scale(dt)
    }

    /// `true` if this channel can never alter a value.
    #[must_use]
    pub fn is_noiseless(&self) -> bool {
        self.coefficients.is_noiseless() && self.turn_on_bias == 0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn coefficients(density: f32, instability: f32, tau: f32) -> NoiseCoefficients {
        NoiseCoefficients::new(density, instability, tau, 1.0e-3).unwrap()
    }

    fn mean_and_variance(samples: &[f64]) -> (f64, f64) {
        #[allow(clippy::cast_precision_loss)]
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (mean, var)
    }

    // -- Constructor validation --

    #[test]
    fn rejects_negative_density() {
        assert_eq!(
            NoiseCoefficients::new(-1.0, 0.0, 1.0, 1.0e-3),
            Err(NoiseError::InvalidDensity { value: -1.0 })
        );
    }

    #[test]
    fn rejects_nan_bias_instability() {
        assert!(NoiseCoefficients::new(0.0, f32::NAN, 1.0, 1.0e-3).is_err());
    }

    #[test]
    fn rejects_non_positive_tau() {
        assert_eq!(
            NoiseCoefficients::new(0.0, 0.0, 0.0, 1.0e-3),
            Err(NoiseError::InvalidTimeConstant { tau: 0.0 })
        );
        assert!(NoiseCoefficients::new(0.0, 0.0, f32::INFINITY, 1.0e-3).is_err());
    }

    #[test]
    fn rejects_non_positive_min_sample_time() {
        assert!(NoiseCoefficients::new(0.0, 0.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn rejects_infinite_turn_on_bias() {
        assert!(GaussMarkovNoise::new(coefficients(0.0, 0.0, 1.0), f32::INFINITY).is_err());
    }

    #[test]
    fn bias_stability_norm_is_precomputed() {
        let c = coefficients(0.0, 2.0, 4.0);
        assert!((c.bias_stability_norm() - 1.0).abs() < f32::EPSILON);
    }

    // -- Scaling --

    #[test]
    fn noise_scale_is_finite_for_zero_dt() {
        let c = coefficients(0.5, 0.1, 100.0);
        let scale = c.noise_scale(0.0);
        assert!(scale.is_finite());
        assert!((scale - 0.5 / 1.0e-3_f32.sqrt()).abs() < 1e-3);
        assert!(c.noise_scale(-1.0).is_finite());
        assert!(c.noise_scale(f32::NAN).is_finite());
    }

    #[test]
    fn noise_scale_uses_dt_above_floor() {
        let c = coefficients(1.0, 0.0, 1.0);
        assert!((c.noise_scale(0.01) - 10.0).abs() < 1e-4);
    }

    // -- Application --

    #[test]
    fn zero_dt_returns_truth_plus_bias_without_sampling() {
        let mut noise = GaussMarkovNoise::new(coefficients(1.0, 1.0, 1.0), 0.25).unwrap();
        let mut sampler = GaussianSampler::new(7);
        let measured = noise.apply(2.0, 0.0, &mut sampler);
        assert!((measured - 2.25).abs() < f32::EPSILON);
        assert!((noise.bias() - 0.25).abs() < f32::EPSILON);
        assert_eq!(sampler.next(), GaussianSampler::new(7).next());
    }

    #[test]
    fn noiseless_passes_through() {
        let mut noise = GaussMarkovNoise::noiseless();
        let mut sampler = GaussianSampler::new(1);
        for _ in 0..100 {
            assert!((noise.apply(3.5, 0.01, &mut sampler) - 3.5).abs() < f32::EPSILON);
        }
        assert!(noise.is_noiseless());
    }

    #[test]
    fn reset_restores_turn_on_bias() {
        let mut noise = GaussMarkovNoise::new(coefficients(0.0, 1.0, 1.0), 0.5).unwrap();
        let mut sampler = GaussianSampler::new(3);
        for _ in 0..10 {
            noise.apply(0.0, 0.1, &mut sampler);
        }
        assert!((noise.bias() - 0.5).abs() > f32::EPSILON);
        noise.reset();
        assert!((noise.bias() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn perturb_shares_bias_until_advanced() {
        let mut noise = GaussMarkovNoise::new(coefficients(0.0, 1.0, 1.0), 1.0).unwrap();
        let mut sampler = GaussianSampler::new(5);
        let a = noise.perturb(-50.0, 0.1, &mut sampler);
        let b = noise.perturb(-60.0, 0.1, &mut sampler);
        assert!((a - -49.0).abs() < 1e-5);
        assert!((b - -59.0).abs() < 1e-5);
        noise.advance_bias(0.1, &mut sampler);
        assert!((noise.bias() - 1.0).abs() > f32::EPSILON);
        let before = noise.bias();
        noise.advance_bias(0.0, &mut sampler);
        assert!((noise.bias() - before).abs() < f32::EPSILON);
    }

    #[test]
    fn same_seed_reproduces_bias_sequence() {
        let run = || {
            let mut noise = GaussMarkovNoise::new(coefficients(0.1, 0.2, 10.0), 0.0).unwrap();
            let mut sampler = GaussianSampler::new(11);
            (0..200)
                .map(|_| {
                    noise.apply(0.0, 0.005, &mut sampler);
                    noise.bias()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    // -- Statistics --

    #[test]
    fn white_noise_variance_matches_density() {
        // density 0.2 at dt 0.01 -> std 2.0
        let mut noise = GaussMarkovNoise::new(coefficients(0.2, 0.0, 1.0), 0.0).unwrap();
        let mut sampler = GaussianSampler::new(2024);
        let samples: Vec<f64> = (0..20_000)
            .map(|_| f64::from(noise.apply(0.0, 0.01, &mut sampler)))
            .collect();
        let (mean, var) = mean_and_variance(&samples);
        assert!(mean.abs() < 0.06, "mean {mean}");
        assert!((var - 4.0).abs() / 4.0 < 0.05, "variance {var}");
    }

    #[test]
    fn bias_increments_match_stability_norm() {
        // norm = 1 / sqrt(4) = 0.5; variance per step = 0.25 * dt
        let dt = 0.04_f32;
        let mut noise = GaussMarkovNoise::new(coefficients(0.0, 1.0, 4.0), 0.0).unwrap();
        let mut sampler = GaussianSampler::new(77);
        let mut previous = noise.bias();
        let increments: Vec<f64> = (0..20_000)
            .map(|_| {
                noise.apply(0.0, dt, &mut sampler);
                let step = f64::from(noise.bias() - previous);
                previous = noise.bias();
                step
            })
            .collect();
        let (mean, var) = mean_and_variance(&increments);
        let expected = 0.25 * f64::from(dt);
        assert!(mean.abs() < 0.003, "mean {mean}");
        assert!((var - expected).abs() / expected < 0.05, "variance {var}");
    }

    // -- Error display --

    #[test]
    fn noise_error_display_messages() {
        assert_eq!(
            NoiseError::InvalidDensity { value: -1.0 }.to_string(),
            "noise density must be finite and >= 0, got -1"
        );
        assert_eq!(
            NoiseError::InvalidTimeConstant { tau: 0.0 }.to_string(),
            "tau must be finite and > 0, got 0"
        );
        assert_eq!(
            NoiseError::InvalidSampleTime { value: -0.5 }.to_string(),
            "min_sample_time must be finite and > 0, got -0.5"
        );
    }

    // -- Send + Sync --

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn models_are_send_sync() {
        assert_send_sync::<GaussMarkovNoise>();
        assert_send_sync::<NoiseError>();
    }
}

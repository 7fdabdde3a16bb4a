//! Pre-configured IMU noise parameters.
//!
//! Parameters are derived from typical datasheets. Datasheets quote white
//! noise as a spectral density and bias drift either as a bias instability
//! with a correlation time or as a rate random walk. The model uses
//!
//! ```text
//! bias_instability = rate_random_walk * sqrt(tau)
//! ```
//!
//! so both forms map onto the same coefficients.

use simsense_core::config::{AxisNoiseParams, ImuParams};

use crate::sampler::GaussianSampler;

/// Correlation time assumed for the consumer MEMS presets (s).
pub const CONSUMER_TAU: f32 = 300.0;

/// Turn-on bias standard deviation of a consumer MEMS gyroscope (rad/s).
pub const CONSUMER_GYRO_TURN_ON_STD: f32 = 0.01;

/// Turn-on bias standard deviation of a consumer MEMS accelerometer (m/s²).
pub const CONSUMER_ACCEL_TURN_ON_STD: f32 = 0.05;

// ---------------------------------------------------------------------------
// IMU presets
// ---------------------------------------------------------------------------

/// Navigation-grade MEMS IMU; the default configuration.
///
/// - Gyro ARW `0.30 deg/sqrt(h)`, bias stability `4.6 deg/h`, tau `500 s`
/// - Accel VRW `0.24 mg/sqrt(Hz)`, bias stability `36 µg`, tau `800 s`
#[must_use]
pub fn navigation_grade_imu() -> ImuParams {
    ImuParams::default()
}

/// Consumer MEMS gyroscope channel.
///
/// - Noise density: `0.000_18 rad/s/sqrt(Hz)`
/// - Rate random walk: `0.000_04 rad/s²/sqrt(Hz)`
#[must_use]
pub fn consumer_mems_gyro() -> AxisNoiseParams {
    AxisNoiseParams {
        white_noise_density: 0.000_18,
        bias_instability: 0.000_04 * CONSUMER_TAU.sqrt(),
        tau: CONSUMER_TAU,
        turn_on_bias: [0.0; 3],
    }
}

/// Consumer MEMS accelerometer channel.
///
/// - Noise density: `0.003 m/s²/sqrt(Hz)`
/// - Rate random walk: `0.000_4 m/s³/sqrt(Hz)`
#[must_use]
pub fn consumer_mems_accel() -> AxisNoiseParams {
    AxisNoiseParams {
        white_noise_density: 0.003,
        bias_instability: 0.000_4 * CONSUMER_TAU.sqrt(),
        tau: CONSUMER_TAU,
        turn_on_bias: [0.0; 3],
    }
}

/// Consumer MEMS IMU with zero turn-on bias. See [`with_random_turn_on_bias`]
/// to draw a per-unit offset.
#[must_use]
pub fn consumer_mems_imu() -> ImuParams {
    ImuParams {
        gyro: consumer_mems_gyro(),
        accel: consumer_mems_accel(),
        ..ImuParams::default()
    }
}

/// An IMU that reports ground truth exactly.
#[must_use]
pub fn ideal_imu() -> ImuParams {
    ImuParams::noiseless()
}

/// Look up an IMU preset by name (`navigation`, `consumer`, `ideal`).
#[must_use]
pub fn imu_by_name(name: &str) -> Option<ImuParams> {
    match name {
        "navigation" | "navigation-grade" => Some(navigation_grade_imu()),
        "consumer" | "consumer-mems" => Some(consumer_mems_imu()),
        "ideal" | "noiseless" => Some(ideal_imu()),
        _ => None,
    }
}

/// Draw a turn-on bias for each axis from `N(0, std²)`, simulating
/// unit-to-unit variation.
#[must_use]
pub fn with_random_turn_on_bias(
    mut params: ImuParams,
    gyro_std: f32,
    accel_std: f32,
    sampler: &mut GaussianSampler,
) -> ImuParams {
    let gyro = sampler.next_vector() * gyro_std;
    let accel = sampler.next_vector() * accel_std;
    params.gyro.turn_on_bias = gyro.into();
    params.accel.turn_on_bias = accel.into();
    params
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

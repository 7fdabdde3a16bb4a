//! Inertial measurement unit: noisy body-frame angular velocity and specific
//! force from ground truth.

use std::sync::Arc;

use nalgebra::{UnitQuaternion, Vector3};
use serde::Serialize;
use simsense_core::config::ImuParams;
use simsense_core::error::ConfigError;
use simsense_core::report::StateReporter;
use simsense_core::time::SimTime;
use simsense_core::traits::UpdatableState;
use simsense_core::types::{GroundTruth, GroundTruthHandle};
use simsense_noise::sampler::GaussianSampler;
use simsense_noise::vector::AxisNoise;
use tracing::debug;

use crate::base::SensorBase;
use crate::buffer::BufferReader;
use crate::sensor::{Sensor, SensorKind};

// ---------------------------------------------------------------------------
// ImuOutput
// ---------------------------------------------------------------------------

/// One IMU measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImuOutput {
    /// Simulation time of the ground truth the sample was taken from.
    pub time_stamp: SimTime,
    /// Body orientation in the world frame, noise-free.
    pub orientation: UnitQuaternion<f32>,
    /// Body-frame angular velocity (rad/s).
    pub angular_velocity: Vector3<f32>,
    /// Body-frame specific force (m/s²); reads `-g` at rest.
    pub linear_acceleration: Vector3<f32>,
}

impl Default for ImuOutput {
    fn default() -> Self {
        Self {
            time_stamp: SimTime::ZERO,
            orientation: UnitQuaternion::identity(),
            angular_velocity: Vector3::zeros(),
            linear_acceleration: Vector3::zeros(),
        }
    }
}

/// Exact body-frame `(angular_velocity, specific_force)` for a ground truth.
///
/// Specific force is `R⁻¹ · (a_world − g)`.
#[must_use]
pub fn ideal_measurement(ground_truth: &GroundTruth) -> (Vector3<f32>, Vector3<f32>) {
    let kinematics = &ground_truth.kinematics;
    let specific_force = kinematics
        .pose
        .to_body_frame(&(kinematics.accelerations.linear - ground_truth.environment.gravity));
    (kinematics.twist.angular, specific_force)
}

// ---------------------------------------------------------------------------
// ImuSensor
// ---------------------------------------------------------------------------

/// Gyroscope plus accelerometer, sampled on every tick.
///
/// Noise is drawn from one seeded stream in a fixed order (gyro white, gyro
/// bias walk, accel white, accel bias walk), so a seed reproduces a run.
#[derive(Debug)]
pub struct ImuSensor {
    base: SensorBase<ImuOutput>,
    params: ImuParams,
    gyro: AxisNoise,
    accel: AxisNoise,
    sampler: GaussianSampler,
    update_count: u64,
}

impl ImuSensor {
    /// Create an IMU whose noise stream starts from `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `params` fail validation.
    pub fn new(name: impl Into<String>, params: ImuParams, seed: u64) -> Result<Self, ConfigError> {
        let name = name.into();
        params.validate().map_err(|e| prefix_field(&name, e))?;
        let gyro = AxisNoise::from_params(&params.gyro, params.min_sample_time)
            .map_err(|e| ConfigError::invalid(format!("{name}.gyro"), e.to_string()))?;
        let accel = AxisNoise::from_params(&params.accel, params.min_sample_time)
            .map_err(|e| ConfigError::invalid(format!("{name}.accel"), e.to_string()))?;
        Ok(Self {
            base: SensorBase::new(name),
            params,
            gyro,
            accel,
            sampler: GaussianSampler::new(seed),
            update_count: 0,
        })
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn initialize(&mut self, ground_truth: GroundTruthHandle) {
        self.base.initialize(ground_truth);
        debug!(sensor = self.base.name(), seed = self.sampler.seed(), "imu initialized");
        self.reset();
    }

    pub const fn is_initialized(&self) -> bool {
        self.base.is_initialized()
    }

    pub const fn params(&self) -> &ImuParams {
        &self.params
    }

    /// Current gyroscope bias per axis.
    pub const fn gyro_bias(&self) -> &Vector3<f32> {
        self.gyro.bias()
    }

    /// Current accelerometer bias per axis.
    pub const fn accel_bias(&self) -> &Vector3<f32> {
        self.accel.bias()
    }

    pub const fn update_count(&self) -> u64 {
        self.update_count
    }

    pub fn output(&self) -> Arc<ImuOutput> {
        self.base.output()
    }

    pub fn output_reader(&self) -> BufferReader<ImuOutput> {
        self.base.output_reader()
    }

    fn measure(&mut self, dt: f32) -> ImuOutput {
        let ground_truth = self.base.ground_truth_snapshot();
        let (angular_velocity, specific_force) = ideal_measurement(&ground_truth);
        let angular_velocity = self.gyro.apply(&angular_velocity, dt, &mut self.sampler);
        let linear_acceleration = self.accel.apply(&specific_force, dt, &mut self.sampler);
        ImuOutput {
            time_stamp: ground_truth.time,
            orientation: ground_truth.kinematics.pose.orientation,
            angular_velocity,
            linear_acceleration,
        }
    }
}

fn prefix_field(name: &str, err: ConfigError) -> ConfigError {
    match err {
        ConfigError::InvalidValue { field, message } => ConfigError::InvalidValue {
            field: format!("{name}.{field}"),
            message,
        },
        other => other,
    }
}

impl UpdatableState for ImuSensor {
    /// Restore turn-on biases, rewind the noise stream and publish a
    /// bias-only sample of the current ground truth.
    ///
    /// # Panics
    ///
    /// Panics if the sensor has not been initialized.
    fn reset(&mut self) {
        self.gyro.reset();
        self.accel.reset();
        self.sampler.reset();
        self.update_count = 0;
        let output = self.measure(0.0);
        self.base.set_output(output);
        debug!(sensor = self.base.name(), "imu reset");
    }

    fn update(&mut self, dt: f32) {
        let output = self.measure(dt);
        self.base.set_output(output);
        self.update_count += 1;
    }

    fn report_state(&self, reporter: &mut StateReporter) {
        reporter.write_heading(self.base.name());
        reporter.write_value("Imu-UpdateCount", self.update_count);
        reporter.write_value("Imu-MinSampleTime", self.params.min_sample_time);
        reporter.write_vector("Imu-GyroBias", self.gyro.bias());
        reporter.write_vector("Imu-AccelBias", self.accel.bias());
        let output = self.base.output();
        reporter.write_value("Imu-TimeStamp", output.time_stamp);
        reporter.write_vector("Imu-AngularVelocity", &output.angular_velocity);
        reporter.write_vector("Imu-LinearAcceleration", &output.linear_acceleration);
    }
}

impl Sensor for ImuSensor {
    type Output = ImuOutput;
    type Input = ();

    const KIND: SensorKind = SensorKind::Imu;

    fn name(&self) -> &str {
        self.base.name()
    }

    fn initialize(&mut self, ground_truth: GroundTruthHandle) {
        Self::initialize(self, ground_truth);
    }

    fn is_initialized(&self) -> bool {
        self.base.is_initialized()
    }

    fn output(&self) -> Arc<ImuOutput> {
        self.base.output()
    }

    fn set_output(&self, output: ImuOutput) {
        self.base.set_output(output);
    }

    fn output_reader(&self) -> BufferReader<ImuOutput> {
        self.base.output_reader()
    }

    fn input(&self) -> Arc<()> {
        self.base.input()
    }

    fn set_input(&self, input: ()) {
        self.base.set_input(input);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

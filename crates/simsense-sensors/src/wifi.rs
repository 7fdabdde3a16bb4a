//! Rate-limited wifi beacon ranging sensor.
//!
//! The sensor itself only handles pacing, poses and noise. Finding which
//! beacons are audible is delegated to a [`BeaconScanner`] supplied by the
//! host (a renderer ray-caster, or the built-in
//! [`LogDistanceScanner`](crate::scanner::LogDistanceScanner)).
//!
//! ```text
//! update(dt) ─► limiter ─► slot fired? ─► scanner.update_pose ─► scanner.update_rays
//!                                              │
//!                                              └─► RSSI noise ─► publish WifiSensorData
//!                                                                   └─► scanner.apply_feedback(input)
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use nalgebra::Vector3;
use serde::Serialize;
use simsense_core::config::WifiParams;
use simsense_core::error::ConfigError;
use simsense_core::report::StateReporter;
use simsense_core::time::{FrequencyLimiter, SimTime};
use simsense_core::traits::UpdatableState;
use simsense_core::types::{GroundTruthHandle, Pose};
use simsense_noise::model::GaussMarkovNoise;
use simsense_noise::sampler::GaussianSampler;
use tracing::debug;

use crate::base::SensorBase;
use crate::buffer::{BufferReader, SensorBuffer};
use crate::sensor::{Sensor, SensorKind};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A beacon heard during one scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeaconHit {
    pub id: String,
    /// Beacon position in the world frame (m).
    pub position: Vector3<f32>,
    /// Received signal strength (dBm).
    pub rssi: f32,
}

/// One wifi measurement, also used as the sensor's input.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WifiSensorData {
    pub time_stamp: SimTime,
    /// Sensor pose; relative to the vehicle unless the sensor is external.
    pub pose: Pose,
    pub beacons: Vec<BeaconHit>,
}

impl WifiSensorData {
    /// Strongest beacon in this measurement.
    pub fn strongest(&self) -> Option<&BeaconHit> {
        self.beacons
            .iter()
            .max_by(|a, b| a.rssi.total_cmp(&b.rssi))
    }

    pub fn find(&self, id: &str) -> Option<&BeaconHit> {
        self.beacons.iter().find(|hit| hit.id == id)
    }
}

// ---------------------------------------------------------------------------
// BeaconScanner
// ---------------------------------------------------------------------------

/// Host hook that determines which beacons the sensor can hear.
pub trait BeaconScanner: Send + Sync {
    /// Place the sensor for the next scan. `sensor_pose` is relative to
    /// `vehicle_pose`; `vehicle_pose` is the identity for external sensors.
    fn update_pose(&mut self, sensor_pose: &Pose, vehicle_pose: &Pose);

    /// Run one scan from the last pose.
    fn update_rays(&mut self) -> Vec<BeaconHit>;

    /// Sensor pose in the scanner's local NED frame.
    fn local_pose(&self) -> Pose;

    /// Suspend or resume scanning work on the host.
    fn pause(&mut self, paused: bool);

    /// Receive the sensor's current input after each measurement.
    fn apply_feedback(&mut self, input: &WifiSensorData) {
        let _ = input;
    }
}

// ---------------------------------------------------------------------------
// WifiSensor
// ---------------------------------------------------------------------------

/// Wifi ranging sensor producing [`WifiSensorData`] at `update_frequency`.
pub struct WifiSensor {
    base: SensorBase<WifiSensorData, WifiSensorData>,
    params: WifiParams,
    relative_pose: Pose,
    limiter: FrequencyLimiter,
    scanner: Box<dyn BeaconScanner>,
    rssi_noise: GaussMarkovNoise,
    sampler: GaussianSampler,
    last_generation_time: Duration,
}

impl std::fmt::Debug for WifiSensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WifiSensor")
            .field("name", &self.base.name())
            .field("params", &self.params)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

impl WifiSensor {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `params` fail validation.
    pub fn new(
        name: impl Into<String>,
        params: WifiParams,
        scanner: Box<dyn BeaconScanner>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        params.validate().map_err(|e| match e {
            ConfigError::InvalidValue { field, message } => ConfigError::InvalidValue {
                field: format!("{name}.{field}"),
                message,
            },
            other => other,
        })?;
        let rssi_noise = GaussMarkovNoise::from_params(&params.rssi_noise, params.min_sample_time)
            .map_err(|e| ConfigError::invalid(format!("{name}.rssi_noise"), e.to_string()))?;
        Ok(Self {
            base: SensorBase::new(name),
            relative_pose: params.relative_pose.to_pose(),
            limiter: FrequencyLimiter::new(
                params.update_frequency,
                params.startup_delay,
                params.start_paused,
            ),
            params,
            scanner,
            rssi_noise,
            sampler: GaussianSampler::new(seed),
            last_generation_time: Duration::ZERO,
        })
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn initialize(&mut self, ground_truth: GroundTruthHandle) {
        self.base.initialize(ground_truth);
        debug!(
            sensor = self.base.name(),
            frequency = self.params.update_frequency,
            "wifi initialized"
        );
        self.reset();
    }

    pub const fn is_initialized(&self) -> bool {
        self.base.is_initialized()
    }

    pub const fn params(&self) -> &WifiParams {
        &self.params
    }

    pub const fn limiter(&self) -> &FrequencyLimiter {
        &self.limiter
    }

    /// Sensor pose relative to the vehicle.
    pub const fn relative_pose(&self) -> &Pose {
        &self.relative_pose
    }

    /// Current RSSI bias (dB).
    pub const fn rssi_bias(&self) -> f32 {
        self.rssi_noise.bias()
    }

    /// Wall-clock time spent in the last scan.
    pub const fn last_generation_time(&self) -> Duration {
        self.last_generation_time
    }

    pub fn output(&self) -> Arc<WifiSensorData> {
        self.base.output()
    }

    pub fn output_reader(&self) -> BufferReader<WifiSensorData> {
        self.base.output_reader()
    }

    pub fn input(&self) -> Arc<WifiSensorData> {
        self.base.input()
    }

    pub fn set_input(&self, input: WifiSensorData) {
        self.base.set_input(input);
    }

    /// Writer handle for feeding input from another thread.
    pub fn input_writer(&self) -> SensorBuffer<WifiSensorData> {
        self.base.input_writer()
    }

    /// Pause or resume both pacing and the scanner. While paused the limiter
    /// fires no slots and the last output stays published.
    pub fn set_paused(&mut self, paused: bool) {
        self.limiter.set_paused(paused);
        self.scanner.pause(paused);
    }

    pub const fn is_paused(&self) -> bool {
        self.limiter.is_paused()
    }

    /// Resume a scanner paused by `pause_after_measurement`.
    pub fn resume_scanner(&mut self) {
        self.scanner.pause(false);
    }

    fn update_output(&mut self) {
        let ground_truth = self.base.ground_truth_snapshot();
        let vehicle_pose = if self.params.external {
            Pose::identity()
        } else {
            ground_truth.kinematics.pose
        };

        let started = Instant::now();
        self.scanner.update_pose(&self.relative_pose, &vehicle_pose);
        let mut beacons = self.scanner.update_rays();
        self.last_generation_time = started.elapsed();
        debug!(
            sensor = self.base.name(),
            elapsed_us = self.last_generation_time.as_micros(),
            beacons = beacons.len(),
            "wifi sensor data generated"
        );

        let dt = self.limiter.last_elapsed_interval().as_secs_f32();
        for hit in &mut beacons {
            hit.rssi = self.rssi_noise.perturb(hit.rssi, dt, &mut self.sampler);
        }
        self.rssi_noise.advance_bias(dt, &mut self.sampler);

        let pose = if self.params.external && self.params.external_ned {
            self.scanner.local_pose()
        } else {
            self.relative_pose
        };
        self.base.set_output(WifiSensorData {
            time_stamp: self.limiter.last_time(),
            pose,
            beacons,
        });
    }

    fn update_input(&mut self) {
        let input = self.base.input();
        self.scanner.apply_feedback(&input);
    }
}

impl UpdatableState for WifiSensor {
    /// Restart pacing at the current ground-truth time, publish a fresh scan
    /// and clear the input.
    ///
    /// # Panics
    ///
    /// Panics if the sensor has not been initialized.
    fn reset(&mut self) {
        let now = self.base.ground_truth_snapshot().time;
        self.limiter.reset(now);
        self.rssi_noise.reset();
        self.sampler.reset();
        self.update_output();
        self.base.set_input(WifiSensorData::default());
        debug!(sensor = self.base.name(), "wifi reset");
    }

    fn update(&mut self, dt: f32) {
        self.limiter.update(dt);
        if !self.limiter.is_wait_complete() {
            return;
        }
        if self.params.pause_after_measurement {
            self.scanner.pause(false);
        }
        self.update_output();
        self.update_input();
        if self.params.pause_after_measurement {
            self.scanner.pause(true);
        }
    }

    fn report_state(&self, reporter: &mut StateReporter) {
        reporter.write_heading(self.base.name());
        reporter.write_value("Wifi-MeasurementFreq", self.params.measurement_frequency);
        reporter.write_value("Wifi-UpdateFreq", self.params.update_frequency);
        reporter.write_value("Wifi-EffectiveFreq", self.limiter.effective_frequency());
        reporter.write_value("Wifi-UpdateCount", self.limiter.update_count());
        reporter.write_value("Wifi-MeasurementCount", self.limiter.fire_count());
        reporter.write_value("Wifi-LastTime", self.limiter.last_time());
        reporter.write_value("Wifi-Paused", self.limiter.is_paused());
        reporter.write_value("Wifi-RssiBias", self.rssi_noise.bias());
        reporter.write_value(
            "Wifi-GenerationMicros",
            self.last_generation_time.as_micros(),
        );
        reporter.write_value("Wifi-BeaconCount", self.base.output().beacons.len());
    }
}

impl Sensor for WifiSensor {
    type Output = WifiSensorData;
    type Input = WifiSensorData;

    const KIND: SensorKind = SensorKind::Wifi;

    fn name(&self) -> &str {
        self.base.name()
    }

    fn initialize(&mut self, ground_truth: GroundTruthHandle) {
        Self::initialize(self, ground_truth);
    }

    fn is_initialized(&self) -> bool {
        self.base.is_initialized()
    }

    fn output(&self) -> Arc<WifiSensorData> {
        self.base.output()
    }

    fn set_output(&self, output: WifiSensorData) {
        self.base.set_output(output);
    }

    fn output_reader(&self) -> BufferReader<WifiSensorData> {
        self.base.output_reader()
    }

    fn input(&self) -> Arc<WifiSensorData> {
        self.base.input()
    }

    fn set_input(&self, input: WifiSensorData) {
        self.base.set_input(input);
    }

    fn rate_hz(&self) -> Option<f64> {
        self.limiter
            .is_limited()
            .then_some(f64::from(self.params.update_frequency))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

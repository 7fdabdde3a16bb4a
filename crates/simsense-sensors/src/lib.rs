//! Simulated vehicle sensors driven by physics ground truth.
//!
//! Each sensor follows the same lifecycle: bind a [`GroundTruthHandle`](simsense_core::types::GroundTruthHandle)
//! with `initialize`, then `update(dt)` once per physics tick. Measurements
//! are published to a single-slot buffer that consumers on other threads
//! read through a [`BufferReader`](buffer::BufferReader).
//!
//! - [`imu`]: gyroscope and accelerometer with Gauss-Markov noise.
//! - [`wifi`]: rate-limited beacon ranging with a pluggable
//!   [`BeaconScanner`](wifi::BeaconScanner).
//! - [`scanner`]: built-in log-distance beacon scanner.
//! - [`collection`]: named sensor suites built from configuration.

pub mod base;
pub mod buffer;
pub mod collection;
pub mod imu;
pub mod scanner;
pub mod sensor;
pub mod wifi;

pub use sensor::{Sensor, SensorDriver, SensorKind};

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::base::SensorBase;
    pub use crate::buffer::{BufferReader, SensorBuffer};
    pub use crate::collection::SensorCollection;
    pub use crate::imu::{ImuOutput, ImuSensor, ideal_measurement};
    pub use crate::scanner::LogDistanceScanner;
    pub use crate::sensor::{Sensor, SensorDriver, SensorKind};
    pub use crate::wifi::{BeaconHit, BeaconScanner, WifiSensor, WifiSensorData};
}

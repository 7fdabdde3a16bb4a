use std::collections::HashSet;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::types::{Pose, STANDARD_GRAVITY};

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

/// 0.30 deg/sqrt(hour) in rad/sqrt(s).
fn default_gyro_arw() -> f32 {
    0.30 / 3600.0_f32.sqrt() * DEG_TO_RAD
}
const fn default_gyro_tau() -> f32 {
    500.0
}
/// 4.6 deg/hour in rad/s.
fn default_gyro_bias_stability() -> f32 {
    4.6 / 3600.0 * DEG_TO_RAD
}
/// 0.24 mg/sqrt(Hz) in m/s²/sqrt(Hz).
fn default_accel_vrw() -> f32 {
    0.24 * STANDARD_GRAVITY / 1.0e3
}
const fn default_accel_tau() -> f32 {
    800.0
}
/// 36 µg in m/s².
fn default_accel_bias_stability() -> f32 {
    36.0e-6 * STANDARD_GRAVITY
}
const fn default_min_sample_time() -> f32 {
    1.0 / 1000.0
}
const fn default_update_frequency() -> f32 {
    10.0
}
const fn default_true() -> bool {
    true
}
const fn default_scalar_tau() -> f32 {
    1.0
}
const fn default_tx_power() -> f32 {
    -40.0
}
const fn default_path_loss_exponent() -> f32 {
    2.0
}
const fn default_rssi_threshold() -> f32 {
    -90.0
}
const fn default_max_range() -> f32 {
    100.0
}

fn check_non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::invalid(
            field,
            format!("must be finite and >= 0, got {value}"),
        ));
    }
    Ok(())
}

fn check_positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::invalid(
            field,
            format!("must be finite and > 0, got {value}"),
        ));
    }
    Ok(())
}

fn check_finite(field: &str, values: &[f32]) -> Result<(), ConfigError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ConfigError::invalid(field, "must be finite"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Noise channel parameters
// ---------------------------------------------------------------------------

/// Noise coefficients for one 3-axis channel (gyroscope or accelerometer).
///
/// `white_noise_density` is the angle random walk for a gyroscope
/// (rad/s/sqrt(Hz)) or the velocity random walk for an accelerometer
/// (m/s²/sqrt(Hz)). `bias_instability` uses the channel's signal unit and
/// `tau` is the bias correlation time in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisNoiseParams {
    #[serde(alias = "arw", alias = "vrw")]
    pub white_noise_density: f32,
    #[serde(alias = "bias_stability")]
    pub bias_instability: f32,
    pub tau: f32,
    #[serde(default)]
    pub turn_on_bias: [f32; 3],
}

impl AxisNoiseParams {
    /// Navigation-grade gyroscope defaults.
    #[must_use]
    pub fn gyro_default() -> Self {
        Self {
            white_noise_density: default_gyro_arw(),
            bias_instability: default_gyro_bias_stability(),
            tau: default_gyro_tau(),
            turn_on_bias: [0.0; 3],
        }
    }

    /// Navigation-grade accelerometer defaults.
    #[must_use]
    pub fn accel_default() -> Self {
        Self {
            white_noise_density: default_accel_vrw(),
            bias_instability: default_accel_bias_stability(),
            tau: default_accel_tau(),
            turn_on_bias: [0.0; 3],
        }
    }

    /// A channel that adds no noise and no bias.
    #[must_use]
    pub const fn noiseless() -> Self {
        Self {
            white_noise_density: 0.0,
            bias_instability: 0.0,
            tau: 1.0,
            turn_on_bias: [0.0; 3],
        }
    }

    #[must_use]
    pub fn turn_on_bias_vector(&self) -> Vector3<f32> {
        Vector3::from(self.turn_on_bias)
    }

    /// Validate coefficients; `prefix` names the channel in error messages.
    pub fn validate(&self, prefix: &str) -> Result<(), ConfigError> {
        check_non_negative(
            &format!("{prefix}.white_noise_density"),
            self.white_noise_density,
        )?;
        check_non_negative(&format!("{prefix}.bias_instability"), self.bias_instability)?;
        check_positive(&format!("{prefix}.tau"), self.tau)?;
        check_finite(&format!("{prefix}.turn_on_bias"), &self.turn_on_bias)
    }
}

/// Noise coefficients for a single scalar channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalarNoiseParams {
    #[serde(default)]
    pub white_noise_density: f32,
    #[serde(default)]
    pub bias_instability: f32,
    #[serde(default = "default_scalar_tau")]
    pub tau: f32,
    #[serde(default)]
    pub turn_on_bias: f32,
}

impl ScalarNoiseParams {
    #[must_use]
    pub const fn noiseless() -> Self {
        Self {
            white_noise_density: 0.0,
            bias_instability: 0.0,
            tau: 1.0,
            turn_on_bias: 0.0,
        }
    }

    /// `true` if the channel can never alter a signal.
    #[must_use]
    pub fn is_noiseless(&self) -> bool {
        self.white_noise_density == 0.0 && self.bias_instability == 0.0 && self.turn_on_bias == 0.0
    }

    pub fn validate(&self, prefix: &str) -> Result<(), ConfigError> {
        check_non_negative(
            &format!("{prefix}.white_noise_density"),
            self.white_noise_density,
        )?;
        check_non_negative(&format!("{prefix}.bias_instability"), self.bias_instability)?;
        check_positive(&format!("{prefix}.tau"), self.tau)?;
        check_finite(&format!("{prefix}.turn_on_bias"), &[self.turn_on_bias])
    }
}

impl Default for ScalarNoiseParams {
    fn default() -> Self {
        Self::noiseless()
    }
}

// ---------------------------------------------------------------------------
// ImuParams
// ---------------------------------------------------------------------------

/// Static configuration of an inertial measurement unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuParams {
    #[serde(default = "AxisNoiseParams::gyro_default")]
    pub gyro: AxisNoiseParams,
    #[serde(default = "AxisNoiseParams::accel_default")]
    pub accel: AxisNoiseParams,
    /// Floor applied to `dt` before computing noise scales (internal IMU
    /// sample period, seconds).
    #[serde(default = "default_min_sample_time")]
    pub min_sample_time: f32,
}

impl Default for ImuParams {
    fn default() -> Self {
        Self {
            gyro: AxisNoiseParams::gyro_default(),
            accel: AxisNoiseParams::accel_default(),
            min_sample_time: default_min_sample_time(),
        }
    }
}

impl ImuParams {
    /// An IMU that reports the transformed ground truth exactly.
    #[must_use]
    pub fn noiseless() -> Self {
        Self {
            gyro: AxisNoiseParams::noiseless(),
            accel: AxisNoiseParams::noiseless(),
            min_sample_time: default_min_sample_time(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gyro.validate("gyro")?;
        self.accel.validate("accel")?;
        check_positive("min_sample_time", self.min_sample_time)
    }
}

// ---------------------------------------------------------------------------
// Poses
// ---------------------------------------------------------------------------

/// Mounting pose with orientation in degrees, as written in config files.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseConfig {
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub roll: f32,
    #[serde(default)]
    pub pitch: f32,
    #[serde(default)]
    pub yaw: f32,
}

impl PoseConfig {
    #[must_use]
    pub fn to_pose(&self) -> Pose {
        Pose::from_position_rpy(
            Vector3::from(self.position),
            self.roll * DEG_TO_RAD,
            self.pitch * DEG_TO_RAD,
            self.yaw * DEG_TO_RAD,
        )
    }

    pub fn validate(&self, prefix: &str) -> Result<(), ConfigError> {
        check_finite(&format!("{prefix}.position"), &self.position)?;
        check_finite(
            &format!("{prefix}.orientation"),
            &[self.roll, self.pitch, self.yaw],
        )
    }
}

// ---------------------------------------------------------------------------
// WifiParams
// ---------------------------------------------------------------------------

/// Static configuration of a wifi/beacon ranging sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WifiParams {
    /// Output rate in Hz; `0` produces a sample on every tick.
    #[serde(default = "default_update_frequency")]
    pub update_frequency: f32,
    /// Nominal measurement rate reported to telemetry (Hz).
    #[serde(default = "default_update_frequency")]
    pub measurement_frequency: f32,
    /// Delay before the first sample (s).
    #[serde(default)]
    pub startup_delay: f32,
    /// Start with pacing paused.
    #[serde(default)]
    pub start_paused: bool,
    /// Pause the beacon scanner after each sample.
    #[serde(default)]
    pub pause_after_measurement: bool,
    /// Sensor pose is not attached to the vehicle.
    #[serde(default)]
    pub external: bool,
    /// When external, report the scanner's local pose (NED).
    #[serde(default = "default_true")]
    pub external_ned: bool,
    /// Sensor pose relative to the vehicle.
    #[serde(default)]
    pub relative_pose: PoseConfig,
    /// RSSI noise (dBm/sqrt(Hz)).
    #[serde(default)]
    pub rssi_noise: ScalarNoiseParams,
    #[serde(default = "default_min_sample_time")]
    pub min_sample_time: f32,
}

impl Default for WifiParams {
    fn default() -> Self {
        Self {
            update_frequency: default_update_frequency(),
            measurement_frequency: default_update_frequency(),
            startup_delay: 0.0,
            start_paused: false,
            pause_after_measurement: false,
            external: false,
            external_ned: true,
            relative_pose: PoseConfig::default(),
            rssi_noise: ScalarNoiseParams::noiseless(),
            min_sample_time: default_min_sample_time(),
        }
    }
}

impl WifiParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("update_frequency", self.update_frequency)?;
        check_non_negative("measurement_frequency", self.measurement_frequency)?;
        check_non_negative("startup_delay", self.startup_delay)?;
        self.relative_pose.validate("relative_pose")?;
        self.rssi_noise.validate("rssi_noise")?;
        check_positive("min_sample_time", self.min_sample_time)
    }
}

// ---------------------------------------------------------------------------
// Beacon field
// ---------------------------------------------------------------------------

/// A transmitter for the built-in log-distance beacon scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconConfig {
    pub id: String,
    pub position: [f32; 3],
    /// Received power at 1 m (dBm).
    #[serde(default = "default_tx_power")]
    pub tx_power: f32,
    #[serde(default = "default_path_loss_exponent")]
    pub path_loss_exponent: f32,
}

/// Beacon field and detection limits for the built-in scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default)]
    pub beacons: Vec<BeaconConfig>,
    /// Beacons received below this power are not reported (dBm).
    #[serde(default = "default_rssi_threshold")]
    pub rssi_threshold: f32,
    /// Beacons further than this are not reported (m).
    #[serde(default = "default_max_range")]
    pub max_range: f32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            beacons: Vec::new(),
            rssi_threshold: default_rssi_threshold(),
            max_range: default_max_range(),
        }
    }
}

impl ScannerConfig {
    pub fn validate(&self, prefix: &str) -> Result<(), ConfigError> {
        check_finite(&format!("{prefix}.rssi_threshold"), &[self.rssi_threshold])?;
        check_positive(&format!("{prefix}.max_range"), self.max_range)?;
        let mut ids = HashSet::new();
        for beacon in &self.beacons {
            if !ids.insert(beacon.id.as_str()) {
                return Err(ConfigError::invalid(
                    format!("{prefix}.beacons"),
                    format!("duplicate beacon id {}", beacon.id),
                ));
            }
            check_finite(&format!("{prefix}.beacons.{}.position", beacon.id), &beacon.position)?;
            check_finite(&format!("{prefix}.beacons.{}.tx_power", beacon.id), &[beacon.tx_power])?;
            check_positive(
                &format!("{prefix}.beacons.{}.path_loss_exponent", beacon.id),
                beacon.path_loss_exponent,
            )?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SensorSuiteConfig
// ---------------------------------------------------------------------------

/// A named IMU in a sensor suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImuSetting {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(flatten)]
    pub params: ImuParams,
}

/// A named wifi ranging sensor in a sensor suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiSetting {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(flatten)]
    pub params: WifiParams,
    #[serde(default)]
    pub scanner: ScannerConfig,
}

/// All sensors of one vehicle, as loaded from a TOML file.
///
/// ```toml
/// seed = 42
///
/// [[imu]]
/// name = "imu"
/// min_sample_time = 0.001
/// gyro = { arw = 8.7e-5, bias_stability = 2.2e-5, tau = 500.0 }
///
/// [[wifi]]
/// name = "wifi"
/// update_frequency = 5.0
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorSuiteConfig {
    /// Run seed from which per-sensor noise seeds are derived.
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub imu: Vec<ImuSetting>,
    #[serde(default)]
    pub wifi: Vec<WifiSetting>,
}

impl SensorSuiteConfig {
    /// Validate every sensor and check that names are unique.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        let all_names = self
            .imu
            .iter()
            .map(|s| s.name.as_str())
            .chain(self.wifi.iter().map(|s| s.name.as_str()));
        for name in all_names {
            if name.is_empty() {
                return Err(ConfigError::MissingField("name".into()));
            }
            if !names.insert(name) {
                return Err(ConfigError::DuplicateSensorName(name.into()));
            }
        }
        for setting in &self.imu {
            setting
                .params
                .validate()
                .map_err(|e| prefix_error(&setting.name, e))?;
        }
        for setting in &self.wifi {
            setting
                .params
                .validate()
                .map_err(|e| prefix_error(&setting.name, e))?;
            setting
                .scanner
                .validate("scanner")
                .map_err(|e| prefix_error(&setting.name, e))?;
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        debug!(
            imu = config.imu.len(),
            wifi = config.wifi.len(),
            seed = config.seed,
            "parsed sensor suite config"
        );
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// One default IMU named `imu` and one default wifi sensor named `wifi`
    /// with two beacons.
    #[must_use]
    pub fn example() -> Self {
        Self {
            seed: 0,
            imu: vec![ImuSetting {
                name: "imu".into(),
                enabled: true,
                params: ImuParams::default(),
            }],
            wifi: vec![WifiSetting {
                name: "wifi".into(),
                enabled: true,
                params: WifiParams::default(),
                scanner: ScannerConfig {
                    beacons: vec![
                        BeaconConfig {
                            id: "ap-0".into(),
                            position: [10.0, 0.0, -3.0],
                            tx_power: default_tx_power(),
                            path_loss_exponent: default_path_loss_exponent(),
                        },
                        BeaconConfig {
                            id: "ap-1".into(),
                            position: [-15.0, 25.0, -3.0],
                            tx_power: default_tx_power(),
                            path_loss_exponent: default_path_loss_exponent(),
                        },
                    ],
                    ..ScannerConfig::default()
                },
            }],
        }
    }
}

fn prefix_error(sensor: &str, err: ConfigError) -> ConfigError {
    match err {
        ConfigError::InvalidValue { field, message } => ConfigError::InvalidValue {
            field: format!("{sensor}.{field}"),
            message,
        },
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

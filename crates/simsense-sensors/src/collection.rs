//! Named collection of heterogeneous sensors driven together.

use simsense_core::config::{SensorSuiteConfig, WifiSetting};
use simsense_core::error::{ConfigError, SensorError};
use simsense_core::report::StateReporter;
use simsense_core::seed::SeedHierarchy;
use simsense_core::traits::UpdatableState;
use simsense_core::types::GroundTruthHandle;
use tracing::{debug, info};

use crate::imu::ImuSensor;
use crate::scanner::LogDistanceScanner;
use crate::sensor::{Sensor, SensorDriver};
use crate::wifi::{BeaconScanner, WifiSensor};

// ---------------------------------------------------------------------------
// SensorCollection
// ---------------------------------------------------------------------------

/// All sensors of one vehicle, updated in insertion order.
///
/// ```
/// use simsense_core::config::ImuParams;
/// use simsense_core::traits::UpdatableState;
/// use simsense_core::types::GroundTruthHandle;
/// use simsense_sensors::prelude::*;
///
/// let mut sensors = SensorCollection::new();
/// sensors
///     .insert(Box::new(ImuSensor::new("imu", ImuParams::default(), 1).unwrap()))
///     .unwrap();
/// sensors.initialize_all(GroundTruthHandle::default());
/// sensors.update(0.01);
/// let imu = sensors.get::<ImuSensor>("imu").unwrap();
/// assert_eq!(imu.update_count(), 1);
/// ```
#[derive(Default)]
pub struct SensorCollection {
    sensors: Vec<Box<dyn SensorDriver>>,
}

impl SensorCollection {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sensors: Vec::new(),
        }
    }

    /// Build every enabled sensor in `config`, using the built-in
    /// [`LogDistanceScanner`] for wifi sensors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config fails validation.
    pub fn from_config(config: &SensorSuiteConfig) -> Result<Self, ConfigError> {
        Self::from_config_with_scanners(config, |setting| {
            Box::new(LogDistanceScanner::from_config(&setting.scanner))
        })
    }

    /// Build every enabled sensor in `config`, asking `make_scanner` for each
    /// wifi sensor's scanner.
    ///
    /// Noise seeds come from the config's run seed and each sensor's name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config fails validation.
    pub fn from_config_with_scanners<F>(
        config: &SensorSuiteConfig,
        mut make_scanner: F,
    ) -> Result<Self, ConfigError>
    where
        F: FnMut(&WifiSetting) -> Box<dyn BeaconScanner>,
    {
        config.validate()?;
        let seeds = SeedHierarchy::new(config.seed);
        let mut collection = Self::new();

        for setting in &config.imu {
            if !setting.enabled {
                debug!(sensor = %setting.name, "skipping disabled imu");
                continue;
            }
            let seed = seeds.sensor_seed(&setting.name);
            collection.insert(Box::new(ImuSensor::new(&setting.name, setting.params, seed)?))?;
        }
        for setting in &config.wifi {
            if !setting.enabled {
                debug!(sensor = %setting.name, "skipping disabled wifi");
                continue;
            }
            let seed = seeds.sensor_seed(&setting.name);
            let scanner = make_scanner(setting);
            collection.insert(Box::new(WifiSensor::new(
                &setting.name,
                setting.params,
                scanner,
                seed,
            )?))?;
        }

        info!(
            sensors = collection.len(),
            seed = config.seed,
            "built sensor suite"
        );
        Ok(collection)
    }

    /// Add a sensor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateSensorName`] if the name is taken.
    pub fn insert(&mut self, sensor: Box<dyn SensorDriver>) -> Result<(), ConfigError> {
        if self.contains(sensor.name()) {
            return Err(ConfigError::DuplicateSensorName(sensor.name().to_owned()));
        }
        self.sensors.push(sensor);
        Ok(())
    }

    /// Add a sensor. Returns `self` for chaining.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateSensorName`] if the name is taken.
    pub fn with(mut self, sensor: Box<dyn SensorDriver>) -> Result<Self, ConfigError> {
        self.insert(sensor)?;
        Ok(self)
    }

    /// Bind every sensor to `ground_truth` and reset it.
    pub fn initialize_all(&mut self, ground_truth: GroundTruthHandle) {
        for sensor in &mut self.sensors {
            sensor.initialize(ground_truth.clone());
        }
        info!(sensors = self.sensors.len(), "sensors initialized");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.driver(name).is_some()
    }

    /// Sensor names in update order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sensors.iter().map(|s| s.name())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn SensorDriver> {
        self.sensors.iter().map(|s| &**s)
    }

    #[must_use]
    pub fn driver(&self, name: &str) -> Option<&dyn SensorDriver> {
        self.iter().find(|s| s.name() == name)
    }

    /// Typed access to a sensor.
    ///
    /// # Errors
    ///
    /// [`SensorError::NotFound`] if no sensor has `name`,
    /// [`SensorError::KindMismatch`] if it is not an `S`.
    pub fn get<S: Sensor>(&self, name: &str) -> Result<&S, SensorError> {
        let driver = self
            .driver(name)
            .ok_or_else(|| SensorError::NotFound(name.to_owned()))?;
        driver
            .as_any()
            .downcast_ref::<S>()
            .ok_or_else(|| SensorError::KindMismatch {
                name: name.to_owned(),
                expected: S::KIND.as_str(),
                actual: driver.kind().as_str(),
            })
    }

    /// Mutable typed access to a sensor.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_mut<S: Sensor>(&mut self, name: &str) -> Result<&mut S, SensorError> {
        let driver = self
            .sensors
            .iter_mut()
            .find(|s| s.name() == name)
            .ok_or_else(|| SensorError::NotFound(name.to_owned()))?;
        let actual = driver.kind().as_str();
        driver
            .as_any_mut()
            .downcast_mut::<S>()
            .ok_or_else(|| SensorError::KindMismatch {
                name: name.to_owned(),
                expected: S::KIND.as_str(),
                actual,
            })
    }

    /// Full text report of every sensor's diagnostics.
    #[must_use]
    pub fn report(&self) -> StateReporter {
        let mut reporter = StateReporter::new();
        self.report_state(&mut reporter);
        reporter
    }
}

impl UpdatableState for SensorCollection {
    fn reset(&mut self) {
        for sensor in &mut self.sensors {
            sensor.reset();
        }
    }

    fn update(&mut self, dt: f32) {
        for sensor in &mut self.sensors {
            sensor.update(dt);
        }
    }

    fn report_state(&self, reporter: &mut StateReporter) {
        for sensor in &self.sensors {
            sensor.report_state(reporter);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use simsense_core::traits::UpdatableState;
use simsense_core::types::GroundTruthHandle;

use crate::buffer::BufferReader;

// ---------------------------------------------------------------------------
// SensorKind
// ---------------------------------------------------------------------------

/// Sensor families known to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Imu,
    Wifi,
}

impl SensorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Imu => "imu",
            Self::Wifi => "wifi",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Sensor
// ---------------------------------------------------------------------------

/// A simulated sensor with a typed output and input.
///
/// The simulation thread calls [`initialize`](Self::initialize) once, then
/// [`update`](UpdatableState::update) every physics tick. Consumers read the
/// output through [`output`](Self::output) or a [`BufferReader`].
pub trait Sensor: UpdatableState + Send + Sync + 'static {
    /// Measurement published by the sensor.
    type Output: Send + Sync + 'static;
    /// Externally supplied data; `()` for sensors without input.
    type Input: Send + Sync + 'static;

    const KIND: SensorKind;

    fn name(&self) -> &str;

    /// Bind the ground truth and [`reset`](UpdatableState::reset).
    fn initialize(&mut self, ground_truth: GroundTruthHandle);

    fn is_initialized(&self) -> bool;

    fn output(&self) -> Arc<Self::Output>;

    fn set_output(&self, output: Self::Output);

    fn output_reader(&self) -> BufferReader<Self::Output>;

    fn input(&self) -> Arc<Self::Input>;

    fn set_input(&self, input: Self::Input);

    /// Output rate in Hz. `None` means every tick.
    fn rate_hz(&self) -> Option<f64> {
        None
    }
}

// ---------------------------------------------------------------------------
// SensorDriver
// ---------------------------------------------------------------------------

/// Object-safe view of a [`Sensor`] used to drive heterogeneous sensors.
pub trait SensorDriver: UpdatableState + Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> SensorKind;

    fn initialize(&mut self, ground_truth: GroundTruthHandle);

    fn is_initialized(&self) -> bool;

    fn rate_hz(&self) -> Option<f64>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<S: Sensor> SensorDriver for S {
    fn name(&self) -> &str {
        Sensor::name(self)
    }

    fn kind(&self) -> SensorKind {
        S::KIND
    }

    fn initialize(&mut self, ground_truth: GroundTruthHandle) {
        Sensor::initialize(self, ground_truth);
    }

    fn is_initialized(&self) -> bool {
        Sensor::is_initialized(self)
    }

    fn rate_hz(&self) -> Option<f64> {
        Sensor::rate_hz(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

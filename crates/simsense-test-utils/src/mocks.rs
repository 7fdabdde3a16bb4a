//! Mock implementations of sensor traits for testing.

use std::sync::{Arc, Mutex, PoisonError};

use nalgebra::Vector3;
use simsense_core::types::Pose;
use simsense_sensors::wifi::{BeaconHit, BeaconScanner, WifiSensorData};

/// Build a [`BeaconHit`] at the origin.
pub fn beacon_hit(id: &str, rssi: f32) -> BeaconHit {
    BeaconHit {
        id: id.into(),
        position: Vector3::zeros(),
        rssi,
    }
}

// ---------------------------------------------------------------------------
// ScriptedScanner
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct CallLog {
    scans: u64,
    paused: bool,
    feedback: u64,
    sensor_pose: Option<Pose>,
    vehicle_pose: Option<Pose>,
}

/// A [`BeaconScanner`] that always returns the same hits and records how the
/// sensor drove it.
#[derive(Debug)]
pub struct ScriptedScanner {
    hits: Vec<BeaconHit>,
    log: Arc<Mutex<CallLog>>,
}

impl ScriptedScanner {
    /// Create a scanner returning `hits`, plus a [`ScannerLog`] that observes it
    /// after it has been boxed into a sensor.
    pub fn new(hits: Vec<BeaconHit>) -> (Self, ScannerLog) {
        let log = Arc::new(Mutex::new(CallLog::default()));
        let view = ScannerLog { log: Arc::clone(&log) };
        (Self { hits, log }, view)
    }

    fn with_log<R>(&self, f: impl FnOnce(&mut CallLog) -> R) -> R {
        f(&mut self.log.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl BeaconScanner for ScriptedScanner {
    fn update_pose(&mut self, sensor_pose: &Pose, vehicle_pose: &Pose) {
        self.with_log(|log| {
            log.sensor_pose = Some(*sensor_pose);
            log.vehicle_pose = Some(*vehicle_pose);
        });
    }

    fn update_rays(&mut self) -> Vec<BeaconHit> {
        self.with_log(|log| log.scans += 1);
        self.hits.clone()
    }

    fn local_pose(&self) -> Pose {
        self.with_log(|log| match (log.vehicle_pose, log.sensor_pose) {
            (Some(vehicle), Some(sensor)) => vehicle.compose(&sensor),
            _ => Pose::identity(),
        })
    }

    fn pause(&mut self, paused: bool) {
        self.with_log(|log| log.paused = paused);
    }

    fn apply_feedback(&mut self, _input: &WifiSensorData) {
        self.with_log(|log| log.feedback += 1);
    }
}

/// Read-only view of a [`ScriptedScanner`]'s call log.
#[derive(Debug, Clone)]
pub struct ScannerLog {
    log: Arc<Mutex<CallLog>>,
}

impl ScannerLog {
    fn read<R>(&self, f: impl FnOnce(&CallLog) -> R) -> R {
        f(&self.log.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn scans(&self) -> u64 {
        self.read(|log| log.scans)
    }

    pub fn is_paused(&self) -> bool {
        self.read(|log| log.paused)
    }

    pub fn feedback_count(&self) -> u64 {
        self.read(|log| log.feedback)
    }

    /// Vehicle pose passed on the most recent scan.
    pub fn last_vehicle_pose(&self) -> Option<Pose> {
        self.read(|log| log.vehicle_pose)
    }

    pub fn last_sensor_pose(&self) -> Option<Pose> {
        self.read(|log| log.sensor_pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sees_scanner_calls() {
        let (mut scanner, log) = ScriptedScanner::new(vec![beacon_hit("a", -50.0)]);
        scanner.update_pose(&Pose::identity(), &Pose::identity());
        assert_eq!(scanner.update_rays().len(), 1);
        scanner.pause(true);
        scanner.apply_feedback(&WifiSensorData::default());
        assert_eq!(log.scans(), 1);
        assert!(log.is_paused());
        assert_eq!(log.feedback_count(), 1);
        assert_eq!(log.last_vehicle_pose(), Some(Pose::identity()));
    }
}

//! Beacon scanner backed by a static beacon field and a log-distance path
//! loss model, for running the wifi sensor without a host renderer.
//!
//! Received power at distance `d` from a beacon:
//!
//! ```text
//! RSSI(d) = P(d0) - 10 * n * log10(d / d0),   d0 = 1 m
//! ```
//!
//! where `P(d0)` is the beacon's `tx_power` and `n` its path-loss exponent.
//! Distances below `d0` are clamped to `d0`.

use nalgebra::Vector3;
use simsense_core::config::{BeaconConfig, ScannerConfig};
use simsense_core::types::Pose;

use crate::wifi::{BeaconHit, BeaconScanner, WifiSensorData};

/// Reference distance for `tx_power` (m).
pub const REFERENCE_DISTANCE: f32 = 1.0;

/// Received power from a beacon at `distance` metres.
#[must_use]
pub fn log_distance_rssi(tx_power: f32, path_loss_exponent: f32, distance: f32) -> f32 {
    let d = distance.max(REFERENCE_DISTANCE);
    tx_power - 10.0 * path_loss_exponent * (d / REFERENCE_DISTANCE).log10()
}

#[derive(Debug, Clone, PartialEq)]
struct Beacon {
    id: String,
    position: Vector3<f32>,
    tx_power: f32,
    path_loss_exponent: f32,
}

impl From<&BeaconConfig> for Beacon {
    fn from(config: &BeaconConfig) -> Self {
        Self {
            id: config.id.clone(),
            position: Vector3::from(config.position),
            tx_power: config.tx_power,
            path_loss_exponent: config.path_loss_exponent,
        }
    }
}

// ---------------------------------------------------------------------------
// LogDistanceScanner
// ---------------------------------------------------------------------------

/// Pure-Rust [`BeaconScanner`].
///
/// Hits are ordered strongest first. While paused, scans return the hits of
/// the last unpaused scan.
#[derive(Debug, Clone)]
pub struct LogDistanceScanner {
    beacons: Vec<Beacon>,
    rssi_threshold: f32,
    max_range: f32,
    world_pose: Pose,
    paused: bool,
    last_hits: Vec<BeaconHit>,
    scan_count: u64,
    feedback_count: u64,
}

impl LogDistanceScanner {
    #[must_use]
    pub fn from_config(config: &ScannerConfig) -> Self {
        Self {
            beacons: config.beacons.iter().map(Beacon::from).collect(),
            rssi_threshold: config.rssi_threshold,
            max_range: config.max_range,
            world_pose: Pose::identity(),
            paused: false,
            last_hits: Vec::new(),
            scan_count: 0,
            feedback_count: 0,
        }
    }

    /// Add a beacon at runtime.
    pub fn add_beacon(&mut self, beacon: &BeaconConfig) {
        self.beacons.push(Beacon::from(beacon));
    }

    #[must_use]
    pub fn beacon_count(&self) -> usize {
        self.beacons.len()
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Scans performed while unpaused.
    #[must_use]
    pub const fn scan_count(&self) -> u64 {
        self.scan_count
    }

    #[must_use]
    pub const fn feedback_count(&self) -> u64 {
        self.feedback_count
    }

    fn scan(&self) -> Vec<BeaconHit> {
        let origin = self.world_pose.position;
        let mut hits: Vec<BeaconHit> = self
            .beacons
            .iter()
            .filter_map(|beacon| {
                let distance = (beacon.position - origin).norm();
                if distance > self.max_range {
                    return None;
                }
                let rssi = log_distance_rssi(beacon.tx_power, beacon.path_loss_exponent, distance);
                (rssi >= self.rssi_threshold).then(|| BeaconHit {
                    id: beacon.id.clone(),
                    position: beacon.position,
                    rssi,
                })
            })
            .collect();
        hits.sort_by(|a, b| b.rssi.total_cmp(&a.rssi));
        hits
    }
}

impl BeaconScanner for LogDistanceScanner {
    fn update_pose(&mut self, sensor_pose: &Pose, vehicle_pose: &Pose) {
        self.world_pose = vehicle_pose.compose(sensor_pose);
    }

    fn update_rays(&mut self) -> Vec<BeaconHit> {
        if !self.paused {
            self.last_hits = self.scan();
            self.scan_count += 1;
        }
        self.last_hits.clone()
    }

    fn local_pose(&self) -> Pose {
        self.world_pose
    }

    fn pause(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn apply_feedback(&mut self, _input: &WifiSensorData) {
        self.feedback_count += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Ground-truth state shared between the physics engine and sensors.
//!
//! All vectors are expressed in a north-east-down (NED) world frame unless a
//! field says otherwise. Gravity therefore points along `+z`.

use std::sync::{Arc, PoisonError, RwLock};

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::time::SimTime;

/// Standard gravity in m/s².
pub const STANDARD_GRAVITY: f32 = 9.806_65;
/// Sea-level air pressure in Pa.
pub const SEA_LEVEL_PRESSURE: f32 = 101_325.0;
/// Sea-level temperature in K.
pub const SEA_LEVEL_TEMPERATURE: f32 = 288.15;
/// Sea-level air density in kg/m³.
pub const SEA_LEVEL_AIR_DENSITY: f32 = 1.225;

// ---------------------------------------------------------------------------
// Pose
// ---------------------------------------------------------------------------

/// Position and orientation of a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
}

impl Pose {
    #[must_use]
    pub const fn new(position: Vector3<f32>, orientation: UnitQuaternion<f32>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Zero position, identity orientation.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity())
    }

    /// Build a pose from a position and roll/pitch/yaw angles in radians.
    #[must_use]
    pub fn from_position_rpy(position: Vector3<f32>, roll: f32, pitch: f32, yaw: f32) -> Self {
        Self::new(position, UnitQuaternion::from_euler_angles(roll, pitch, yaw))
    }

    /// Express `local` (given in this pose's frame) in the parent frame.
    #[must_use]
    pub fn compose(&self, local: &Self) -> Self {
        Self::new(
            self.position + self.orientation * local.position,
            self.orientation * local.orientation,
        )
    }

    /// Rotate a world-frame vector into this pose's body frame.
    #[must_use]
    pub fn to_body_frame(&self, world: &Vector3<f32>) -> Vector3<f32> {
        self.orientation.inverse_transform_vector(world)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

// ---------------------------------------------------------------------------
// Kinematics
// ---------------------------------------------------------------------------

/// Linear and angular velocity.
///
/// `linear` is in the world frame, `angular` in the body frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Twist {
    pub linear: Vector3<f32>,
    pub angular: Vector3<f32>,
}

/// Linear and angular acceleration.
///
/// `linear` is in the world frame, `angular` in the body frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Accelerations {
    pub linear: Vector3<f32>,
    pub angular: Vector3<f32>,
}

/// Full rigid-body kinematic state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Kinematics {
    pub pose: Pose,
    pub twist: Twist,
    pub accelerations: Accelerations,
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Environment state at the vehicle's location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Gravity vector in the world frame (m/s²).
    pub gravity: Vector3<f32>,
    /// Static air pressure (Pa).
    pub air_pressure: f32,
    /// Air temperature (K).
    pub temperature: f32,
    /// Air density (kg/m³).
    pub air_density: f32,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            gravity: Vector3::new(0.0, 0.0, STANDARD_GRAVITY),
            air_pressure: SEA_LEVEL_PRESSURE,
            temperature: SEA_LEVEL_TEMPERATURE,
            air_density: SEA_LEVEL_AIR_DENSITY,
        }
    }
}

// ---------------------------------------------------------------------------
// GroundTruth
// ---------------------------------------------------------------------------

/// Exact, noise-free physical state for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GroundTruth {
    /// Simulation time of this snapshot.
    pub time: SimTime,
    pub kinematics: Kinematics,
    pub environment: Environment,
}

/// Shared, read-mostly handle to the ground truth owned by the physics engine.
///
/// The physics thread writes between ticks with [`set`](Self::set) or
/// [`modify`](Self::modify); sensors copy one [`snapshot`](Self::snapshot) per
/// update so the state cannot change underneath a single update call.
#[derive(Debug, Clone, Default)]
pub struct GroundTruthHandle {
    inner: Arc<RwLock<GroundTruth>>,
}

impl GroundTruthHandle {
    #[must_use]
    pub fn new(ground_truth: GroundTruth) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ground_truth)),
        }
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> GroundTruth {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the whole state.
    pub fn set(&self, ground_truth: GroundTruth) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = ground_truth;
    }

    /// Mutate the state in place under the write lock.
    pub fn modify<F: FnOnce(&mut GroundTruth)>(&self, f: F) {
        f(&mut self.inner.write().unwrap_or_else(PoisonError::into_inner));
    }

    /// `true` if both handles refer to the same ground truth.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

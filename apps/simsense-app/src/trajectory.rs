//! Scripted ground-truth trajectories standing in for a physics engine.
//!
//! All trajectories use the NED world frame, so altitude is negative `z`.

use std::f32::consts::FRAC_PI_2;

use clap::ValueEnum;
use nalgebra::{UnitQuaternion, Vector3};
use simsense_core::types::{Kinematics, Pose};

/// Hover and cruise altitude (m above origin).
const ALTITUDE: f32 = 10.0;
/// Radius of the circle trajectory (m).
const CIRCLE_RADIUS: f32 = 20.0;
/// Yaw rate of the circle trajectory (rad/s).
const CIRCLE_RATE: f32 = 0.25;
/// Upward acceleration of the climb trajectory (m/s²).
const CLIMB_ACCEL: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Trajectory {
    /// Stationary at altitude.
    Hover,
    /// Constant-speed level circle, nose along the track.
    Circle,
    /// Constant upward acceleration from the origin.
    Climb,
}

impl Trajectory {
    /// Kinematic state `t` seconds into the trajectory.
    pub fn sample(self, t: f32) -> Kinematics {
        let mut k = Kinematics::default();
        match self {
            Self::Hover => {
                k.pose.position = Vector3::new(0.0, 0.0, -ALTITUDE);
            }
            Self::Circle => {
                let angle = CIRCLE_RATE * t;
                let (sin, cos) = angle.sin_cos();
                let speed = CIRCLE_RADIUS * CIRCLE_RATE;
                k.pose = Pose::new(
                    Vector3::new(CIRCLE_RADIUS * cos, CIRCLE_RADIUS * sin, -ALTITUDE),
                    UnitQuaternion::from_euler_angles(0.0, 0.0, angle + FRAC_PI_2),
                );
                k.twist.linear = Vector3::new(-speed * sin, speed * cos, 0.0);
                k.twist.angular = Vector3::new(0.0, 0.0, CIRCLE_RATE);
                k.accelerations.linear = -CIRCLE_RATE
                    * CIRCLE_RATE
                    * Vector3::new(CIRCLE_RADIUS * cos, CIRCLE_RADIUS * sin, 0.0);
            }
            Self::Climb => {
                k.pose.position = Vector3::new(0.0, 0.0, -0.5 * CLIMB_ACCEL * t * t);
                k.twist.linear = Vector3::new(0.0, 0.0, -CLIMB_ACCEL * t);
                k.accelerations.linear = Vector3::new(0.0, 0.0, -CLIMB_ACCEL);
            }
        }
        k
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_is_static() {
        let a = Trajectory::Hover.sample(0.0);
        let b = Trajectory::Hover.sample(30.0);
        assert_eq!(a, b);
        assert!(a.pose.position.z < 0.0);
    }

    #[test]
    fn circle_acceleration_points_at_centre() {
        let k = Trajectory::Circle.sample(3.0);
        let inward = -k.pose.position.xy().normalize();
        let accel = k.accelerations.linear.xy().normalize();
        assert!((inward - accel).norm() < 1e-5);
        // Velocity is along the nose.
        let nose = k.pose.orientation * Vector3::x();
        assert!((nose - k.twist.linear.normalize()).norm() < 1e-5);
    }

    #[test]
    fn climb_velocity_integrates_acceleration() {
        let k = Trajectory::Climb.sample(4.0);
        assert!((k.twist.linear.z - -2.0).abs() < 1e-6);
        assert!((k.pose.position.z - -4.0).abs() < 1e-6);
    }
}

//! Ground-truth fixtures and a minimal physics tick driver.

use nalgebra::Vector3;
use simsense_core::traits::UpdatableState;
use simsense_core::types::{GroundTruth, GroundTruthHandle, Pose};

/// Vehicle at the origin, level, not moving.
pub fn at_rest() -> GroundTruth {
    GroundTruth::default()
}

pub fn handle_at_rest() -> GroundTruthHandle {
    GroundTruthHandle::new(at_rest())
}

/// Vehicle at `position` with attitude `roll`/`pitch`/`yaw` (rad), spinning
/// at `angular` rad/s in the world frame.
pub fn rotating(
    position: Vector3<f32>,
    roll: f32,
    pitch: f32,
    yaw: f32,
    angular: Vector3<f32>,
) -> GroundTruth {
    let mut gt = at_rest();
    gt.kinematics.pose = Pose::from_position_rpy(position, roll, pitch, yaw);
    gt.kinematics.twist.angular = angular;
    gt
}

/// Advance the ground-truth clock by `dt` then update `sensor`, the order a
/// physics engine would use.
pub fn tick(sensor: &mut dyn UpdatableState, handle: &GroundTruthHandle, dt: f32) {
    handle.modify(|gt| gt.time.advance_secs(f64::from(dt)));
    sensor.update(dt);
}

/// Run `ticks` steps of length `dt`.
pub fn run_ticks(
    sensor: &mut dyn UpdatableState,
    handle: &GroundTruthHandle,
    dt: f32,
    ticks: usize,
) {
    for _ in 0..ticks {
        tick(sensor, handle, dt);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Steps(u32);

    impl UpdatableState for Steps {
        fn reset(&mut self) {
            self.0 = 0;
        }

        fn update(&mut self, _dt: f32) {
            self.0 += 1;
        }
    }

    #[test]
    fn run_ticks_advances_clock_and_sensor() {
        let handle = handle_at_rest();
        let mut steps = Steps::default();
        run_ticks(&mut steps, &handle, 0.5, 4);
        assert_eq!(steps.0, 4);
        assert!((handle.snapshot().time.secs_f64() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn rotating_fixture_sets_pose_and_rate() {
        let gt = rotating(Vector3::new(1.0, 2.0, 3.0), 0.0, 0.0, 0.5, Vector3::z());
        assert_eq!(gt.kinematics.pose.position, Vector3::new(1.0, 2.0, 3.0));
        assert!((gt.kinematics.pose.orientation.euler_angles().2 - 0.5).abs() < 1e-6);
        assert_eq!(gt.kinematics.twist.angular, Vector3::z());
    }
}

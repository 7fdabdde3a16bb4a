//! Integration test: IMU noise behaviour over long runs.
//!
//! Checks that:
//! 1. A seed reproduces the exact measurement sequence
//! 2. Reset rewinds noise so a replay matches the first run
//! 3. A noiseless IMU reports body-frame truth on a rotating vehicle
//! 4. Static white noise has variance `density² / dt`
//! 5. Readers on another thread only ever see whole samples

use std::thread;

use nalgebra::Vector3;
use simsense_core::config::{AxisNoiseParams, ImuParams};
use simsense_core::types::GroundTruthHandle;
use simsense_core::traits::UpdatableState;
use simsense_noise::presets;
use simsense_sensors::imu::{ImuOutput, ImuSensor};
use simsense_test_utils::{handle_at_rest, mean, rotating, run_ticks, tick, variance};

const DT: f32 = 0.01;

fn imu(params: ImuParams, seed: u64, handle: &GroundTruthHandle) -> ImuSensor {
    let mut imu = ImuSensor::new("imu", params, seed).expect("valid params");
    imu.initialize(handle.clone());
    imu
}

fn record(imu: &mut ImuSensor, handle: &GroundTruthHandle, ticks: usize) -> Vec<ImuOutput> {
    (0..ticks)
        .map(|_| {
            tick(imu, handle, DT);
            *imu.output()
        })
        .collect()
}

#[test]
fn same_seed_reproduces_measurements() {
    let params = presets::consumer_mems_imu();
    let (ha, hb) = (handle_at_rest(), handle_at_rest());
    let mut a = imu(params, 7, &ha);
    let mut b = imu(params, 7, &hb);
    assert_eq!(record(&mut a, &ha, 500), record(&mut b, &hb, 500));
    assert_eq!(a.gyro_bias(), b.gyro_bias());
}

#[test]
fn different_seeds_diverge() {
    let params = presets::consumer_mems_imu();
    let (ha, hb) = (handle_at_rest(), handle_at_rest());
    let a = record(&mut imu(params, 1, &ha), &ha, 10);
    let b = record(&mut imu(params, 2, &hb), &hb, 10);
    assert_ne!(a[9].angular_velocity, b[9].angular_velocity);
}

#[test]
fn reset_replays_noise_stream() {
    let handle = handle_at_rest();
    let mut sensor = imu(presets::consumer_mems_imu(), 3, &handle);
    let first: Vec<_> = record(&mut sensor, &handle, 200)
        .into_iter()
        .map(|o| (o.angular_velocity, o.linear_acceleration))
        .collect();

    sensor.reset();
    assert_eq!(sensor.update_count(), 0);
    let second: Vec<_> = record(&mut sensor, &handle, 200)
        .into_iter()
        .map(|o| (o.angular_velocity, o.linear_acceleration))
        .collect();
    assert_eq!(first, second);
}

#[test]
fn zero_dt_update_leaves_bias_untouched() {
    let handle = handle_at_rest();
    let mut sensor = imu(presets::consumer_mems_imu(), 11, &handle);
    run_ticks(&mut sensor, &handle, DT, 50);
    let bias = *sensor.gyro_bias();
    sensor.update(0.0);
    assert_eq!(*sensor.gyro_bias(), bias);
    assert_eq!(
        sensor.output().angular_velocity,
        bias,
        "dt = 0 reports truth plus bias only"
    );
}

#[test]
fn noiseless_imu_tracks_rotating_vehicle() {
    let yaw = std::f32::consts::FRAC_PI_2;
    let handle = GroundTruthHandle::new(rotating(
        Vector3::zeros(),
        0.0,
        0.0,
        yaw,
        Vector3::new(0.0, 0.0, 0.3),
    ));
    handle.modify(|gt| gt.kinematics.accelerations.linear = Vector3::new(1.0, 0.0, 0.0));
    let mut sensor = imu(presets::ideal_imu(), 0, &handle);

    for output in record(&mut sensor, &handle, 20) {
        assert!((output.angular_velocity - Vector3::new(0.0, 0.0, 0.3)).norm() < 1e-6);
        // World +x seen from a body yawed 90 degrees is body -y.
        let expected = Vector3::new(0.0, -1.0, -simsense_core::types::STANDARD_GRAVITY);
        assert!((output.linear_acceleration - expected).norm() < 1e-4);
        assert_eq!(output.orientation, handle.snapshot().kinematics.pose.orientation);
    }
}

#[test]
fn white_noise_variance_matches_density() {
    let density = 0.01;
    let white_only = AxisNoiseParams {
        white_noise_density: density,
        ..AxisNoiseParams::noiseless()
    };
    let params = ImuParams {
        gyro: white_only,
        accel: AxisNoiseParams::noiseless(),
        ..ImuParams::noiseless()
    };
    let handle = handle_at_rest();
    let mut sensor = imu(params, 99, &handle);

    let samples: Vec<f32> = record(&mut sensor, &handle, 5000)
        .iter()
        .flat_map(|o| o.angular_velocity.iter().copied().collect::<Vec<_>>())
        .collect();
    let expected = f64::from(density * density / DT);
    let var = variance(&samples);
    assert!(mean(&samples).abs() < 0.02, "mean {}", mean(&samples));
    assert!(
        (var - expected).abs() < 0.1 * expected,
        "variance {var}, expected {expected}"
    );
}

#[test]
fn reader_thread_sees_whole_samples() {
    let handle = handle_at_rest();
    let mut sensor = imu(presets::consumer_mems_imu(), 5, &handle);
    let reader = sensor.output_reader();

    let consumer = thread::spawn(move || {
        let mut seen = 0;
        let mut last_stamp = 0;
        let mut last_version = 0;
        while seen < 1000 {
            if let Some((version, output)) = reader.latest_since(last_version) {
                assert!(version > last_version);
                assert!(output.time_stamp.nanos() >= last_stamp);
                assert!(output.linear_acceleration.iter().all(|v| v.is_finite()));
                last_stamp = output.time_stamp.nanos();
                last_version = version;
            }
            seen += 1;
            thread::yield_now();
        }
        last_version
    });

    run_ticks(&mut sensor, &handle, DT, 2000);
    let last_seen = consumer.join().expect("reader thread");
    assert!(last_seen <= sensor.output_reader().version());
}

//! Integration test: wifi sample pacing under irregular physics steps.
//!
//! Drives a wifi sensor with jittered tick lengths and checks that:
//! 1. The number of samples over `T` seconds is `floor(T * rate)` within one
//! 2. Sample timestamps fall on whole periods of the nominal rate
//! 3. Pausing stops publication and resuming continues the cadence
//! 4. Repeated reads without an update return the same sample

use std::sync::Arc;

use simsense_core::config::WifiParams;
use simsense_core::traits::UpdatableState;
use simsense_core::types::GroundTruthHandle;
use simsense_sensors::wifi::WifiSensor;
use simsense_test_utils::mocks::{ScannerLog, ScriptedScanner, beacon_hit};
use simsense_test_utils::rng::jittered_steps;
use simsense_test_utils::{handle_at_rest, run_ticks, tick};

fn wifi(update_frequency: f32) -> (WifiSensor, ScannerLog, GroundTruthHandle) {
    let (scanner, log) = ScriptedScanner::new(vec![beacon_hit("ap-1", -55.0)]);
    let params = WifiParams {
        update_frequency,
        ..WifiParams::default()
    };
    let mut sensor = WifiSensor::new("wifi", params, Box::new(scanner), 21).expect("valid params");
    let handle = handle_at_rest();
    sensor.initialize(handle.clone());
    (sensor, log, handle)
}

#[test]
fn sample_count_follows_rate_for_jittered_steps() {
    for (seed, rate) in [(1, 10.0_f32), (2, 7.0), (3, 25.0)] {
        let (mut sensor, _log, handle) = wifi(rate);
        let start = sensor.output_reader().version();

        let steps = jittered_steps(3000, 0.001, 0.02, seed);
        let total: f64 = steps.iter().map(|&dt| f64::from(dt)).sum();
        for dt in steps {
            tick(&mut sensor, &handle, dt);
        }

        let samples = sensor.output_reader().version() - start;
        let expected = (total * f64::from(rate)).floor() as i64;
        assert!(
            (samples as i64 - expected).abs() <= 1,
            "rate {rate}: {samples} samples over {total:.3} s, expected {expected}"
        );
    }
}

#[test]
fn timestamps_land_on_nominal_periods() {
    let (mut sensor, _log, handle) = wifi(10.0);
    let period = sensor.limiter().period().expect("limited").as_nanos();
    let reader = sensor.output_reader();
    let mut seen = reader.version();

    for dt in jittered_steps(500, 0.003, 0.017, 9) {
        tick(&mut sensor, &handle, dt);
        if let Some((version, data)) = reader.latest_since(seen) {
            seen = version;
            assert_eq!(u128::from(data.time_stamp.nanos()) % period, 0);
            assert!(data.time_stamp <= handle.snapshot().time);
        }
    }
}

#[test]
fn paused_sensor_publishes_nothing_until_resumed() {
    let (mut sensor, log, handle) = wifi(10.0);
    run_ticks(&mut sensor, &handle, 0.01, 100);
    let before = sensor.output_reader().version();

    sensor.set_paused(true);
    run_ticks(&mut sensor, &handle, 0.01, 100);
    assert_eq!(sensor.output_reader().version(), before);
    assert!(log.is_paused());

    sensor.set_paused(false);
    run_ticks(&mut sensor, &handle, 0.01, 100);
    let resumed = sensor.output_reader().version() - before;
    assert!((9..=11).contains(&resumed), "{resumed} samples after resume");
}

#[test]
fn repeated_reads_return_the_same_sample() {
    let (mut sensor, _log, handle) = wifi(5.0);
    run_ticks(&mut sensor, &handle, 0.05, 10);
    let a = sensor.output();
    let b = sensor.output();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.beacons.len(), 1);
}

#[test]
fn reset_restarts_cadence_from_current_time() {
    let (mut sensor, log, handle) = wifi(10.0);
    run_ticks(&mut sensor, &handle, 0.01, 55);
    sensor.reset();
    let scans_after_reset = log.scans();
    let reset_stamp = sensor.output().time_stamp;
    assert_eq!(reset_stamp, handle.snapshot().time);

    // First slot after reset completes one full period later.
    run_ticks(&mut sensor, &handle, 0.01, 9);
    assert_eq!(log.scans(), scans_after_reset);
    sensor.update(0.01);
    assert_eq!(log.scans(), scans_after_reset + 1);
}

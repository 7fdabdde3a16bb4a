//! Integration test: build a sensor suite from TOML and run it.

use nalgebra::Vector3;
use simsense_core::config::SensorSuiteConfig;
use simsense_core::error::{ConfigError, SensorError};
use simsense_core::traits::UpdatableState;
use simsense_sensors::prelude::*;
use simsense_test_utils::mocks::{ScriptedScanner, beacon_hit};
use simsense_test_utils::{handle_at_rest, run_ticks};

const SUITE: &str = r#"
seed = 42

[[imu]]
name = "imu"
min_sample_time = 0.001
gyro = { arw = 8.7e-5, bias_stability = 2.2e-5, tau = 500.0 }

[[imu]]
name = "spare"
enabled = false

[[wifi]]
name = "wifi"
update_frequency = 5.0

[[wifi.scanner.beacons]]
id = "ap-near"
position = [3.0, 4.0, 0.0]

[[wifi.scanner.beacons]]
id = "ap-far"
position = [30.0, 40.0, 0.0]
"#;

fn suite() -> SensorCollection {
    let config = SensorSuiteConfig::from_toml_str(SUITE).expect("valid suite");
    SensorCollection::from_config(&config).expect("buildable suite")
}

#[test]
fn disabled_sensors_are_skipped() {
    let sensors = suite();
    assert_eq!(sensors.names().collect::<Vec<_>>(), vec!["imu", "wifi"]);
    assert!(!sensors.contains("spare"));
}

#[test]
fn suite_runs_and_publishes_every_sensor() {
    let mut sensors = suite();
    let handle = handle_at_rest();
    sensors.initialize_all(handle.clone());
    run_ticks(&mut sensors, &handle, 0.01, 100);

    let imu = sensors.get::<ImuSensor>("imu").expect("imu");
    assert_eq!(imu.update_count(), 100);
    let specific_force = imu.output().linear_acceleration;
    assert!((specific_force - Vector3::new(0.0, 0.0, -9.806_65)).norm() < 0.2);

    let wifi = sensors.get::<WifiSensor>("wifi").expect("wifi");
    let data = wifi.output();
    assert_eq!(data.strongest().map(|h| h.id.as_str()), Some("ap-near"));
    // 5 m with exponent 2 from -40 dBm.
    let near = data.find("ap-near").expect("near beacon");
    assert!((near.rssi - -53.979).abs() < 1e-2);
    assert_eq!(wifi.limiter().fire_count(), 5);
}

#[test]
fn typed_lookup_reports_kind_and_absence() {
    let sensors = suite();
    assert_eq!(
        sensors.get::<WifiSensor>("imu").unwrap_err(),
        SensorError::KindMismatch {
            name: "imu".into(),
            expected: "wifi",
            actual: "imu",
        }
    );
    assert_eq!(
        sensors.get::<ImuSensor>("baro").unwrap_err(),
        SensorError::NotFound("baro".into())
    );
}

#[test]
fn same_seed_builds_identical_suites() {
    let handle_a = handle_at_rest();
    let handle_b = handle_at_rest();
    let (mut a, mut b) = (suite(), suite());
    a.initialize_all(handle_a.clone());
    b.initialize_all(handle_b.clone());
    run_ticks(&mut a, &handle_a, 0.01, 50);
    run_ticks(&mut b, &handle_b, 0.01, 50);
    assert_eq!(
        *a.get::<ImuSensor>("imu").unwrap().output(),
        *b.get::<ImuSensor>("imu").unwrap().output()
    );
}

#[test]
fn custom_scanner_factory_is_used_for_wifi() {
    let config = SensorSuiteConfig::from_toml_str(SUITE).unwrap();
    let mut logs = Vec::new();
    let mut sensors = SensorCollection::from_config_with_scanners(&config, |_| {
        let (scanner, log) = ScriptedScanner::new(vec![beacon_hit("mock", -60.0)]);
        logs.push(log);
        Box::new(scanner)
    })
    .unwrap();
    let handle = handle_at_rest();
    sensors.initialize_all(handle.clone());
    run_ticks(&mut sensors, &handle, 0.05, 4);

    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].scans(), 2, "reset scan plus one 5 Hz slot");
    let wifi = sensors.get::<WifiSensor>("wifi").unwrap();
    assert_eq!(wifi.output().beacons[0].id, "mock");
}

#[test]
fn duplicate_names_are_rejected() {
    let doubled = format!("{SUITE}\n[[wifi]]\nname = \"imu\"\n");
    let err = SensorSuiteConfig::from_toml_str(&doubled).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateSensorName(name) if name == "imu"));
}

#[test]
fn report_lists_every_sensor() {
    let mut sensors = suite();
    let handle = handle_at_rest();
    sensors.initialize_all(handle.clone());
    run_ticks(&mut sensors, &handle, 0.01, 10);
    let report = sensors.report();
    assert_eq!(report.get("Imu-UpdateCount"), Some("10"));
    assert_eq!(report.get("Wifi-UpdateFreq"), Some("5"));
    assert_eq!(report.get("Wifi-MeasurementFreq"), Some("10"));
}

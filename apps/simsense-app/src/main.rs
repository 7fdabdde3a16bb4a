//! simsense sensor simulation CLI.
//!
//! Provides two modes of operation:
//! - `run`: Drive a sensor suite along a scripted trajectory and print
//!   measurement statistics
//! - `defaults`: Print the default sensor suite configuration as TOML

mod trajectory;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use simsense_core::prelude::*;
use simsense_noise::presets;
use simsense_sensors::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::trajectory::Trajectory;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Simulated vehicle sensors driven by scripted ground truth.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Log level; `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a sensor suite along a trajectory and print statistics.
    Run {
        /// Sensor suite TOML file. Uses the default suite if omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Simulated duration in seconds.
        #[arg(short, long, default_value_t = 10.0)]
        duration: f32,

        /// Physics tick rate in Hz.
        #[arg(short = 'r', long, default_value_t = 1000.0)]
        physics_rate: f32,

        /// Override the config's run seed.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Ground-truth trajectory.
        #[arg(short, long, value_enum, default_value_t = Trajectory::Hover)]
        trajectory: Trajectory,

        /// Replace every IMU's noise with a named preset
        /// (navigation, consumer, ideal).
        #[arg(long)]
        imu_preset: Option<String>,
    },

    /// Print the default sensor suite configuration.
    Defaults,
}

struct RunOptions {
    config: Option<PathBuf>,
    duration: f32,
    physics_rate: f32,
    seed: Option<u64>,
    trajectory: Trajectory,
    imu_preset: Option<String>,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Running RMS error of one IMU against the ideal measurement.
#[derive(Debug, Default)]
struct ImuErrorStats {
    samples: u64,
    gyro_sq: f64,
    accel_sq: f64,
}

impl ImuErrorStats {
    fn record(&mut self, output: &ImuOutput, ground_truth: &GroundTruth) {
        let (angular, specific_force) = ideal_measurement(ground_truth);
        self.gyro_sq += f64::from((output.angular_velocity - angular).norm_squared());
        self.accel_sq += f64::from((output.linear_acceleration - specific_force).norm_squared());
        self.samples += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn rms(&self) -> (f64, f64) {
        if self.samples == 0 {
            return (0.0, 0.0);
        }
        let n = self.samples as f64;
        ((self.gyro_sq / n).sqrt(), (self.accel_sq / n).sqrt())
    }
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn load_config(options: &RunOptions) -> Result<SensorSuiteConfig, SimSenseError> {
    let mut config = match &options.config {
        Some(path) => SensorSuiteConfig::from_file(path)?,
        None => SensorSuiteConfig::example(),
    };
    if let Some(seed) = options.seed {
        config.seed = seed;
    }
    if let Some(name) = &options.imu_preset {
        let params = presets::imu_by_name(name)
            .ok_or_else(|| ConfigError::invalid("imu_preset", format!("unknown preset '{name}'")))?;
        for setting in &mut config.imu {
            setting.params = params;
        }
    }
    config.validate()?;
    Ok(config)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn run(options: &RunOptions) -> Result<(), SimSenseError> {
    if !(options.physics_rate.is_finite() && options.physics_rate > 0.0) {
        return Err(ConfigError::invalid("physics_rate", "must be finite and > 0").into());
    }
    let config = load_config(options)?;
    let mut sensors = SensorCollection::from_config(&config)?;

    let dt = 1.0 / options.physics_rate;
    let steps = (options.duration.max(0.0) * options.physics_rate).round() as u64;
    let trajectory = options.trajectory;

    let handle = GroundTruthHandle::new(GroundTruth {
        kinematics: trajectory.sample(0.0),
        ..GroundTruth::default()
    });
    sensors.initialize_all(handle.clone());

    let imu_names: Vec<String> = sensors
        .iter()
        .filter(|s| s.kind() == SensorKind::Imu)
        .map(|s| s.name().to_owned())
        .collect();
    let mut imu_stats: Vec<ImuErrorStats> =
        imu_names.iter().map(|_| ImuErrorStats::default()).collect();

    info!(
        steps,
        dt,
        ?trajectory,
        sensors = sensors.len(),
        "starting run"
    );

    let mut time = SimTime::ZERO;
    for _ in 0..steps {
        time.advance_secs(f64::from(dt));
        let kinematics = trajectory.sample(time.secs_f64() as f32);
        handle.modify(|gt| {
            gt.time = time;
            gt.kinematics = kinematics;
        });
        sensors.update(dt);

        let ground_truth = handle.snapshot();
        for (name, stats) in imu_names.iter().zip(&mut imu_stats) {
            let imu = sensors.get::<ImuSensor>(name)?;
            stats.record(&imu.output(), &ground_truth);
        }
    }

    println!("trajectory={trajectory:?}, steps={steps}, simulated={time}, seed={}", config.seed);
    println!();
    for (name, stats) in imu_names.iter().zip(&imu_stats) {
        let (gyro_rms, accel_rms) = stats.rms();
        println!("{name}: gyro rms error={gyro_rms:.6} rad/s, accel rms error={accel_rms:.6} m/s²");
    }
    for driver in sensors.iter().filter(|s| s.kind() == SensorKind::Wifi) {
        let wifi = sensors.get::<WifiSensor>(driver.name())?;
        let data = wifi.output();
        match data.strongest() {
            Some(hit) => println!(
                "{}: samples={}, beacons={}, strongest={} ({:.1} dBm)",
                wifi.name(),
                wifi.limiter().fire_count(),
                data.beacons.len(),
                hit.id,
                hit.rssi
            ),
            None => {
                warn!(sensor = wifi.name(), "no beacons in range");
                println!(
                    "{}: samples={}, no beacons in range",
                    wifi.name(),
                    wifi.limiter().fire_count()
                );
            }
        }
    }
    println!();
    print!("{}", sensors.report());
    Ok(())
}

fn print_defaults() -> Result<(), SimSenseError> {
    print!("{}", SensorSuiteConfig::example().to_toml_string()?);
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match cli.command {
        Some(Commands::Run {
            config,
            duration,
            physics_rate,
            seed,
            trajectory,
            imu_preset,
        }) => run(&RunOptions {
            config,
            duration,
            physics_rate,
            seed,
            trajectory,
            imu_preset,
        }),
        Some(Commands::Defaults) => print_defaults(),
        None => {
            // Default: one hover run with the default suite
            run(&RunOptions {
                config: None,
                duration: 10.0,
                physics_rate: 1000.0,
                seed: None,
                trajectory: Trajectory::Hover,
                imu_preset: None,
            })
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

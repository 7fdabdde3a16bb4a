// simsense-core: Ground truth, time, config, seeds, reporting and errors for simulated sensors.

pub mod config;
pub mod error;
pub mod report;
pub mod seed;
pub mod time;
pub mod traits;
pub mod types;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::{
        AxisNoiseParams, BeaconConfig, ImuParams, ImuSetting, PoseConfig, ScalarNoiseParams,
        ScannerConfig, SensorSuiteConfig, WifiParams, WifiSetting,
    };
    pub use crate::error::{ConfigError, SensorError, SimSenseError};
    pub use crate::report::StateReporter;
    pub use crate::seed::SeedHierarchy;
    pub use crate::time::{FrequencyLimiter, SimTime};
    pub use crate::traits::UpdatableState;
    pub use crate::types::{
        Accelerations, Environment, GroundTruth, GroundTruthHandle, Kinematics, Pose,
        STANDARD_GRAVITY, Twist,
    };
}

//! Deterministic seed derivation for reproducible sensor noise.
//!
//! [`SeedHierarchy`] derives one seed per sensor from a single run seed:
//!
//! ```text
//! Run seed
//! └── Vehicle seed (per vehicle index)
//!     └── Sensor seed (per sensor name)
//! ```
//!
//! Child seeds are derived by hashing, so adding or renaming one sensor never
//! perturbs the noise stream of another.

use std::hash::{DefaultHasher, Hash, Hasher};

/// Derive a child seed from a parent seed and a string key.
///
/// ```
/// use simsense_core::seed::derive_seed;
///
/// let child = derive_seed(42, "imu");
/// assert_ne!(child, 42);
/// assert_eq!(child, derive_seed(42, "imu"));
/// ```
#[must_use]
pub fn derive_seed(parent: u64, key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    parent.hash(&mut hasher);
    key.hash(&mut hasher);
    hasher.finish()
}

/// Derive a child seed from a parent seed and a numeric index.
#[must_use]
pub fn derive_seed_indexed(parent: u64, index: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    parent.hash(&mut hasher);
    index.hash(&mut hasher);
    hasher.finish()
}

/// Hierarchical seed manager.
///
/// ```
/// use simsense_core::seed::SeedHierarchy;
///
/// let seeds = SeedHierarchy::new(7);
/// assert_eq!(seeds.sensor_seed("imu"), seeds.sensor_seed("imu"));
/// assert_ne!(seeds.sensor_seed("imu"), seeds.sensor_seed("wifi"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedHierarchy {
    root: u64,
}

impl SeedHierarchy {
    #[must_use]
    pub const fn new(root: u64) -> Self {
        Self { root }
    }

    /// The run-level seed.
    #[must_use]
    pub const fn root(&self) -> u64 {
        self.root
    }

    /// Seed for a vehicle in a multi-vehicle run.
    #[must_use]
    pub fn vehicle_seed(&self, vehicle_index: u32) -> u64 {
        derive_seed_indexed(self.root, u64::from(vehicle_index))
    }

    /// Seed for a named sensor on the default (first) vehicle.
    #[must_use]
    pub fn sensor_seed(&self, sensor_name: &str) -> u64 {
        self.vehicle_sensor_seed(0, sensor_name)
    }

    /// Seed for a named sensor on a given vehicle.
    #[must_use]
    pub fn vehicle_sensor_seed(&self, vehicle_index: u32, sensor_name: &str) -> u64 {
        derive_seed(self.vehicle_seed(vehicle_index), sensor_name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

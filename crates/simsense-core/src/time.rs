use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Convert a (possibly negative or non-finite) step in seconds to whole
/// nanoseconds. Negative and NaN steps clamp to zero.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn secs_to_nanos(secs: f64) -> u64 {
    if secs.is_nan() || secs <= 0.0 {
        return 0;
    }
    let nanos = (secs * 1_000_000_000.0).round();
    if nanos >= u64::MAX as f64 {
        u64::MAX
    } else {
        nanos as u64
    }
}

// ---------------------------------------------------------------------------
// SimTime
// ---------------------------------------------------------------------------

/// Integer-nanosecond simulation timestamp.
///
/// Avoids floating-point accumulation errors by tracking elapsed time as a
/// monotonically increasing `u64` nanosecond count.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SimTime {
    nanos: u64,
}

impl SimTime {
    /// The simulation epoch.
    pub const ZERO: Self = Self { nanos: 0 };

    /// Create a `SimTime` from a raw nanosecond count.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Create a `SimTime` from seconds. Negative values clamp to zero.
    #[must_use]
    pub fn from_secs(secs: f64) -> Self {
        Self {
            nanos: secs_to_nanos(secs),
        }
    }

    /// Raw nanosecond count.
    #[must_use]
    pub const fn nanos(&self) -> u64 {
        self.nanos
    }

    /// Elapsed seconds as `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn secs_f64(&self) -> f64 {
        self.nanos as f64 / 1_000_000_000.0
    }

    /// Advance the timestamp by `delta_nanos` nanoseconds.
    pub const fn advance(&mut self, delta_nanos: u64) {
        self.nanos = self.nanos.saturating_add(delta_nanos);
    }

    /// Advance the timestamp by `delta_secs` seconds (negative steps are
    /// ignored).
    pub fn advance_secs(&mut self, delta_secs: f64) {
        self.advance(secs_to_nanos(delta_secs));
    }

    /// Time elapsed since `earlier`. Returns zero if `earlier` is ahead.
    #[must_use]
    pub const fn elapsed_since(&self, earlier: Self) -> Duration {
        Duration::from_nanos(self.nanos.saturating_sub(earlier.nanos))
    }
}

impl Add<Duration> for SimTime {
    type Output = Self;

    #[allow(clippy::cast_possible_truncation)]
    fn add(self, rhs: Duration) -> Self {
        Self {
            nanos: self.nanos.saturating_add(rhs.as_nanos() as u64),
        }
    }
}

impl AddAssign<Duration> for SimTime {
    #[allow(clippy::cast_possible_truncation)]
    fn add_assign(&mut self, rhs: Duration) {
        self.nanos = self.nanos.saturating_add(rhs.as_nanos() as u64);
    }
}

impl Sub for SimTime {
    type Output = Duration;

    /// Saturating difference between two timestamps.
    fn sub(self, rhs: Self) -> Duration {
        Duration::from_nanos(self.nanos.saturating_sub(rhs.nanos))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.nanos / 1_000_000_000;
        let remaining_nanos = self.nanos % 1_000_000_000;
        let millis = remaining_nanos / 1_000_000;
        let micros = (remaining_nanos % 1_000_000) / 1_000;
        write!(f, "{total_secs}.{millis:03}{micros:03}s")
    }
}

// ---------------------------------------------------------------------------
// FrequencyLimiter
// ---------------------------------------------------------------------------

/// Paces sample production to a fixed target rate under an irregular driving
/// clock.
///
/// Each [`update`](Self::update) adds the tick duration to an integer
/// nanosecond accumulator. When the accumulator reaches one period the call is
/// marked "wait complete" and exactly one period is subtracted, so the long-run
/// sample rate does not drift when tick sizes do not divide the period.
///
/// At most one slot fires per call. If a single tick spans several periods the
/// remaining slots stay in the accumulator and drain one per following update,
/// each stamped with its own nominal time.
///
/// A target frequency `<= 0` (or non-finite) disables pacing: every update
/// completes a wait once the startup delay has passed.
///
/// ```
/// use simsense_core::time::{FrequencyLimiter, SimTime};
///
/// let mut limiter = FrequencyLimiter::new(50.0, 0.0, false);
/// limiter.reset(SimTime::ZERO);
/// let fired = (0..240)
///     .filter(|_| {
///         limiter.update(1.0 / 240.0);
///         limiter.is_wait_complete()
///     })
///     .count();
/// assert_eq!(fired, 50);
/// ```
#[derive(Debug, Clone)]
pub struct FrequencyLimiter {
    frequency_hz: f32,
    period_nanos: u64,
    startup_delay_nanos: u64,
    start_paused: bool,

    now: SimTime,
    first_time: SimTime,
    last_time: SimTime,
    accumulated: u64,
    startup_complete: bool,
    wait_complete: bool,
    paused: bool,
    update_count: u64,
    fire_count: u64,
    last_elapsed_interval: Duration,
}

impl FrequencyLimiter {
    /// Create a limiter for `frequency_hz` whose first slot fires after
    /// `startup_delay_secs`. Call [`reset`](Self::reset) before the first
    /// update.
    pub fn new(frequency_hz: f32, startup_delay_secs: f32, start_paused: bool) -> Self {
        let period_nanos = if frequency_hz.is_finite() && frequency_hz > 0.0 {
            secs_to_nanos(1.0 / f64::from(frequency_hz)).max(1)
        } else {
            0
        };
        let startup_delay_nanos = secs_to_nanos(f64::from(startup_delay_secs));
        Self {
            frequency_hz,
            period_nanos,
            startup_delay_nanos,
            start_paused,
            now: SimTime::ZERO,
            first_time: SimTime::ZERO,
            last_time: SimTime::ZERO,
            accumulated: 0,
            startup_complete: startup_delay_nanos == 0,
            wait_complete: false,
            paused: start_paused,
            update_count: 0,
            fire_count: 0,
            last_elapsed_interval: Duration::ZERO,
        }
    }

    /// A limiter that completes a wait on every update.
    pub fn unlimited() -> Self {
        Self::new(0.0, 0.0, false)
    }

    /// Restart pacing with `now` as the baseline clock time.
    ///
    /// Clears the accumulator and counters, re-applies the startup delay and
    /// the initial paused state.
    pub fn reset(&mut self, now: SimTime) {
        self.now = now;
        self.first_time = now;
        self.last_time = now;
        self.accumulated = 0;
        self.startup_complete = self.startup_delay_nanos == 0;
        self.wait_complete = false;
        self.paused = self.start_paused;
        self.update_count = 0;
        self.fire_count = 0;
        self.last_elapsed_interval = Duration::ZERO;
    }

    /// Advance the limiter by one driving tick of `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let dt_nanos = secs_to_nanos(f64::from(dt));
        self.update_count += 1;
        self.wait_complete = false;
        self.now.advance(dt_nanos);

        if self.paused {
            return;
        }
        self.accumulated = self.accumulated.saturating_add(dt_nanos);

        if !self.startup_complete {
            if self.accumulated < self.startup_delay_nanos {
                return;
            }
            // The startup delay acts as the first interval.
            self.accumulated -= self.startup_delay_nanos;
            self.startup_complete = true;
            self.fire();
            return;
        }

        if self.period_nanos == 0 {
            self.accumulated = 0;
            self.fire();
            return;
        }

        if self.accumulated >= self.period_nanos {
            self.accumulated -= self.period_nanos;
            self.fire();
        }
    }

    fn fire(&mut self) {
        let nominal = SimTime::from_nanos(self.now.nanos().saturating_sub(self.accumulated));
        self.last_elapsed_interval = nominal - self.last_time;
        self.last_time = nominal;
        self.fire_count += 1;
        self.wait_complete = true;
    }

    /// `true` if the most recent [`update`](Self::update) completed a sample
    /// slot.
    #[must_use]
    pub const fn is_wait_complete(&self) -> bool {
        self.wait_complete
    }

    /// Nominal time of the most recent completed slot (the baseline before
    /// the first slot).
    #[must_use]
    pub const fn last_time(&self) -> SimTime {
        self.last_time
    }

    /// Current limiter clock (baseline plus all ticks since reset).
    #[must_use]
    pub const fn now(&self) -> SimTime {
        self.now
    }

    /// Interval between the two most recent slots.
    #[must_use]
    pub const fn last_elapsed_interval(&self) -> Duration {
        self.last_elapsed_interval
    }

    #[must_use]
    pub const fn is_startup_complete(&self) -> bool {
        self.startup_complete
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause or resume pacing. While paused the clock advances but the phase
    /// accumulator is frozen and no slot fires.
    pub const fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// `false` when the limiter fires on every update.
    #[must_use]
    pub const fn is_limited(&self) -> bool {
        self.period_nanos != 0
    }

    /// Configured target frequency in Hz.
    #[must_use]
    pub const fn frequency(&self) -> f32 {
        self.frequency_hz
    }

    /// Target period, or `None` when pacing is disabled.
    #[must_use]
    pub const fn period(&self) -> Option<Duration> {
        if self.period_nanos == 0 {
            None
        } else {
            Some(Duration::from_nanos(self.period_nanos))
        }
    }

    /// Number of updates since the last reset.
    #[must_use]
    pub const fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Number of completed slots since the last reset.
    #[must_use]
    pub const fn fire_count(&self) -> u64 {
        self.fire_count
    }

    /// Completed slots per second of clock time since the last reset.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn effective_frequency(&self) -> f64 {
        let elapsed = (self.now - self.first_time).as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        self.fire_count as f64 / elapsed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

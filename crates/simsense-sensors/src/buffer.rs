//! Single-slot, whole-value replacement buffers for sensor output and input.
//!
//! The simulation thread [`publish`](SensorBuffer::publish)es a complete value
//! once per update; any number of consumers hold a [`BufferReader`] and see
//! either the previous value or the new one, never a partial write. Each
//! publish bumps a version counter so pollers can tell whether anything
//! changed since their last read.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug)]
struct Slot<T> {
    value: RwLock<Arc<T>>,
    version: AtomicU64,
}

impl<T> Slot<T> {
    fn snapshot(&self) -> (u64, Arc<T>) {
        let guard = self.value.read().unwrap_or_else(PoisonError::into_inner);
        // Writers bump the version while holding the write lock.
        (self.version.load(Ordering::Acquire), Arc::clone(&guard))
    }
}

// ---------------------------------------------------------------------------
// SensorBuffer
// ---------------------------------------------------------------------------

/// Writer side of a sensor buffer.
///
/// Clones share the same slot.
#[derive(Debug)]
pub struct SensorBuffer<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Clone for SensorBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Default> Default for SensorBuffer<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> SensorBuffer<T> {
    /// Create a buffer holding `initial` at version 0.
    pub fn new(initial: T) -> Self {
        Self {
            slot: Arc::new(Slot {
                value: RwLock::new(Arc::new(initial)),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Replace the stored value.
    pub fn publish(&self, value: T) {
        let value = Arc::new(value);
        let mut guard = self.slot.value.write().unwrap_or_else(PoisonError::into_inner);
        *guard = value;
        self.slot.version.fetch_add(1, Ordering::AcqRel);
    }

    /// The most recently published value.
    pub fn latest(&self) -> Arc<T> {
        self.slot.snapshot().1
    }

    /// Number of publishes since creation.
    pub fn version(&self) -> u64 {
        self.slot.version.load(Ordering::Acquire)
    }

    /// A read-only handle that can be moved to another thread.
    pub fn reader(&self) -> BufferReader<T> {
        BufferReader {
            slot: Arc::clone(&self.slot),
        }
    }
}

// ---------------------------------------------------------------------------
// BufferReader
// ---------------------------------------------------------------------------

/// Consumer side of a [`SensorBuffer`].
#[derive(Debug)]
pub struct BufferReader<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Clone for BufferReader<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> BufferReader<T> {
    pub fn latest(&self) -> Arc<T> {
        self.slot.snapshot().1
    }

    pub fn version(&self) -> u64 {
        self.slot.version.load(Ordering::Acquire)
    }

    /// Value and the version it was published at, read atomically.
    pub fn snapshot(&self) -> (u64, Arc<T>) {
        self.slot.snapshot()
    }

    /// The latest value if it was published after `seen_version`.
    pub fn latest_since(&self, seen_version: u64) -> Option<(u64, Arc<T>)> {
        let (version, value) = self.slot.snapshot();
        (version > seen_version).then_some((version, value))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_version_zero() {
        let buf = SensorBuffer::new(5_u32);
        assert_eq!(*buf.latest(), 5);
        assert_eq!(buf.version(), 0);
    }

    #[test]
    fn publish_replaces_value_and_bumps_version() {
        let buf = SensorBuffer::<Vec<f32>>::default();
        let reader = buf.reader();
        buf.publish(vec![1.0, 2.0]);
        assert_eq!(*reader.latest(), vec![1.0, 2.0]);
        assert_eq!(reader.version(), 1);
        buf.publish(vec![3.0]);
        assert_eq!(*reader.latest(), vec![3.0]);
        assert_eq!(reader.version(), 2);
    }

    #[test]
    fn repeated_reads_return_identical_value() {
        let buf = SensorBuffer::new(String::from("a"));
        let first = buf.latest();
        let second = buf.latest();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn old_value_stays_valid_after_publish() {
        let buf = SensorBuffer::new(1_u8);
        let held = buf.latest();
        buf.publish(2);
        assert_eq!(*held, 1);
        assert_eq!(*buf.latest(), 2);
    }

    #[test]
    fn latest_since_reports_only_new_values() {
        let buf = SensorBuffer::new(0_i32);
        let reader = buf.reader();
        assert!(reader.latest_since(0).is_none());
        buf.publish(7);
        let (version, value) = reader.latest_since(0).unwrap();
        assert_eq!((version, *value), (1, 7));
        assert!(reader.latest_since(version).is_none());
    }

    #[test]
    fn cloned_writers_share_slot() {
        let buf = SensorBuffer::new(0_u64);
        let other = buf.clone();
        other.publish(9);
        assert_eq!(*buf.latest(), 9);
    }

    #[test]
    fn readers_on_other_threads_see_whole_values() {
        let buf = SensorBuffer::new([0_u64; 4]);
        let reader = buf.reader();
        let handle = std::thread::spawn(move || {
            for _ in 0..1000 {
                let value = reader.latest();
                assert!(value.iter().all(|v| *v == value[0]), "torn read {value:?}");
            }
        });
        for i in 1..=1000_u64 {
            buf.publish([i; 4]);
        }
        handle.join().unwrap();
        assert_eq!(buf.version(), 1000);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn buffer_is_send_sync() {
        assert_send_sync::<SensorBuffer<Vec<f32>>>();
        assert_send_sync::<BufferReader<Vec<f32>>>();
    }
}

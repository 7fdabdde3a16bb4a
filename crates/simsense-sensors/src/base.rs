//! State shared by every concrete sensor: name, ground-truth binding and the
//! output/input buffers.

use std::sync::Arc;

use simsense_core::types::{GroundTruth, GroundTruthHandle};

use crate::buffer::{BufferReader, SensorBuffer};

// ---------------------------------------------------------------------------
// SensorBase
// ---------------------------------------------------------------------------

/// Common sensor plumbing embedded in each concrete sensor.
///
/// The ground truth is bound by [`initialize`](Self::initialize). Reading it
/// earlier is a contract violation and panics.
#[derive(Debug)]
pub struct SensorBase<O, I = ()> {
    name: String,
    ground_truth: Option<GroundTruthHandle>,
    output: SensorBuffer<O>,
    input: SensorBuffer<I>,
}

impl<O: Default, I: Default> SensorBase<O, I> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ground_truth: None,
            output: SensorBuffer::default(),
            input: SensorBuffer::default(),
        }
    }
}

impl<O, I> SensorBase<O, I> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind the shared ground truth. Rebinding replaces the previous handle.
    pub fn initialize(&mut self, ground_truth: GroundTruthHandle) {
        self.ground_truth = Some(ground_truth);
    }

    pub const fn is_initialized(&self) -> bool {
        self.ground_truth.is_some()
    }

    /// The bound ground-truth handle.
    ///
    /// # Panics
    ///
    /// Panics if called before [`initialize`](Self::initialize).
    pub fn ground_truth(&self) -> &GroundTruthHandle {
        match &self.ground_truth {
            Some(handle) => handle,
            None => panic!(
                "sensor '{}' used before initialize(): no ground truth bound",
                self.name
            ),
        }
    }

    /// Copy of the current ground truth.
    ///
    /// # Panics
    ///
    /// Panics if called before [`initialize`](Self::initialize).
    pub fn ground_truth_snapshot(&self) -> GroundTruth {
        self.ground_truth().snapshot()
    }

    pub fn output(&self) -> Arc<O> {
        self.output.latest()
    }

    pub fn set_output(&self, output: O) {
        self.output.publish(output);
    }

    pub fn output_reader(&self) -> BufferReader<O> {
        self.output.reader()
    }

    pub fn output_version(&self) -> u64 {
        self.output.version()
    }

    pub fn input(&self) -> Arc<I> {
        self.input.latest()
    }

    pub fn set_input(&self, input: I) {
        self.input.publish(input);
    }

    /// Writer handle for feeding input from another thread.
    pub fn input_writer(&self) -> SensorBuffer<I> {
        self.input.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

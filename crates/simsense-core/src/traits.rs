use crate::report::StateReporter;

// ---------------------------------------------------------------------------
// UpdatableState
// ---------------------------------------------------------------------------

/// Reset/update lifecycle driven by the simulation thread.
///
/// `reset` is called at simulation start and whenever a sensor is re-armed;
/// `update` once per physics tick with the simulated time elapsed since the
/// previous call. Both take `&mut self`, so a reset can never overlap an
/// update on the same object.
pub trait UpdatableState {
    /// Return all internal state to its initial values.
    fn reset(&mut self);

    /// Advance by `dt` seconds. Must tolerate `dt == 0`.
    fn update(&mut self, dt: f32);

    /// Write diagnostic key/value pairs. The default reports nothing.
    fn report_state(&self, reporter: &mut StateReporter) {
        let _ = reporter;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        elapsed: f32,
        resets: u32,
    }

    impl UpdatableState for Counter {
        fn reset(&mut self) {
            self.elapsed = 0.0;
            self.resets += 1;
        }

        fn update(&mut self, dt: f32) {
            self.elapsed += dt;
        }
    }

    #[test]
    fn lifecycle_through_trait_object() {
        let mut counter = Counter::default();
        {
            let state: &mut dyn UpdatableState = &mut counter;
            state.update(0.5);
            state.update(0.25);
        }
        assert!((counter.elapsed - 0.75).abs() < f32::EPSILON);
        counter.reset();
        assert!(counter.elapsed.abs() < f32::EPSILON);
        assert_eq!(counter.resets, 1);
    }

    #[test]
    fn default_report_is_empty() {
        let counter = Counter::default();
        let mut reporter = StateReporter::new();
        counter.report_state(&mut reporter);
        assert!(reporter.is_empty());
    }
}

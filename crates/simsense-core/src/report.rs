//! Diagnostic key/value reporting.
//!
//! Sensors write their internal diagnostics into a [`StateReporter`] from
//! [`UpdatableState::report_state`](crate::traits::UpdatableState::report_state).
//! Telemetry sinks read the collected [`entries`](StateReporter::entries) or
//! render the whole report through [`Display`](std::fmt::Display).

use std::fmt;

use nalgebra::Vector3;

/// One line of a state report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEntry {
    /// Section title, usually the sensor name.
    Heading(String),
    /// A single diagnostic value.
    Value { key: String, value: String },
}

/// Ordered collection of diagnostic headings and key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateReporter {
    entries: Vec<ReportEntry>,
}

impl StateReporter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Start a new section.
    pub fn write_heading(&mut self, title: impl Into<String>) {
        self.entries.push(ReportEntry::Heading(title.into()));
    }

    /// Record a value under `key`.
    pub fn write_value(&mut self, key: impl Into<String>, value: impl fmt::Display) {
        self.entries.push(ReportEntry::Value {
            key: key.into(),
            value: value.to_string(),
        });
    }

    /// Record a 3-vector as `x, y, z`.
    pub fn write_vector(&mut self, key: impl Into<String>, value: &Vector3<f32>) {
        self.write_value(key, format_args!("{}, {}, {}", value.x, value.y, value.z));
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Key/value pairs, skipping headings.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|entry| match entry {
            ReportEntry::Value { key, value } => Some((key.as_str(), value.as_str())),
            ReportEntry::Heading(_) => None,
        })
    }

    /// Most recent value recorded under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v)
            .last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Display for StateReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            match entry {
                ReportEntry::Heading(title) => writeln!(f, "--- {title} ---")?,
                ReportEntry::Value { key, value } => writeln!(f, "{key}: {value}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_skip_headings() {
        let mut reporter = StateReporter::new();
        reporter.write_heading("wifi");
        reporter.write_value("Wifi-MeasurementFreq", 10.0_f32);
        reporter.write_value("Wifi-UpdateCount", 3_u64);
        let values: Vec<_> = reporter.values().collect();
        assert_eq!(
            values,
            vec![("Wifi-MeasurementFreq", "10"), ("Wifi-UpdateCount", "3")]
        );
        assert_eq!(reporter.len(), 3);
    }

    #[test]
    fn get_returns_latest_value() {
        let mut reporter = StateReporter::new();
        reporter.write_value("k", 1);
        reporter.write_value("k", 2);
        assert_eq!(reporter.get("k"), Some("2"));
        assert_eq!(reporter.get("missing"), None);
    }

    #[test]
    fn write_vector_formats_components() {
        let mut reporter = StateReporter::new();
        reporter.write_vector("Imu-GyroBias", &Vector3::new(0.5, -1.0, 0.0));
        assert_eq!(reporter.get("Imu-GyroBias"), Some("0.5, -1, 0"));
    }

    #[test]
    fn display_renders_sections() {
        let mut reporter = StateReporter::new();
        reporter.write_heading("imu");
        reporter.write_value("a", "b");
        assert_eq!(reporter.to_string(), "--- imu ---\na: b\n");
        reporter.clear();
        assert!(reporter.is_empty());
    }
}

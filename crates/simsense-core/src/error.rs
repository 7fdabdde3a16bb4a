use thiserror::Error;

/// Top-level error type for simsense.
#[derive(Debug, Error)]
pub enum SimSenseError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),
}

/// Configuration errors.
///
/// Raised while loading or validating sensor parameters, never from a
/// steady-state `update`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Duplicate sensor name: {0}")]
    DuplicateSensorName(String),
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised when assembling or addressing sensors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("Sensor not found: {0}")]
    NotFound(String),

    #[error("Sensor {name} is a {actual}, expected {expected}")]
    KindMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

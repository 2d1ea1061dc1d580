use thiserror::Error;

/// Top-level error type for shutguard domain values and configuration.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid time of day {hour:02}:{minute:02}: hour must be 0-23 and minute 0-59")]
    InvalidTimeOfDay { hour: u32, minute: u32 },

    #[error("Invalid time specification {0:?}: expected HH:MM")]
    InvalidTimeSpec(String),

    #[error("Critical port marker at position {index} is empty")]
    EmptyPortMarker { index: usize },

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

pub type Result<T> = std::result::Result<T, CoreError>;

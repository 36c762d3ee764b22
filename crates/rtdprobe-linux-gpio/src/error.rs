//! Error types for the Linux GPIO backend

use thiserror::Error;

/// Linux GPIO backend errors
#[derive(Debug, Error)]
pub enum LinuxGpioError {
    /// Failed to request the GPIO lines from the chip
    #[error("Failed to request GPIO lines on '{path}': {source}")]
    LineRequestFailed {
        path: String,
        #[source]
        source: gpiocdev::Error,
    },

    /// Failed to change the direction of a requested line
    #[error("Failed to reconfigure GPIO line {line}: {source}")]
    ReconfigureFailed {
        line: u32,
        #[source]
        source: gpiocdev::Error,
    },

    /// Invalid option value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Missing required option
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// GPIO chip not specified
    #[error("No GPIO chip specified. Use dev=/dev/gpiochipN or gpiochip=N")]
    NoDevice,

    /// Both `dev` and `gpiochip` given
    #[error("Only one of 'dev' or 'gpiochip' can be specified")]
    ConflictingDevice,

    /// Invalid GPIO line number
    #[error("Invalid GPIO line number for {name}: {value}")]
    InvalidLineNumber { name: &'static str, value: String },

    /// The same line was given for two signals
    #[error("GPIO line {0} is assigned to more than one SPI signal")]
    DuplicateLine(u32),
}

/// Result type for Linux GPIO backend operations
pub type Result<T> = std::result::Result<T, LinuxGpioError>;

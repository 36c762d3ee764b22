//! Error types for rtdprobe-core
//!
//! This module provides a no_std compatible error type. Only construction
//! and release of the GPIO lines can fail: once the pins are claimed, SPI
//! transfers, register access and the conversion math are total.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The GPIO backend could not put a pin into the requested mode
    PinConfig {
        /// Pin that failed to configure
        pin: u32,
    },
    /// Nominal or reference resistance is not a positive finite number
    InvalidCalibration,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinConfig { pin } => write!(f, "failed to configure GPIO pin {}", pin),
            Self::InvalidCalibration => {
                write!(f, "nominal and reference resistance must be positive")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::PinConfig { pin: 9 }.to_string(),
            "failed to configure GPIO pin 9"
        );
        assert!(Error::InvalidCalibration.to_string().contains("positive"));
    }
}

//! GPIO adapter boundary
//!
//! The driver never touches hardware registers directly. Every physical
//! operation goes through a [`GpioAdapter`]: pin direction, digital writes,
//! digital reads and blocking delays. Backends live in their own crates.

use core::fmt;

use crate::error::Result;

/// Abstract pin identifier
///
/// The numbering scheme is up to the backend (GPIO line offset on Linux,
/// port/pin index on a microcontroller).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pin(pub u32);

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Logic level of a digital line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Logic low
    Low,
    /// Logic high
    High,
}

impl Level {
    /// Returns true for [`Level::High`]
    #[inline]
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl From<bool> for Level {
    #[inline]
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Pin direction / function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Push-pull output driven by the driver
    Output,
    /// Input sampled by the driver
    Input,
    /// Alternate (peripheral) function, used when handing the pins back
    Alternate,
}

/// The four lines of the bit-banged SPI bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiPins {
    /// Chip select (active low, output)
    pub cs: Pin,
    /// Serial clock (output)
    pub sck: Pin,
    /// Data from host to chip (SDI on the chip, output)
    pub mosi: Pin,
    /// Data from chip to host (SDO on the chip, input)
    pub miso: Pin,
}

impl SpiPins {
    /// Create a pin set
    pub const fn new(cs: Pin, sck: Pin, mosi: Pin, miso: Pin) -> Self {
        Self {
            cs,
            sck,
            mosi,
            miso,
        }
    }

    /// All four pins, in CS, SCK, MOSI, MISO order
    pub const fn all(&self) -> [Pin; 4] {
        [self.cs, self.sck, self.mosi, self.miso]
    }
}

/// Pin-level GPIO access
///
/// Only [`set_pin_mode`](GpioAdapter::set_pin_mode) can fail. Reads and
/// writes happen inside SPI transfers, which have no failure path: a backend
/// that hits an I/O error there should log it and carry on.
pub trait GpioAdapter {
    /// Configure the direction or function of a pin
    fn set_pin_mode(&mut self, pin: Pin, mode: PinMode) -> Result<()>;

    /// Drive an output pin
    fn write_digital(&mut self, pin: Pin, level: Level);

    /// Sample an input pin
    fn read_digital(&self, pin: Pin) -> Level;

    /// Block the caller for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<G: GpioAdapter + ?Sized> GpioAdapter for &mut G {
    fn set_pin_mode(&mut self, pin: Pin, mode: PinMode) -> Result<()> {
        (**self).set_pin_mode(pin, mode)
    }

    fn write_digital(&mut self, pin: Pin, level: Level) {
        (**self).write_digital(pin, level)
    }

    fn read_digital(&self, pin: Pin) -> Level {
        (**self).read_digital(pin)
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

#[cfg(feature = "alloc")]
impl<G: GpioAdapter + ?Sized> GpioAdapter for alloc::boxed::Box<G> {
    fn set_pin_mode(&mut self, pin: Pin, mode: PinMode) -> Result<()> {
        (**self).set_pin_mode(pin, mode)
    }

    fn write_digital(&mut self, pin: Pin, level: Level) {
        (**self).write_digital(pin, level)
    }

    fn read_digital(&self, pin: Pin) -> Level {
        (**self).read_digital(pin)
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

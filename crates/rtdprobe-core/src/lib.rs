//! rtdprobe-core - Core driver for MAX31865 RTD-to-digital converters
//!
//! This crate talks to a MAX31865 over a software (bit-banged) SPI bus built
//! from four GPIO lines, and turns the raw ADC counts into resistance and
//! temperature. It is designed to be `no_std` compatible; the GPIO access
//! itself lives behind the [`gpio::GpioAdapter`] trait so that backends
//! (Linux character device, emulators, microcontroller HALs) can be swapped.
//!
//! # Layers
//!
//! - [`gpio`] - the pin-level boundary consumed by the driver
//! - [`bitbang`] - the 8-bit MSB-first full-duplex transfer
//! - [`bus`] - exclusive ownership of the four SPI lines
//! - [`register`] - register reads and writes with the R/W address bit
//! - [`config`] - the configuration register as a bitfield state machine
//! - [`conversion`] and [`fault`] - numeric conversion and fault decoding
//! - [`device`] - the user-facing device handle
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable boxed GPIO adapters
//!
//! # Example
//!
//! ```ignore
//! use rtdprobe_core::device::{Max31865, RtdConfig};
//! use rtdprobe_core::gpio::{Pin, SpiPins};
//!
//! let pins = SpiPins::new(Pin(8), Pin(11), Pin(10), Pin(9));
//! let mut sensor = Max31865::open(adapter, pins, RtdConfig::pt100())?;
//! println!("{:.2} C", sensor.temperature());
//! let adapter = sensor.reset()?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod bitbang;
pub mod bus;
pub mod config;
pub mod conversion;
pub mod device;
pub mod error;
pub mod fault;
pub mod gpio;
pub mod register;

pub use error::{Error, Result};

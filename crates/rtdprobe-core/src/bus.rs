//! Exclusive ownership of a bit-banged SPI bus
//!
//! A [`GpioSpi`] value is the token for the four lines: whoever holds it is
//! the only one driving CS, SCK and MOSI and sampling MISO. Claiming puts
//! the pins into their SPI directions; [`GpioSpi::release`] returns them to
//! an inert state and hands the adapter back so another consumer can claim
//! the same physical bus.

use crate::bitbang::BitbangSpiMaster;
use crate::error::Result;
use crate::gpio::{GpioAdapter, Level, PinMode, SpiPins};

/// Bit-banged SPI master over a [`GpioAdapter`]
pub struct GpioSpi<G: GpioAdapter> {
    adapter: G,
    pins: SpiPins,
}

impl<G: GpioAdapter> GpioSpi<G> {
    /// Claim the four SPI lines on `adapter`
    ///
    /// Initial state: CS=1 (inactive), SCK=0, MOSI=output, MISO=input.
    /// Any pin that cannot be configured aborts the claim.
    pub fn claim(mut adapter: G, pins: SpiPins) -> Result<Self> {
        adapter.set_pin_mode(pins.cs, PinMode::Output)?;
        adapter.write_digital(pins.cs, Level::High);

        adapter.set_pin_mode(pins.sck, PinMode::Output)?;
        adapter.write_digital(pins.sck, Level::Low);

        adapter.set_pin_mode(pins.mosi, PinMode::Output)?;
        adapter.set_pin_mode(pins.miso, PinMode::Input)?;

        log::debug!(
            "bitbang: claimed bus (cs={}, sck={}, mosi={}, miso={})",
            pins.cs,
            pins.sck,
            pins.mosi,
            pins.miso
        );

        Ok(Self { adapter, pins })
    }

    /// Return the pins to their default state and give back the adapter
    ///
    /// SCK, MOSI and MISO go back to their alternate (hardware SPI) function
    /// and CS becomes an input pulled to its idle level.
    pub fn release(mut self) -> Result<G> {
        let pins = self.pins;

        self.adapter.set_pin_mode(pins.sck, PinMode::Alternate)?;
        self.adapter.write_digital(pins.sck, Level::Low);

        self.adapter.set_pin_mode(pins.mosi, PinMode::Alternate)?;
        self.adapter.write_digital(pins.mosi, Level::High);

        self.adapter.set_pin_mode(pins.miso, PinMode::Alternate)?;
        self.adapter.write_digital(pins.miso, Level::Low);

        self.adapter.set_pin_mode(pins.cs, PinMode::Input)?;
        self.adapter.write_digital(pins.cs, Level::High);

        log::debug!("bitbang: released bus");
        Ok(self.adapter)
    }

    /// Pins this bus is driving
    pub fn pins(&self) -> SpiPins {
        self.pins
    }

    /// Get a reference to the underlying adapter
    pub fn adapter(&self) -> &G {
        &self.adapter
    }

    /// Get a mutable reference to the underlying adapter
    pub fn adapter_mut(&mut self) -> &mut G {
        &mut self.adapter
    }
}

impl<G: GpioAdapter> BitbangSpiMaster for GpioSpi<G> {
    fn set_cs(&mut self, active: bool) {
        // CS is active low
        self.adapter.write_digital(self.pins.cs, Level::from(!active));
    }

    fn set_sck(&mut self, high: bool) {
        self.adapter.write_digital(self.pins.sck, Level::from(high));
    }

    fn set_mosi(&mut self, high: bool) {
        self.adapter.write_digital(self.pins.mosi, Level::from(high));
    }

    fn get_miso(&self) -> bool {
        self.adapter.read_digital(self.pins.miso).is_high()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.adapter.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::gpio::Pin;
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Mode(u32, PinMode),
        Write(u32, Level),
    }

    #[derive(Default)]
    struct Journal {
        ops: Vec<Op>,
        broken: Option<u32>,
    }

    impl GpioAdapter for Journal {
        fn set_pin_mode(&mut self, pin: Pin, mode: PinMode) -> Result<()> {
            if self.broken == Some(pin.0) {
                return Err(Error::PinConfig { pin: pin.0 });
            }
            self.ops.push(Op::Mode(pin.0, mode));
            Ok(())
        }

        fn write_digital(&mut self, pin: Pin, level: Level) {
            self.ops.push(Op::Write(pin.0, level));
        }

        fn read_digital(&self, _pin: Pin) -> Level {
            Level::Low
        }

        fn delay_ms(&mut self, _ms: u32) {}
    }

    const PINS: SpiPins = SpiPins::new(Pin(8), Pin(11), Pin(10), Pin(9));

    #[test]
    fn test_claim_sets_directions() {
        let bus = GpioSpi::claim(Journal::default(), PINS).unwrap();
        assert_eq!(
            bus.adapter().ops,
            [
                Op::Mode(8, PinMode::Output),
                Op::Write(8, Level::High),
                Op::Mode(11, PinMode::Output),
                Op::Write(11, Level::Low),
                Op::Mode(10, PinMode::Output),
                Op::Mode(9, PinMode::Input),
            ]
        );
    }

    #[test]
    fn test_claim_failure_is_reported() {
        let journal = Journal {
            broken: Some(9),
            ..Default::default()
        };
        let err = GpioSpi::claim(journal, PINS).err();
        assert_eq!(err, Some(Error::PinConfig { pin: 9 }));
    }

    #[test]
    fn test_release_restores_pins() {
        let bus = GpioSpi::claim(Journal::default(), PINS).unwrap();
        let journal = bus.release().unwrap();
        let tail = &journal.ops[journal.ops.len() - 8..];
        assert_eq!(
            tail,
            [
                Op::Mode(11, PinMode::Alternate),
                Op::Write(11, Level::Low),
                Op::Mode(10, PinMode::Alternate),
                Op::Write(10, Level::High),
                Op::Mode(9, PinMode::Alternate),
                Op::Write(9, Level::Low),
                Op::Mode(8, PinMode::Input),
                Op::Write(8, Level::High),
            ]
        );

        // The same pins can be claimed again
        assert!(GpioSpi::claim(journal, PINS).is_ok());
    }

    #[test]
    fn test_cs_is_active_low() {
        let mut bus = GpioSpi::claim(Journal::default(), PINS).unwrap();
        bus.set_cs(true);
        bus.set_cs(false);
        let ops = &bus.adapter().ops;
        assert_eq!(ops[ops.len() - 2], Op::Write(8, Level::Low));
        assert_eq!(ops[ops.len() - 1], Op::Write(8, Level::High));
    }
}

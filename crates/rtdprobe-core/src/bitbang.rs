//! Bitbang SPI master trait and the byte transfer primitive
//!
//! The MAX31865 speaks SPI mode 1/3: it shifts SDO out on the rising clock
//! edge and latches SDI on the falling edge. The host side here toggles the
//! lines in this order for every bit, most significant first:
//!
//! 1. SCK high
//! 2. MOSI = current bit
//! 3. SCK low
//! 4. sample MISO
//!
//! so each bit touches two output lines (three writes) and takes one input
//! sample, and the clock is always left low once a byte is done.
//!
//! ## When to use this trait
//!
//! [`BitbangSpiMaster`] is implemented by anything that can drive the four
//! lines by hand. [`crate::bus::GpioSpi`] implements it on top of a
//! [`crate::gpio::GpioAdapter`]; tests implement it directly to script the
//! bytes the chip answers with.

/// Trait for low-level bitbang SPI operations
///
/// This trait provides the minimal set of operations needed for bitbanging SPI.
/// Implementations can override [`transfer`](BitbangSpiMaster::transfer)
/// when they can move a whole byte at once.
pub trait BitbangSpiMaster {
    /// Set chip select (CS is active low, so `active=true` means CS=0)
    fn set_cs(&mut self, active: bool);

    /// Set clock line value
    fn set_sck(&mut self, high: bool);

    /// Set MOSI line value
    fn set_mosi(&mut self, high: bool);

    /// Get MISO line value
    fn get_miso(&self) -> bool;

    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);

    /// Shift one byte out and one byte in
    ///
    /// Default implementation toggles the lines bit by bit via [`transfer`].
    fn transfer(&mut self, byte: u8) -> u8 {
        transfer(self, byte)
    }
}

/// Full-duplex transfer of one byte, MSB first
///
/// This is a standalone function that can be used by any `BitbangSpiMaster`
/// implementation. It cannot fail.
pub fn transfer<M: BitbangSpiMaster + ?Sized>(master: &mut M, byte: u8) -> u8 {
    let mut reply = 0u8;
    for i in (0..8).rev() {
        reply <<= 1;
        master.set_sck(true);
        master.set_mosi((byte >> i) & 1 != 0);
        master.set_sck(false);
        if master.get_miso() {
            reply |= 1;
        }
    }
    reply
}

/// Transfer each byte of `buf` in place, replacing it with the reply
pub fn transfer_in_place<M: BitbangSpiMaster + ?Sized>(master: &mut M, buf: &mut [u8]) {
    for byte in buf.iter_mut() {
        *byte = master.transfer(*byte);
    }
}

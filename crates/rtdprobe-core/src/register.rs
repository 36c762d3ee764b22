//! MAX31865 register map and register access
//!
//! Every access is one chip-select framed transaction: CS goes low before
//! the address byte and only goes high after the last data byte. Bit 7 of
//! the address byte selects the direction (0 = read, 1 = write). Multi-byte
//! reads auto-increment the address inside the chip.

use crate::bitbang::{transfer_in_place, BitbangSpiMaster};

/// MAX31865 register addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    /// Configuration register
    Config = 0x00,
    /// RTD resistance data, MSB
    RtdMsb = 0x01,
    /// RTD resistance data, LSB (bit 0 is the fault flag)
    RtdLsb = 0x02,
    /// High fault threshold, MSB
    HighFaultMsb = 0x03,
    /// High fault threshold, LSB
    HighFaultLsb = 0x04,
    /// Low fault threshold, MSB
    LowFaultMsb = 0x05,
    /// Low fault threshold, LSB
    LowFaultLsb = 0x06,
    /// Fault status
    FaultStatus = 0x07,
}

/// Address bit that selects a write
pub const WRITE_BIT: u8 = 0x80;

/// Dummy byte clocked out while reading
pub const DUMMY_BYTE: u8 = 0xFF;

impl Register {
    /// Raw address of this register
    #[inline]
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// Address byte for a read of this register
    #[inline]
    pub const fn read_address(self) -> u8 {
        read_address(self as u8)
    }

    /// Address byte for a write to this register
    #[inline]
    pub const fn write_address(self) -> u8 {
        write_address(self as u8)
    }
}

/// Address byte for a read: top bit cleared
#[inline]
pub const fn read_address(addr: u8) -> u8 {
    addr & !WRITE_BIT
}

/// Address byte for a write: top bit set
#[inline]
pub const fn write_address(addr: u8) -> u8 {
    addr | WRITE_BIT
}

/// Read `buf.len()` consecutive registers starting at `addr`
///
/// The chip uses 1 or 2 byte reads; longer reads simply keep
/// auto-incrementing.
pub fn read_registers<M: BitbangSpiMaster + ?Sized>(master: &mut M, addr: u8, buf: &mut [u8]) {
    let addr = read_address(addr);

    master.set_sck(false);
    master.set_cs(true);

    master.transfer(addr);
    buf.fill(DUMMY_BYTE);
    transfer_in_place(master, buf);

    master.set_cs(false);

    log::trace!("max31865: read 0x{:02X} -> {:02X?}", addr, buf);
}

/// Read one 8-bit register
pub fn read_register8<M: BitbangSpiMaster + ?Sized>(master: &mut M, reg: Register) -> u8 {
    let mut buf = [0u8; 1];
    read_registers(master, reg.addr(), &mut buf);
    buf[0]
}

/// Read a 16-bit register pair, MSB first
pub fn read_register16<M: BitbangSpiMaster + ?Sized>(master: &mut M, reg: Register) -> u16 {
    let mut buf = [0u8; 2];
    read_registers(master, reg.addr(), &mut buf);
    u16::from_be_bytes(buf)
}

/// Write consecutive registers starting at `addr`
pub fn write_registers<M: BitbangSpiMaster + ?Sized>(master: &mut M, addr: u8, data: &[u8]) {
    let addr = write_address(addr);

    master.set_sck(false);
    master.set_cs(true);

    master.transfer(addr);
    for &byte in data {
        master.transfer(byte);
    }

    master.set_cs(false);

    log::trace!("max31865: write 0x{:02X} <- {:02X?}", addr, data);
}

/// Write one 8-bit register
pub fn write_register8<M: BitbangSpiMaster + ?Sized>(master: &mut M, reg: Register, data: u8) {
    write_registers(master, reg.addr(), &[data]);
}

/// Write a 16-bit register pair, MSB first
pub fn write_register16<M: BitbangSpiMaster + ?Sized>(master: &mut M, reg: Register, data: u16) {
    write_registers(master, reg.addr(), &data.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::vec;
    use std::vec::Vec;

    /// Master that records framed transactions and replays canned replies
    #[derive(Default)]
    struct Scripted {
        replies: VecDeque<u8>,
        frames: Vec<Vec<u8>>,
        selected: bool,
        sck_high: bool,
    }

    impl BitbangSpiMaster for Scripted {
        fn set_cs(&mut self, active: bool) {
            if active {
                assert!(!self.selected, "nested chip select");
                assert!(!self.sck_high, "clock must idle low before select");
                self.frames.push(Vec::new());
            }
            self.selected = active;
        }

        fn set_sck(&mut self, high: bool) {
            self.sck_high = high;
        }

        fn set_mosi(&mut self, _high: bool) {}

        fn get_miso(&self) -> bool {
            false
        }

        fn delay_ms(&mut self, _ms: u32) {}

        fn transfer(&mut self, byte: u8) -> u8 {
            assert!(self.selected, "transfer outside a CS frame");
            self.frames.last_mut().unwrap().push(byte);
            self.replies.pop_front().unwrap_or(0)
        }
    }

    #[test]
    fn test_address_conventions() {
        for addr in 0..=0x7Fu8 {
            assert_eq!(write_address(addr), addr | 0x80);
            assert_eq!(read_address(addr), addr);
            assert_eq!(read_address(addr | 0x80), addr);
        }
        assert_eq!(Register::FaultStatus.write_address(), 0x87);
        assert_eq!(Register::Config.read_address(), 0x00);
    }

    #[test]
    fn test_write_register8_frame() {
        let mut m = Scripted::default();
        write_register8(&mut m, Register::Config, 0xC3);
        assert_eq!(m.frames, [vec![0x80u8, 0xC3]]);
        assert!(!m.selected);
    }

    #[test]
    fn test_write_any_address_sets_top_bit() {
        let mut m = Scripted::default();
        for addr in [0x00u8, 0x07, 0x3F, 0x7F] {
            write_registers(&mut m, addr, &[0x00]);
        }
        let firsts: Vec<u8> = m.frames.iter().map(|f| f[0]).collect();
        assert_eq!(firsts, [0x80, 0x87, 0xBF, 0xFF]);
    }

    #[test]
    fn test_read_register8_frame() {
        let mut m = Scripted::default();
        m.replies.extend([0x00, 0x5A]);
        assert_eq!(read_register8(&mut m, Register::FaultStatus), 0x5A);
        assert_eq!(m.frames, [vec![0x07u8, 0xFF]]);
    }

    #[test]
    fn test_read_clears_top_bit() {
        let mut m = Scripted::default();
        let mut buf = [0u8; 1];
        read_registers(&mut m, 0x81, &mut buf);
        assert_eq!(m.frames[0][0], 0x01);
    }

    #[test]
    fn test_read_register16_is_big_endian_and_atomic() {
        let mut m = Scripted::default();
        m.replies.extend([0x00, 0x80, 0x02]);
        assert_eq!(read_register16(&mut m, Register::RtdMsb), 0x8002);

        // Address and both data bytes inside one chip-select frame
        assert_eq!(m.frames, [vec![0x01u8, 0xFF, 0xFF]]);
    }

    #[test]
    fn test_read_registers_sends_dummy_bytes() {
        let mut m = Scripted::default();
        m.replies.extend([0x00, 0x01, 0x02, 0x03]);
        let mut buf = [0x12u8, 0x34, 0x56];
        read_registers(&mut m, Register::HighFaultMsb as u8, &mut buf);

        // Whatever the caller left in the buffer, only dummy bytes go out
        assert_eq!(m.frames, [vec![0x03u8, 0xFF, 0xFF, 0xFF]]);
        assert_eq!(buf, [0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_write_register16_frame() {
        let mut m = Scripted::default();
        write_register16(&mut m, Register::HighFaultMsb, 0xABCD);
        assert_eq!(m.frames, [vec![0x83u8, 0xAB, 0xCD]]);
    }
}

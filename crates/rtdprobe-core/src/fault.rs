//! Fault status decoding
//!
//! The fault status register (0x07) latches six independent conditions.
//! None of them has priority over the others and any combination can be
//! present at once.

use bitflags::bitflags;
use core::fmt;

bitflags! {
    /// Decoded fault status register
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FaultReport: u8 {
        /// RTD reading at or above the high fault threshold
        const HIGH_THRESHOLD = 0x80;
        /// RTD reading at or below the low fault threshold
        const LOW_THRESHOLD  = 0x40;
        /// REFIN- > 0.85 x V_BIAS
        const REFIN_LOW      = 0x20;
        /// REFIN- < 0.85 x V_BIAS (FORCE- open)
        const REFIN_HIGH     = 0x10;
        /// RTDIN- < 0.85 x V_BIAS (FORCE- open)
        const RTDIN_LOW      = 0x08;
        /// Overvoltage or undervoltage
        const OVUV           = 0x04;
    }
}

impl FaultReport {
    /// Decode a raw fault status byte; bits 1..0 are reserved and ignored
    #[inline]
    pub fn from_raw(raw: u8) -> Self {
        FaultReport::from_bits_truncate(raw)
    }

    /// True when no fault is latched
    #[inline]
    pub fn is_clear(&self) -> bool {
        self.is_empty()
    }

    /// RTD high threshold fault
    pub fn high_threshold(&self) -> bool {
        self.contains(FaultReport::HIGH_THRESHOLD)
    }

    /// RTD low threshold fault
    pub fn low_threshold(&self) -> bool {
        self.contains(FaultReport::LOW_THRESHOLD)
    }

    /// REFIN- too low
    pub fn ref_in_low(&self) -> bool {
        self.contains(FaultReport::REFIN_LOW)
    }

    /// REFIN- too high
    pub fn ref_in_high(&self) -> bool {
        self.contains(FaultReport::REFIN_HIGH)
    }

    /// RTDIN- too low
    pub fn rtd_in_low(&self) -> bool {
        self.contains(FaultReport::RTDIN_LOW)
    }

    /// Over/under voltage
    pub fn over_under_voltage(&self) -> bool {
        self.contains(FaultReport::OVUV)
    }

    /// Human-readable description of a single flag
    pub fn describe(flag: FaultReport) -> &'static str {
        match flag {
            FaultReport::HIGH_THRESHOLD => "RTD high threshold",
            FaultReport::LOW_THRESHOLD => "RTD low threshold",
            FaultReport::REFIN_LOW => "REFIN- > 0.85 x bias",
            FaultReport::REFIN_HIGH => "REFIN- < 0.85 x bias (FORCE- open)",
            FaultReport::RTDIN_LOW => "RTDIN- < 0.85 x bias (FORCE- open)",
            FaultReport::OVUV => "under/over voltage",
            _ => "unknown fault",
        }
    }
}

impl fmt::Display for FaultReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "High threshold: {}", self.high_threshold())?;
        writeln!(f, "Low threshold:  {}", self.low_threshold())?;
        writeln!(f, "REFIN low:      {}", self.ref_in_low())?;
        writeln!(f, "REFIN high:     {}", self.ref_in_high())?;
        writeln!(f, "RTDIN low:      {}", self.rtd_in_low())?;
        write!(f, "OV/UV:          {}", self.over_under_voltage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    fn flags(r: FaultReport) -> [bool; 6] {
        [
            r.high_threshold(),
            r.low_threshold(),
            r.ref_in_low(),
            r.ref_in_high(),
            r.rtd_in_low(),
            r.over_under_voltage(),
        ]
    }

    #[test]
    fn test_no_faults() {
        let r = FaultReport::from_raw(0x00);
        assert!(r.is_clear());
        assert_eq!(flags(r), [false; 6]);
    }

    #[test]
    fn test_all_faults() {
        let r = FaultReport::from_raw(0xFC);
        assert_eq!(flags(r), [true; 6]);
        assert_eq!(r, FaultReport::all());
    }

    #[test]
    fn test_each_flag_is_independent() {
        let masks = [0x80u8, 0x40, 0x20, 0x10, 0x08, 0x04];
        for (i, mask) in masks.iter().enumerate() {
            let got = flags(FaultReport::from_raw(*mask));
            for (j, set) in got.iter().enumerate() {
                assert_eq!(*set, i == j, "mask 0x{:02X} flag {}", mask, j);
            }
        }
    }

    #[test]
    fn test_reserved_bits_ignored() {
        assert!(FaultReport::from_raw(0x03).is_clear());
        assert_eq!(FaultReport::from_raw(0xFF).bits(), 0xFC);
    }

    #[test]
    fn test_display_lists_every_flag() {
        let text = FaultReport::from_raw(0x84).to_string();
        assert!(text.contains("High threshold: true"));
        assert!(text.contains("Low threshold:  false"));
        assert!(text.contains("OV/UV:          true"));
        assert_eq!(text.lines().count(), 6);
    }

    #[test]
    fn test_describe() {
        for flag in FaultReport::all().iter() {
            assert_ne!(FaultReport::describe(flag), "unknown fault");
        }
    }
}

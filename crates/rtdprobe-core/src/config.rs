//! Configuration register state machine
//!
//! The MAX31865 keeps all of its mode state in one 8-bit register. The
//! driver never patches single bits on the wire: it reads the register,
//! applies one of the transitions below in software, and writes the whole
//! byte back. Each transition is a pure function on [`ConfigRegister`] so it
//! can be checked without hardware.

use bitflags::bitflags;

bitflags! {
    /// Configuration register (address 0x00) bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConfigRegister: u8 {
        /// V_BIAS on
        const BIAS          = 1 << 7;
        /// Continuous (automatic) conversion mode
        const AUTO_CONVERT  = 1 << 6;
        /// Start a single conversion (self-clearing)
        const ONE_SHOT      = 1 << 5;
        /// 3-wire RTD connection
        const THREE_WIRE    = 1 << 4;
        /// Fault detection cycle control, bit 1
        const FAULT_CYCLE_1 = 1 << 3;
        /// Fault detection cycle control, bit 0
        const FAULT_CYCLE_0 = 1 << 2;
        /// Clear the fault status register (self-clearing)
        const FAULT_CLEAR   = 1 << 1;
        /// 50 Hz notch filter (60 Hz when clear)
        const FILTER_50HZ   = 1 << 0;

        /// Bits cleared when faults are cleared: one-shot plus the fault cycle field
        const FAULT_CONTROL = Self::ONE_SHOT.bits()
            | Self::FAULT_CYCLE_1.bits()
            | Self::FAULT_CYCLE_0.bits();
        /// Bits kept across a fault detection cycle
        const CONNECTION    = Self::THREE_WIRE.bits() | Self::FILTER_50HZ.bits();
    }
}

impl Default for ConfigRegister {
    fn default() -> Self {
        ConfigRegister::empty()
    }
}

/// Number of wires between the converter and the RTD element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireMode {
    /// 2-wire connection
    Two,
    /// 3-wire connection
    Three,
    /// 4-wire connection
    Four,
}

impl WireMode {
    /// Number of wires
    pub fn count(self) -> u8 {
        match self {
            WireMode::Two => 2,
            WireMode::Three => 3,
            WireMode::Four => 4,
        }
    }

    /// Parse a wire count
    pub fn from_count(count: u8) -> Option<Self> {
        match count {
            2 => Some(WireMode::Two),
            3 => Some(WireMode::Three),
            4 => Some(WireMode::Four),
            _ => None,
        }
    }
}

/// Mains rejection filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Reject 50 Hz
    Hz50,
    /// Reject 60 Hz (power-on default)
    #[default]
    Hz60,
}

/// Fault detection cycle selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCycle {
    /// Automatic delay (cycle bits 01)
    Automatic,
    /// Manual cycle, first step (cycle bits 10)
    ManualStart,
    /// Manual cycle, second step (cycle bits 11)
    ManualFinish,
}

impl FaultCycle {
    /// Cycle control bits for this mode
    pub fn bits(self) -> ConfigRegister {
        match self {
            FaultCycle::Automatic => ConfigRegister::FAULT_CYCLE_0,
            FaultCycle::ManualStart => ConfigRegister::FAULT_CYCLE_1,
            FaultCycle::ManualFinish => {
                ConfigRegister::FAULT_CYCLE_1 | ConfigRegister::FAULT_CYCLE_0
            }
        }
    }
}

impl ConfigRegister {
    /// Decode a raw register byte (all 8 bits are defined)
    #[inline]
    pub fn from_raw(raw: u8) -> Self {
        ConfigRegister::from_bits_retain(raw)
    }

    /// Select the wire mode. Only 3-wire differs; 2- and 4-wire share a setting.
    pub fn with_wire_mode(mut self, mode: WireMode) -> Self {
        self.set(ConfigRegister::THREE_WIRE, mode == WireMode::Three);
        self
    }

    /// Turn the bias voltage on or off
    pub fn with_bias(mut self, enabled: bool) -> Self {
        self.set(ConfigRegister::BIAS, enabled);
        self
    }

    /// Enable or disable continuous conversion
    pub fn with_auto_convert(mut self, enabled: bool) -> Self {
        self.set(ConfigRegister::AUTO_CONVERT, enabled);
        self
    }

    /// Select the mains rejection filter
    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.set(ConfigRegister::FILTER_50HZ, filter == FilterMode::Hz50);
        self
    }

    /// Drop one-shot and fault cycle bits and request a fault status clear
    pub fn with_fault_cleared(self) -> Self {
        (self - ConfigRegister::FAULT_CONTROL) | ConfigRegister::FAULT_CLEAR
    }

    /// Request a single conversion
    pub fn with_one_shot(self) -> Self {
        self | ConfigRegister::ONE_SHOT
    }

    /// Value written to start a fault detection cycle
    ///
    /// Only the wire and filter bits survive; bias is forced on.
    pub fn for_fault_cycle(self, cycle: FaultCycle) -> Self {
        (self & ConfigRegister::CONNECTION) | ConfigRegister::BIAS | cycle.bits()
    }

    /// Currently selected wire mode (2- and 4-wire read back as 4-wire)
    pub fn wire_mode(self) -> WireMode {
        if self.contains(ConfigRegister::THREE_WIRE) {
            WireMode::Three
        } else {
            WireMode::Four
        }
    }

    /// Currently selected filter
    pub fn filter(self) -> FilterMode {
        if self.contains(ConfigRegister::FILTER_50HZ) {
            FilterMode::Hz50
        } else {
            FilterMode::Hz60
        }
    }

    /// Bias voltage state
    pub fn bias(self) -> bool {
        self.contains(ConfigRegister::BIAS)
    }

    /// Continuous conversion state
    pub fn auto_convert(self) -> bool {
        self.contains(ConfigRegister::AUTO_CONVERT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_mode_bit() {
        let base = ConfigRegister::from_raw(0xFF);
        let two = base.with_wire_mode(WireMode::Two);
        let four = base.with_wire_mode(WireMode::Four);
        let three = ConfigRegister::empty().with_wire_mode(WireMode::Three);

        assert_eq!(two, four);
        assert_eq!(two.bits(), 0xEF);
        assert_eq!(three.bits(), 0x10);

        // Nothing else moves
        assert_eq!(
            ConfigRegister::from_raw(0x81).with_wire_mode(WireMode::Three).bits(),
            0x91
        );
    }

    #[test]
    fn test_bias_and_auto_convert_are_independent() {
        let cfg = ConfigRegister::empty().with_bias(true);
        assert_eq!(cfg.bits(), 0x80);

        let cfg = cfg.with_auto_convert(true);
        assert_eq!(cfg.bits(), 0xC0);

        let cfg = cfg.with_bias(false);
        assert_eq!(cfg.bits(), 0x40);
        assert!(cfg.auto_convert());
        assert!(!cfg.bias());
    }

    #[test]
    fn test_clear_fault() {
        let cfg = ConfigRegister::from_raw(0xFF).with_fault_cleared();
        assert_eq!(cfg.bits(), 0xD3);

        let cfg = ConfigRegister::from_raw(0x80).with_fault_cleared();
        assert_eq!(cfg.bits(), 0x82);
    }

    #[test]
    fn test_one_shot() {
        let cfg = ConfigRegister::from_raw(0x80).with_one_shot();
        assert_eq!(cfg.bits(), 0xA0);
    }

    #[test]
    fn test_filter() {
        let cfg = ConfigRegister::empty().with_filter(FilterMode::Hz50);
        assert_eq!(cfg.bits(), 0x01);
        assert_eq!(cfg.filter(), FilterMode::Hz50);
        assert_eq!(cfg.with_filter(FilterMode::Hz60).bits(), 0x00);
    }

    #[test]
    fn test_fault_cycle_values() {
        let cfg = ConfigRegister::from_raw(0x11 | 0x40 | 0x20);
        assert_eq!(cfg.for_fault_cycle(FaultCycle::Automatic).bits(), 0x95);
        assert_eq!(cfg.for_fault_cycle(FaultCycle::ManualStart).bits(), 0x99);
        assert_eq!(cfg.for_fault_cycle(FaultCycle::ManualFinish).bits(), 0x9D);

        let plain = ConfigRegister::empty();
        assert_eq!(plain.for_fault_cycle(FaultCycle::Automatic).bits(), 0x84);
        assert_eq!(plain.for_fault_cycle(FaultCycle::ManualStart).bits(), 0x88);
        assert_eq!(plain.for_fault_cycle(FaultCycle::ManualFinish).bits(), 0x8C);
    }

    #[test]
    fn test_wire_count_parse() {
        assert_eq!(WireMode::from_count(3), Some(WireMode::Three));
        assert_eq!(WireMode::from_count(5), None);
        assert_eq!(WireMode::Four.count(), 4);
    }
}

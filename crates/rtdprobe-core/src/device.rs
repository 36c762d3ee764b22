//! MAX31865 device handle
//!
//! [`Max31865`] owns the SPI master for one chip select and exposes the
//! conversion and diagnostics operations. Every configuration change is a
//! read of the configuration register, a transition from [`crate::config`]
//! and a full-byte write back.
//!
//! All waits are minimum durations and run in a fixed order. A conversion
//! blocks the caller for at least [`BIAS_SETTLE_MS`] + [`CONVERSION_MS`].

use crate::bitbang::BitbangSpiMaster;
use crate::bus::GpioSpi;
use crate::config::{ConfigRegister, FaultCycle, FilterMode, WireMode};
use crate::conversion::{resistance_to_celsius, rtd_to_resistance};
use crate::error::{Error, Result};
use crate::fault::FaultReport;
use crate::gpio::{GpioAdapter, SpiPins};
use crate::register::{self, Register};

/// Bias voltage settling time before a one-shot conversion
pub const BIAS_SETTLE_MS: u32 = 10;

/// One-shot conversion time (worst case, 50 Hz filter)
pub const CONVERSION_MS: u32 = 65;

/// Wait after starting an automatic fault detection cycle
pub const FAULT_CYCLE_MS: u32 = 1;

/// Sensor and board calibration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RtdConfig {
    /// Wiring between the converter and the element
    pub wires: WireMode,
    /// Mains rejection filter
    pub filter: FilterMode,
    /// Element resistance at 0 °C, in ohms
    pub rtd_nominal: f64,
    /// Reference resistor on the board, in ohms
    pub ref_resistor: f64,
}

impl RtdConfig {
    /// PT100 element with a 430 Ω reference
    pub const fn pt100() -> Self {
        Self {
            wires: WireMode::Two,
            filter: FilterMode::Hz60,
            rtd_nominal: 100.0,
            ref_resistor: 430.0,
        }
    }

    /// PT1000 element with a 4300 Ω reference
    pub const fn pt1000() -> Self {
        Self {
            wires: WireMode::Two,
            filter: FilterMode::Hz60,
            rtd_nominal: 1000.0,
            ref_resistor: 4300.0,
        }
    }

    /// Set the wire mode
    pub const fn with_wires(mut self, wires: WireMode) -> Self {
        self.wires = wires;
        self
    }

    /// Set the mains filter
    pub const fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    /// Set the nominal resistance
    pub const fn with_rtd_nominal(mut self, ohms: f64) -> Self {
        self.rtd_nominal = ohms;
        self
    }

    /// Set the reference resistance
    pub const fn with_ref_resistor(mut self, ohms: f64) -> Self {
        self.ref_resistor = ohms;
        self
    }

    /// Check that both resistances are positive and finite
    pub fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.rtd_nominal) && ok(self.ref_resistor) {
            Ok(())
        } else {
            Err(Error::InvalidCalibration)
        }
    }
}

impl Default for RtdConfig {
    fn default() -> Self {
        Self::pt100()
    }
}

/// All three views of one conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// 15-bit ADC count
    pub raw: u16,
    /// RTD resistance in ohms
    pub resistance: f64,
    /// Temperature in °C (may be NaN for out-of-range resistance)
    pub celsius: f64,
}

/// A MAX31865 on a bit-banged SPI bus
pub struct Max31865<M: BitbangSpiMaster> {
    bus: M,
    config: RtdConfig,
}

impl<G: GpioAdapter> Max31865<GpioSpi<G>> {
    /// Claim `pins` on `adapter` and initialize the chip
    pub fn open(adapter: G, pins: SpiPins, config: RtdConfig) -> Result<Self> {
        config.validate()?;
        let bus = GpioSpi::claim(adapter, pins)?;
        Self::new(bus, config)
    }

    /// Hand the pins back to their default functions
    ///
    /// Consumes the handle and returns the adapter, so the same lines can be
    /// claimed again by another driver.
    pub fn reset(self) -> Result<G> {
        log::debug!("max31865: reset");
        self.bus.release()
    }
}

impl<M: BitbangSpiMaster> Max31865<M> {
    /// Initialize a chip on an already claimed bus
    ///
    /// Order: wire mode, bias off, auto-convert off, filter, thresholds wide
    /// open, clear fault.
    pub fn new(bus: M, config: RtdConfig) -> Result<Self> {
        config.validate()?;

        let mut dev = Self { bus, config };
        dev.set_wires(config.wires);
        dev.set_bias(false);
        dev.set_auto_convert(false);
        dev.set_filter(config.filter);
        dev.set_thresholds(0x0000, 0xFFFF);
        dev.clear_fault();

        log::info!(
            "max31865: initialized ({}-wire, nominal {} Ω, ref {} Ω)",
            config.wires.count(),
            config.rtd_nominal,
            config.ref_resistor
        );
        Ok(dev)
    }

    /// Calibration this handle converts with
    pub fn config(&self) -> &RtdConfig {
        &self.config
    }

    /// Get a reference to the SPI master
    pub fn bus(&self) -> &M {
        &self.bus
    }

    /// Get a mutable reference to the SPI master
    pub fn bus_mut(&mut self) -> &mut M {
        &mut self.bus
    }

    /// Read the configuration register
    pub fn read_config(&mut self) -> ConfigRegister {
        ConfigRegister::from_raw(register::read_register8(&mut self.bus, Register::Config))
    }

    fn write_config(&mut self, cfg: ConfigRegister) {
        register::write_register8(&mut self.bus, Register::Config, cfg.bits());
    }

    fn update_config(&mut self, f: impl FnOnce(ConfigRegister) -> ConfigRegister) {
        let old = self.read_config();
        let new = f(old);
        log::debug!("max31865: config 0x{:02X} -> 0x{:02X}", old.bits(), new.bits());
        self.write_config(new);
    }

    /// Select 2-, 3- or 4-wire connection
    pub fn set_wires(&mut self, mode: WireMode) {
        self.update_config(|c| c.with_wire_mode(mode));
        self.config.wires = mode;
    }

    /// Turn V_BIAS on or off
    pub fn set_bias(&mut self, enabled: bool) {
        self.update_config(|c| c.with_bias(enabled));
    }

    /// Enable or disable continuous conversion
    pub fn set_auto_convert(&mut self, enabled: bool) {
        self.update_config(|c| c.with_auto_convert(enabled));
    }

    /// Select the 50 or 60 Hz filter
    pub fn set_filter(&mut self, filter: FilterMode) {
        self.update_config(|c| c.with_filter(filter));
        self.config.filter = filter;
    }

    /// Clear latched faults and any pending fault cycle or one-shot
    pub fn clear_fault(&mut self) {
        self.update_config(ConfigRegister::with_fault_cleared);
    }

    /// Run a one-shot conversion and return the 15-bit RTD count
    pub fn read_rtd(&mut self) -> u16 {
        self.clear_fault();
        self.set_bias(true);
        self.bus.delay_ms(BIAS_SETTLE_MS);

        self.update_config(ConfigRegister::with_one_shot);
        self.bus.delay_ms(CONVERSION_MS);

        let rtd = register::read_register16(&mut self.bus, Register::RtdMsb);
        if rtd & 1 != 0 {
            log::debug!("max31865: fault bit set in RTD data");
        }
        rtd >> 1
    }

    /// Run a conversion and return the RTD resistance in ohms
    pub fn resistance(&mut self) -> f64 {
        rtd_to_resistance(self.read_rtd(), self.config.ref_resistor)
    }

    /// Run a conversion and return the temperature in °C
    pub fn temperature(&mut self) -> f64 {
        self.temperature_reading().celsius
    }

    /// Run a conversion and return count, resistance and temperature
    pub fn temperature_reading(&mut self) -> Reading {
        let raw = self.read_rtd();
        let resistance = rtd_to_resistance(raw, self.config.ref_resistor);
        let celsius = resistance_to_celsius(resistance, self.config.rtd_nominal);
        if !celsius.is_finite() {
            log::warn!(
                "max31865: {:.3} Ω (raw 0x{:04X}) has no temperature",
                resistance,
                raw
            );
        }
        Reading {
            raw,
            resistance,
            celsius,
        }
    }

    /// Raw fault status register
    pub fn read_fault(&mut self) -> u8 {
        register::read_register8(&mut self.bus, Register::FaultStatus)
    }

    /// Decoded fault status register
    pub fn fault_report(&mut self) -> FaultReport {
        FaultReport::from_raw(self.read_fault())
    }

    /// Start a fault detection cycle
    ///
    /// The automatic cycle waits for completion and returns the fault
    /// status. The manual steps only write the cycle bits; the caller times
    /// them and the returned report is empty. A manual cycle needs the RTD
    /// input filter charged, so `ManualStart` turns the bias on and waits
    /// `BIAS_SETTLE_MS` first when it is off.
    pub fn run_fault_detection(&mut self, cycle: FaultCycle) -> FaultReport {
        if cycle == FaultCycle::ManualStart && !self.read_config().bias() {
            self.set_bias(true);
            self.bus.delay_ms(BIAS_SETTLE_MS);
        }

        let cfg = self.read_config().for_fault_cycle(cycle);
        log::debug!("max31865: fault cycle {:?} (0x{:02X})", cycle, cfg.bits());
        self.write_config(cfg);

        match cycle {
            FaultCycle::Automatic => {
                self.bus.delay_ms(FAULT_CYCLE_MS);
                self.fault_report()
            }
            FaultCycle::ManualStart | FaultCycle::ManualFinish => FaultReport::empty(),
        }
    }

    /// Program the low and high fault thresholds
    pub fn set_thresholds(&mut self, low: u16, high: u16) {
        register::write_register16(&mut self.bus, Register::LowFaultMsb, low);
        register::write_register16(&mut self.bus, Register::HighFaultMsb, high);
    }

    /// Low fault threshold
    pub fn low_threshold(&mut self) -> u16 {
        register::read_register16(&mut self.bus, Register::LowFaultMsb)
    }

    /// High fault threshold
    pub fn high_threshold(&mut self) -> u16 {
        register::read_register16(&mut self.bus, Register::HighFaultMsb)
    }
}

//! Fault command implementation

use super::Sensor;
use crate::cli::CycleArg;
use rtdprobe_core::bitbang::BitbangSpiMaster;
use rtdprobe_core::config::FaultCycle;
use rtdprobe_core::fault::FaultReport;

/// Wait between the two manual fault cycle steps
const MANUAL_STEP_MS: u32 = 10;

/// Print the fault status, optionally after a detection cycle
pub fn run_fault(
    sensor: &mut Sensor,
    cycle: Option<CycleArg>,
    clear: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = match cycle {
        None => sensor.fault_report(),
        Some(CycleArg::Auto) => sensor.run_fault_detection(FaultCycle::Automatic),
        Some(CycleArg::Manual) => {
            sensor.run_fault_detection(FaultCycle::ManualStart);
            sensor.bus_mut().delay_ms(MANUAL_STEP_MS);
            sensor.run_fault_detection(FaultCycle::ManualFinish);
            sensor.bus_mut().delay_ms(MANUAL_STEP_MS);
            sensor.fault_report()
        }
    };

    println!("Fault status: 0x{:02X}", report.bits());
    println!("{}", report);

    for flag in report.iter() {
        log::info!("Fault: {}", FaultReport::describe(flag));
    }

    if clear {
        sensor.clear_fault();
        println!("Fault status cleared");
    }
    Ok(())
}

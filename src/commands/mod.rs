//! CLI command implementations
//!
//! Every sensor command receives an already initialized [`Sensor`]; opening
//! it and resetting it afterwards is done once, in `main`.

mod fault;
mod list;
mod read;
mod watch;

pub use fault::run_fault;
pub use list::list_backends;
pub use read::run_read;
pub use watch::run_watch;

use rtdprobe_core::bus::GpioSpi;
use rtdprobe_core::device::Max31865;
use rtdprobe_core::gpio::GpioAdapter;

/// Device handle over whichever backend was selected
pub type Sensor = Max31865<GpioSpi<Box<dyn GpioAdapter>>>;

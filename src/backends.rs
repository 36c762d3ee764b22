//! Backend registration and dispatch
//!
//! A backend is anything that hands out a [`GpioAdapter`] plus the four pins
//! the MAX31865 is wired to. Which backends exist depends on the features
//! the binary was built with.

use rtdprobe_core::gpio::{GpioAdapter, SpiPins};

/// Information about a backend
pub struct BackendInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names
    pub aliases: &'static [&'static str],
    /// Short description including the accepted options
    pub description: &'static str,
}

/// All backends enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "dummy")]
    backends.push(BackendInfo {
        name: "dummy",
        aliases: &["emulator"],
        description: "Emulated MAX31865 (ohms=<f64>,ref=<f64>,fault=<bits>,cs/sck/mosi/miso=<n>)",
    });

    #[cfg(feature = "linux-gpio")]
    backends.push(BackendInfo {
        name: "linux_gpio",
        aliases: &["linux-gpio", "gpiochip"],
        description: "Linux GPIO character device (dev=/dev/gpiochipN|gpiochip=N,cs,sck,mosi,miso)",
    });

    backends
}

/// Help text listing every available backend
pub fn backend_help() -> String {
    let backends = available_backends();

    if backends.is_empty() {
        return "No backends available (recompile with backend features enabled)".to_string();
    }

    let mut help = String::from("Available backends:\n");
    for b in &backends {
        help.push_str(&format!("  {:12} - {}\n", b.name, b.description));
    }
    help
}

/// Comma-separated backend names for the CLI help
pub fn backend_names_short() -> String {
    let names: Vec<&str> = available_backends().iter().map(|b| b.name).collect();
    names.join(", ")
}

/// Resolve a name or alias to the canonical backend name
pub fn find_backend(name: &str) -> Option<&'static str> {
    available_backends()
        .into_iter()
        .find(|b| b.name == name || b.aliases.iter().any(|a| *a == name))
        .map(|b| b.name)
}

/// Parse a backend string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
pub fn parse_backend_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

/// Open the backend described by `backend` and return it with its pins
#[allow(unused_variables)]
pub fn open_backend(
    backend: &str,
) -> Result<(Box<dyn GpioAdapter>, SpiPins), Box<dyn std::error::Error>> {
    let (name, options) = parse_backend_string(backend);

    let canonical = find_backend(name).ok_or_else(|| unknown_backend_error(name))?;

    match canonical {
        #[cfg(feature = "dummy")]
        "dummy" => {
            log::info!("Using emulated MAX31865");
            rtdprobe_dummy::open_dummy(&options)
                .map_err(|e| format!("Invalid dummy parameters: {}", e).into())
        }

        #[cfg(feature = "linux-gpio")]
        "linux_gpio" => {
            log::info!("Opening Linux GPIO backend...");
            rtdprobe_linux_gpio::open_linux_gpio(&options).map_err(|e| {
                format!(
                    "Failed to open Linux GPIO backend: {}\n\
                     Make sure the gpiochip exists and you have read/write permissions.\n\
                     You may need to: sudo usermod -aG gpio $USER",
                    e
                )
                .into()
            })
        }

        _ => Err(unknown_backend_error(name)),
    }
}

fn unknown_backend_error(name: &str) -> Box<dyn std::error::Error> {
    let mut msg = format!("Unknown backend: {}\n\n", name);
    msg.push_str(&backend_help());
    msg.push_str("\nUse 'rtdprobe list-backends' for more details");
    msg.into()
}

//! CLI argument parsing

use crate::backends;
use clap::{Parser, Subcommand, ValueEnum};
use rtdprobe_core::config::{FilterMode, WireMode};
use rtdprobe_core::device::RtdConfig;

/// Generate dynamic help text for the backend argument
fn backend_help() -> String {
    format!(
        "Backend to use, as name:key=value,... [available: {}]",
        backends::backend_names_short()
    )
}

/// Parse a mains frequency for the notch filter
fn parse_filter(s: &str) -> Result<FilterMode, String> {
    match s.trim_end_matches("Hz").trim_end_matches("hz") {
        "50" => Ok(FilterMode::Hz50),
        "60" => Ok(FilterMode::Hz60),
        _ => Err(format!("Invalid filter '{}': expected 50 or 60", s)),
    }
}

/// Parse a wire count
fn parse_wires(s: &str) -> Result<WireMode, String> {
    s.parse::<u8>()
        .ok()
        .and_then(WireMode::from_count)
        .ok_or_else(|| format!("Invalid wire count '{}': expected 2, 3 or 4", s))
}

#[derive(Parser)]
#[command(name = "rtdprobe")]
#[command(author, version, about = "MAX31865 RTD sensor reader", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Element type, selects the default calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SensorKind {
    /// 100 Ω element, 430 Ω reference
    Pt100,
    /// 1000 Ω element, 4300 Ω reference
    Pt1000,
}

/// Fault detection cycle to run before reading the status
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CycleArg {
    /// Let the chip time the cycle
    Auto,
    /// Drive both manual steps from the host
    Manual,
}

/// Sensor options shared across commands
#[derive(clap::Args, Debug, Clone)]
pub struct SensorArgs {
    /// Backend to use
    #[arg(short, long, help = backend_help())]
    pub backend: String,

    /// Number of RTD wires (2, 3 or 4)
    #[arg(long, default_value = "2", value_parser = parse_wires)]
    pub wires: WireMode,

    /// Sensor type
    #[arg(long, value_enum, default_value_t = SensorKind::Pt100)]
    pub sensor: SensorKind,

    /// Nominal resistance at 0 °C in ohms (overrides --sensor)
    #[arg(long)]
    pub rtd_nominal: Option<f64>,

    /// Reference resistor in ohms (overrides --sensor)
    #[arg(long)]
    pub ref_resistor: Option<f64>,

    /// Mains filter frequency (50 or 60)
    #[arg(long, default_value = "60", value_parser = parse_filter)]
    pub filter: FilterMode,
}

impl SensorArgs {
    /// Calibration described by these arguments
    pub fn rtd_config(&self) -> RtdConfig {
        let mut config = match self.sensor {
            SensorKind::Pt100 => RtdConfig::pt100(),
            SensorKind::Pt1000 => RtdConfig::pt1000(),
        }
        .with_wires(self.wires)
        .with_filter(self.filter);

        if let Some(ohms) = self.rtd_nominal {
            config = config.with_rtd_nominal(ohms);
        }
        if let Some(ohms) = self.ref_resistor {
            config = config.with_ref_resistor(ohms);
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Take one reading
    Read {
        #[command(flatten)]
        sensor: SensorArgs,

        /// Also print the temperature in Fahrenheit
        #[arg(short, long)]
        fahrenheit: bool,
    },

    /// Take readings repeatedly
    Watch {
        #[command(flatten)]
        sensor: SensorArgs,

        /// Time between readings in milliseconds
        #[arg(short, long, default_value_t = 1000)]
        interval_ms: u64,

        /// Stop after this many readings (default: run until killed)
        #[arg(short, long)]
        count: Option<u64>,
    },

    /// Show the decoded fault status
    Fault {
        #[command(flatten)]
        sensor: SensorArgs,

        /// Run a fault detection cycle first
        #[arg(long, value_enum)]
        cycle: Option<CycleArg>,

        /// Clear the fault status after printing it
        #[arg(long)]
        clear: bool,
    },

    /// List available backends
    ListBackends,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_are_pt100() {
        let cli = parse(&["rtdprobe", "read", "-b", "dummy"]);
        let Commands::Read { sensor, fahrenheit } = cli.command else {
            panic!("expected read");
        };
        assert!(!fahrenheit);
        assert_eq!(sensor.rtd_config(), RtdConfig::pt100());
    }

    #[test]
    fn test_sensor_overrides() {
        let cli = parse(&[
            "rtdprobe",
            "watch",
            "-b",
            "dummy",
            "--sensor",
            "pt1000",
            "--wires",
            "3",
            "--filter",
            "50",
            "--ref-resistor",
            "4020",
            "--count",
            "2",
        ]);
        let Commands::Watch { sensor, count, interval_ms } = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(count, Some(2));
        assert_eq!(interval_ms, 1000);

        let config = sensor.rtd_config();
        assert_eq!(config.wires, WireMode::Three);
        assert_eq!(config.filter, FilterMode::Hz50);
        assert_eq!(config.rtd_nominal, 1000.0);
        assert_eq!(config.ref_resistor, 4020.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["rtdprobe", "read", "-b", "dummy", "--wires", "5"]).is_err());
        assert!(Cli::try_parse_from(["rtdprobe", "read", "-b", "dummy", "--filter", "55"]).is_err());
        assert!(Cli::try_parse_from(["rtdprobe", "read"]).is_err());
    }

    #[test]
    fn test_verbosity_is_global() {
        let cli = parse(&["rtdprobe", "fault", "-b", "dummy", "--cycle", "auto", "-vv"]);
        assert_eq!(cli.verbose, 2);
        let Commands::Fault { cycle, clear, .. } = cli.command else {
            panic!("expected fault");
        };
        assert_eq!(cycle, Some(CycleArg::Auto));
        assert!(!clear);
    }
}

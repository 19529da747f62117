mod request;

use anyhow::{Context, Result};
use chrono::Timelike;
use clap::{Parser, Subcommand};
use env_logger::Env;
use fourletter_core::{ClockTime, FourLetterController, HardwareConfig};
use log::info;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fourletterd", version)]
#[command(about = "Four-letter seven-segment display daemon", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug log level
    #[arg(short = 'v', long, alias = "verbose", global = true)]
    debug: bool,

    /// JSON hardware config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// I2C bus device path (e.g., /dev/i2c-1)
    #[arg(long, global = true)]
    i2c_bus: Option<PathBuf>,

    /// I2C address of the display (e.g., 0x70)
    #[arg(long, value_parser = parse_address, global = true)]
    address: Option<u8>,

    /// Boot config holding the i2c_arm switch
    #[arg(long, global = true)]
    boot_config: Option<PathBuf>,

    /// File listing kernel modules loaded at boot
    #[arg(long, global = true)]
    modules_file: Option<PathBuf>,

    /// User settings file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Delay between scroll steps in milliseconds
    #[arg(long, global = true)]
    scroll_delay_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve JSON-lines commands and events from stdin
    Run,
    /// Enable the I2C bus and i2c-dev module
    Install,
    /// Leave the I2C setup in place
    Uninstall,
    /// Show installation state and settings
    Status,
}

fn parse_address(raw: &str) -> Result<u8, String> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|e| format!("invalid I2C address {:?}: {}", raw, e))
}

impl Cli {
    fn hardware_config(&self) -> Result<HardwareConfig> {
        let mut config = match &self.config {
            Some(path) => HardwareConfig::load(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => HardwareConfig::default(),
        };
        if let Some(bus) = &self.i2c_bus {
            config.i2c_bus = bus.clone();
        }
        if let Some(address) = self.address {
            config.address = address;
        }
        if let Some(path) = &self.boot_config {
            config.boot_config = path.clone();
        }
        if let Some(path) = &self.modules_file {
            config.modules_file = path.clone();
        }
        if let Some(path) = &self.settings {
            config.settings_path = path.clone();
        }
        if let Some(delay) = self.scroll_delay_ms {
            config.scroll_delay_ms = delay;
        }
        Ok(config)
    }
}

fn current_time() -> Result<ClockTime> {
    let now = chrono::Local::now();
    Ok(ClockTime::new(now.hour(), now.minute())?)
}

fn run(controller: &mut FourLetterController) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    request::run_session(controller, current_time()?, stdin.lock(), stdout.lock())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(if cli.debug {
        "debug"
    } else {
        "info"
    }))
    .format_timestamp_secs()
    .init();

    let config = cli.hardware_config()?;
    info!(
        "{} v{} on {} @ {:#04x}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.i2c_bus.display(),
        config.address
    );
    let mut controller = FourLetterController::open(&config)?;

    match cli.command {
        Commands::Run => run(&mut controller)?,
        Commands::Install => {
            controller
                .install()
                .context("enabling i2c (are you root?)")?;
            println!("I2C enabled; reboot to load the bus and module");
        }
        Commands::Uninstall => controller.uninstall(),
        Commands::Status => {
            println!("installed: {}", controller.is_installed());
            println!("{}", serde_json::to_string_pretty(controller.settings())?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x70"), Ok(0x70));
        assert_eq!(parse_address("113"), Ok(0x71));
        assert!(parse_address("0x1ff").is_err());
        assert!(parse_address("display").is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "fourletterd",
            "status",
            "--i2c-bus",
            "/dev/i2c-0",
            "--address",
            "0x71",
        ]);
        let config = cli.hardware_config().unwrap();
        assert_eq!(config.i2c_bus, PathBuf::from("/dev/i2c-0"));
        assert_eq!(config.address, 0x71);
        assert_eq!(config.scroll_delay_ms, 300);
    }
}

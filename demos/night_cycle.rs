//! Example: Run a sunset/sunrise cycle on the real display.
//!
//! Run with: `cargo run --example night_cycle`

use std::thread;
use std::time::Duration;

use fourletter_core::{
    Brightness, ClockTime, ControllerError, FourLetterController, HardwareConfig, HardwarePolicy,
};

fn main() -> Result<(), ControllerError> {
    // Initialize logging (optional)
    env_logger::init();

    let mut controller = FourLetterController::open(&HardwareConfig::default())?;
    if !controller.is_installed() {
        eprintln!("I2C is not enabled; run `fourletterd install` and reboot first");
        return Ok(());
    }

    controller.start(ClockTime::new(18, 59)?, HardwarePolicy::Propagate)?;
    controller.set_night_brightness(Brightness::new(2)?)?;
    controller.enable_night_mode(true)?;

    println!("Sunset...");
    controller.on_sunset()?;
    println!("Brightness now {}", controller.state().effective_brightness());
    controller.display_message("good night")?;
    thread::sleep(Duration::from_secs(2));

    println!("Sunrise...");
    controller.on_sunrise()?;
    println!("Brightness now {}", controller.state().effective_brightness());
    controller.render_time(ClockTime::new(7, 0)?)?;
    thread::sleep(Duration::from_secs(2));

    controller.stop(HardwarePolicy::Propagate)
}

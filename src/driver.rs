//! HT16K33 seven-segment driver.
//!
//! The four-letter display sits behind an HT16K33 LED controller on the I2C bus. The driver
//! keeps a four cell buffer; [`SegmentDisplay::show`] pushes it to display RAM. Decimal points
//! set through [`SegmentDisplay::set_decimal`] are kept apart from the text and OR'd into
//! every frame.

use crate::adapter::DeviceConnector;
use crate::error::DriverError;
use crate::font::{self, DOT};
use crate::state::CELL_COUNT;

use embedded_hal::i2c::I2c;
use linux_embedded_hal::I2cdev;
use log::{debug, info};
use std::path::PathBuf;
use std::time::Duration;

/// Default 7-bit I2C address of the HT16K33.
pub const DEFAULT_ADDRESS: u8 = 0x70;

const CMD_SYSTEM_SETUP: u8 = 0x20;
const OSCILLATOR_ON: u8 = 0x01;
const CMD_DISPLAY_SETUP: u8 = 0x80;
const DISPLAY_ON: u8 = 0x01;
const CMD_DIMMING: u8 = 0xE0;
const RAM_START: u8 = 0x00;

/// Operations the controller needs from the display hardware.
pub trait SegmentDisplay: Send {
    /// Blank the buffer, decimal points included. Call [`show`](Self::show) to push it.
    fn clear(&mut self) -> Result<(), DriverError>;

    /// Push the buffer to the display.
    fn show(&mut self) -> Result<(), DriverError>;

    /// Write text and show it, scrolling when it does not fit in four cells.
    fn print_text(&mut self, text: &str) -> Result<(), DriverError>;

    /// Set hardware dimming (0-15). Takes effect immediately.
    fn set_brightness(&mut self, value: u8) -> Result<(), DriverError>;

    /// Set the decimal point of one cell (0-3) in the buffer.
    fn set_decimal(&mut self, cell: usize, on: bool) -> Result<(), DriverError>;
}

/// HT16K33 driving four seven-segment cells.
pub struct Ht16k33<I2C> {
    i2c: I2C,
    address: u8,
    glyphs: [u8; CELL_COUNT],
    points: [bool; CELL_COUNT],
    scroll_delay: Duration,
}

impl<I2C: I2c> Ht16k33<I2C> {
    /// Wrap an I2C bus. Nothing is sent until [`init`](Self::init).
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            glyphs: [0; CELL_COUNT],
            points: [false; CELL_COUNT],
            scroll_delay: Duration::from_millis(300),
        }
    }

    /// Delay between scroll steps for text longer than four cells.
    pub fn with_scroll_delay(mut self, delay: Duration) -> Self {
        self.scroll_delay = delay;
        self
    }

    /// Start the oscillator, switch the display on (no blink) and blank it.
    pub fn init(&mut self) -> Result<(), DriverError> {
        self.command(CMD_SYSTEM_SETUP | OSCILLATOR_ON)?;
        self.command(CMD_DISPLAY_SETUP | DISPLAY_ON)?;
        self.glyphs = [0; CELL_COUNT];
        self.points = [false; CELL_COUNT];
        self.write_ram()
    }

    /// Current buffer contents, one pattern per cell, decimal points included.
    pub fn cells(&self) -> [u8; CELL_COUNT] {
        let mut cells = self.glyphs;
        for (cell, point) in cells.iter_mut().zip(self.points) {
            if point {
                *cell |= DOT;
            }
        }
        cells
    }

    /// Release the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn command(&mut self, byte: u8) -> Result<(), DriverError> {
        self.i2c.write(self.address, &[byte]).map_err(bus_error)
    }

    fn write_ram(&mut self) -> Result<(), DriverError> {
        // each cell occupies one 16-bit row; the high byte is unused on seven-segment parts
        let mut frame = [0u8; 1 + CELL_COUNT * 2];
        frame[0] = RAM_START;
        for (i, cell) in self.cells().into_iter().enumerate() {
            frame[1 + i * 2] = cell;
        }
        self.i2c.write(self.address, &frame).map_err(bus_error)
    }

    fn load_frame(&mut self, frame: &[u8]) {
        for (i, glyph) in self.glyphs.iter_mut().enumerate() {
            *glyph = frame.get(i).copied().unwrap_or(0);
        }
    }
}

impl<I2C: I2c + Send> SegmentDisplay for Ht16k33<I2C> {
    fn clear(&mut self) -> Result<(), DriverError> {
        self.glyphs = [0; CELL_COUNT];
        self.points = [false; CELL_COUNT];
        Ok(())
    }

    fn show(&mut self) -> Result<(), DriverError> {
        self.write_ram()
    }

    fn print_text(&mut self, text: &str) -> Result<(), DriverError> {
        let rendered = font::render(text);
        if rendered.len() <= CELL_COUNT {
            self.load_frame(&rendered);
            return self.write_ram();
        }

        debug!("scrolling {} cells of text", rendered.len());
        let steps = rendered.len() - CELL_COUNT + 1;
        for (step, frame) in rendered.windows(CELL_COUNT).enumerate() {
            self.load_frame(frame);
            self.write_ram()?;
            if step + 1 < steps {
                std::thread::sleep(self.scroll_delay);
            }
        }
        Ok(())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DriverError> {
        let value = value.min(15);
        self.command(CMD_DIMMING | value)
    }

    fn set_decimal(&mut self, cell: usize, on: bool) -> Result<(), DriverError> {
        let Some(point) = self.points.get_mut(cell) else {
            return Err(DriverError::Bus(format!("no cell {}", cell)));
        };
        *point = on;
        Ok(())
    }
}

fn bus_error<E: embedded_hal::i2c::Error>(err: E) -> DriverError {
    DriverError::Bus(format!("{:?}", err.kind()))
}

/// Opens the display on a Linux I2C bus device such as `/dev/i2c-1`.
#[derive(Debug, Clone)]
pub struct I2cConnector {
    bus: PathBuf,
    address: u8,
    scroll_delay: Duration,
}

impl I2cConnector {
    /// Connector for the display at `address` on `bus`.
    pub fn new(bus: impl Into<PathBuf>, address: u8, scroll_delay: Duration) -> Self {
        Self {
            bus: bus.into(),
            address,
            scroll_delay,
        }
    }
}

impl DeviceConnector for I2cConnector {
    fn connect(&mut self) -> Result<Box<dyn SegmentDisplay>, DriverError> {
        info!(
            "opening display on {} at address 0x{:02X}",
            self.bus.display(),
            self.address
        );
        let i2c = I2cdev::new(&self.bus)
            .map_err(|e| DriverError::Open(format!("{}: {}", self.bus.display(), e)))?;
        let mut display = Ht16k33::new(i2c, self.address).with_scroll_delay(self.scroll_delay);
        display.init()?;
        Ok(Box::new(display))
    }
}

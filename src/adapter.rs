//! Hardware enablement adapter.
//!
//! Owns the OS prerequisites (I2C bus + `i2c-dev` module) and the display handle. The handle
//! is opened lazily and only after the prerequisites are re-checked; a failed driver call drops
//! it so the next operation probes the hardware again.

use crate::driver::SegmentDisplay;
use crate::error::{ControllerError, DriverError};
use log::{debug, info, warn};
use std::io;

/// Kernel module the display needs for userspace I2C access.
pub const I2C_DEV_MODULE: &str = "i2c-dev";

/// OS-level bus and kernel-module configuration.
pub trait OsAdapter: Send {
    /// Whether the I2C bus is enabled.
    fn is_i2c_enabled(&self) -> io::Result<bool>;

    /// Enable the I2C bus.
    fn enable_i2c(&mut self) -> io::Result<()>;

    /// Whether `module` is configured to load.
    fn is_module_enabled(&self, module: &str) -> io::Result<bool>;

    /// Configure `module` to load.
    fn enable_module(&mut self, module: &str) -> io::Result<()>;
}

/// Opens the display driver.
pub trait DeviceConnector: Send {
    /// Open and initialise the display.
    fn connect(&mut self) -> Result<Box<dyn SegmentDisplay>, DriverError>;
}

/// Checks and enables the display prerequisites, and hands out the device handle.
pub struct HardwareAdapter {
    os: Box<dyn OsAdapter>,
    connector: Box<dyn DeviceConnector>,
    device: Option<Box<dyn SegmentDisplay>>,
}

impl HardwareAdapter {
    /// Create an adapter. Nothing is probed or opened yet.
    pub fn new(os: Box<dyn OsAdapter>, connector: Box<dyn DeviceConnector>) -> Self {
        Self {
            os,
            connector,
            device: None,
        }
    }

    /// Enable the I2C bus and the `i2c-dev` module. Safe to call repeatedly.
    pub fn install(&mut self) -> io::Result<()> {
        self.os.enable_i2c()?;
        self.os.enable_module(I2C_DEV_MODULE)?;
        info!("i2c bus and {} module enabled", I2C_DEV_MODULE);
        Ok(())
    }

    /// Does nothing: other devices may share the bus and module, so they stay enabled.
    pub fn uninstall(&mut self) {
        debug!("uninstall leaves i2c bus and {} module enabled", I2C_DEV_MODULE);
    }

    /// True when both the bus and the module are enabled. Checked on every call.
    pub fn is_installed(&self) -> bool {
        let bus = self.os.is_i2c_enabled().unwrap_or_else(|e| {
            warn!("cannot read i2c bus state: {}", e);
            false
        });
        let module = self.os.is_module_enabled(I2C_DEV_MODULE).unwrap_or_else(|e| {
            warn!("cannot read {} module state: {}", I2C_DEV_MODULE, e);
            false
        });
        bus && module
    }

    /// Get the display, opening it if needed.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::NotInstalled`] if the prerequisites are missing
    /// - [`ControllerError::NotConnected`] if the display cannot be opened
    pub fn device(&mut self) -> Result<&mut dyn SegmentDisplay, ControllerError> {
        if !self.is_installed() {
            self.device = None;
            return Err(ControllerError::NotInstalled);
        }
        let device = match self.device.take() {
            Some(device) => device,
            None => self
                .connector
                .connect()
                .map_err(ControllerError::NotConnected)?,
        };
        Ok(&mut **self.device.insert(device))
    }

    /// Run `op` against the display. A driver failure drops the handle.
    pub fn with_device<T>(
        &mut self,
        op: impl FnOnce(&mut dyn SegmentDisplay) -> Result<T, DriverError>,
    ) -> Result<T, ControllerError> {
        let result = op(self.device()?);
        result.map_err(|e| {
            warn!("display write failed, dropping handle: {}", e);
            self.device = None;
            ControllerError::NotConnected(e)
        })
    }

    /// Whether a device handle is currently open.
    pub fn is_connected(&self) -> bool {
        self.device.is_some()
    }
}

//! Mock hardware and storage for testing.
//!
//! Every mock is a cheap handle over shared state, so a test can keep a clone after
//! handing the original to the controller and inspect what happened.

use crate::adapter::{DeviceConnector, I2C_DEV_MODULE, OsAdapter};
use crate::driver::SegmentDisplay;
use crate::error::DriverError;
use crate::settings::{Settings, SettingsError, SettingsStore};
use crate::state::CELL_COUNT;
use std::io;
use std::sync::{Arc, Mutex};

/// One call received by a [`MockDisplay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    /// `clear()`
    Clear,
    /// `show()`
    Show,
    /// `print_text(text)`
    Print(String),
    /// `set_brightness(value)`
    Brightness(u8),
    /// `set_decimal(cell, on)`
    Decimal(usize, bool),
}

#[derive(Debug, Default)]
struct DisplayLog {
    ops: Vec<DisplayOp>,
    write_error: bool,
}

/// A display that records every call.
///
/// # Example
///
/// ```
/// use fourletter_core::{DisplayOp, MockDisplay, SegmentDisplay};
///
/// let mock = MockDisplay::new();
/// let mut display = mock.clone();
/// display.set_brightness(7).unwrap();
/// assert_eq!(mock.ops(), vec![DisplayOp::Brightness(7)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockDisplay {
    log: Arc<Mutex<DisplayLog>>,
}

impl MockDisplay {
    /// Create a mock display with an empty call log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls so far, oldest first.
    pub fn ops(&self) -> Vec<DisplayOp> {
        self.log.lock().unwrap().ops.clone()
    }

    /// Brightness values written so far, oldest first.
    pub fn brightness_writes(&self) -> Vec<u8> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                DisplayOp::Brightness(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded calls.
    pub fn clear_ops(&self) {
        self.log.lock().unwrap().ops.clear();
    }

    /// Make every following call fail like a disconnected bus.
    pub fn set_write_error(&self, fail: bool) {
        self.log.lock().unwrap().write_error = fail;
    }

    fn record(&self, op: DisplayOp) -> Result<(), DriverError> {
        let mut log = self.log.lock().unwrap();
        if log.write_error {
            return Err(DriverError::Bus("simulated write failure".to_string()));
        }
        log.ops.push(op);
        Ok(())
    }
}

impl SegmentDisplay for MockDisplay {
    fn clear(&mut self) -> Result<(), DriverError> {
        self.record(DisplayOp::Clear)
    }

    fn show(&mut self) -> Result<(), DriverError> {
        self.record(DisplayOp::Show)
    }

    fn print_text(&mut self, text: &str) -> Result<(), DriverError> {
        self.record(DisplayOp::Print(text.to_string()))
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DriverError> {
        self.record(DisplayOp::Brightness(value))
    }

    fn set_decimal(&mut self, cell: usize, on: bool) -> Result<(), DriverError> {
        if cell >= CELL_COUNT {
            return Err(DriverError::Bus(format!("no cell {}", cell)));
        }
        self.record(DisplayOp::Decimal(cell, on))
    }
}

#[derive(Debug, Default)]
struct ConnectorState {
    connects: usize,
    connect_error: bool,
}

/// Connector handing out a shared [`MockDisplay`].
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<ConnectorState>>,
    display: MockDisplay,
}

impl MockConnector {
    /// Create a connector that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// The display every successful connect returns.
    pub fn display(&self) -> MockDisplay {
        self.display.clone()
    }

    /// Number of connect attempts that succeeded.
    pub fn connect_count(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    /// Make connects fail like an absent device.
    pub fn set_connect_error(&self, fail: bool) {
        self.state.lock().unwrap().connect_error = fail;
    }
}

impl DeviceConnector for MockConnector {
    fn connect(&mut self) -> Result<Box<dyn SegmentDisplay>, DriverError> {
        let mut state = self.state.lock().unwrap();
        if state.connect_error {
            return Err(DriverError::Open("simulated missing device".to_string()));
        }
        state.connects += 1;
        Ok(Box::new(self.display.clone()))
    }
}

#[derive(Debug, Default)]
struct OsState {
    i2c_enabled: bool,
    modules: Vec<String>,
    enable_calls: usize,
    read_error: bool,
}

/// In-memory bus and module configuration.
#[derive(Debug, Clone, Default)]
pub struct MockOs {
    state: Arc<Mutex<OsState>>,
}

impl MockOs {
    /// Start with the given bus and `i2c-dev` module state.
    pub fn new(i2c_enabled: bool, module_enabled: bool) -> Self {
        let os = Self::default();
        os.set_state(i2c_enabled, module_enabled);
        os
    }

    /// Change the bus and `i2c-dev` module state, as if done outside the controller.
    pub fn set_state(&self, i2c_enabled: bool, module_enabled: bool) {
        let mut state = self.state.lock().unwrap();
        state.i2c_enabled = i2c_enabled;
        state.modules.retain(|m| m != I2C_DEV_MODULE);
        if module_enabled {
            state.modules.push(I2C_DEV_MODULE.to_string());
        }
    }

    /// Number of enable calls (bus or module) received.
    pub fn enable_calls(&self) -> usize {
        self.state.lock().unwrap().enable_calls
    }

    /// Modules currently enabled.
    pub fn enabled_modules(&self) -> Vec<String> {
        self.state.lock().unwrap().modules.clone()
    }

    /// Make queries fail like an unreadable configuration file.
    pub fn set_read_error(&self, fail: bool) {
        self.state.lock().unwrap().read_error = fail;
    }

    fn read_error(&self) -> io::Result<()> {
        if self.state.lock().unwrap().read_error {
            return Err(io::Error::other("simulated read failure"));
        }
        Ok(())
    }
}

impl OsAdapter for MockOs {
    fn is_i2c_enabled(&self) -> io::Result<bool> {
        self.read_error()?;
        Ok(self.state.lock().unwrap().i2c_enabled)
    }

    fn enable_i2c(&mut self) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.enable_calls += 1;
        state.i2c_enabled = true;
        Ok(())
    }

    fn is_module_enabled(&self, module: &str) -> io::Result<bool> {
        self.read_error()?;
        Ok(self.state.lock().unwrap().modules.iter().any(|m| m == module))
    }

    fn enable_module(&mut self, module: &str) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.enable_calls += 1;
        if !state.modules.iter().any(|m| m == module) {
            state.modules.push(module.to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct StoreState {
    settings: Option<Settings>,
    saves: usize,
    save_error: bool,
}

/// Settings kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    /// An empty store; loads return defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding `settings`.
    pub fn with_settings(settings: Settings) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().settings = Some(settings);
        store
    }

    /// The last saved settings, if any.
    pub fn saved(&self) -> Option<Settings> {
        self.state.lock().unwrap().settings
    }

    /// Number of saves so far.
    pub fn save_count(&self) -> usize {
        self.state.lock().unwrap().saves
    }

    /// Make saves fail.
    pub fn set_save_error(&self, fail: bool) {
        self.state.lock().unwrap().save_error = fail;
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        Ok(self.state.lock().unwrap().settings.unwrap_or_default())
    }

    fn save(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        let mut state = self.state.lock().unwrap();
        if state.save_error {
            return Err(SettingsError::Validation(
                "simulated storage failure".to_string(),
            ));
        }
        state.settings = Some(*settings);
        state.saves += 1;
        Ok(())
    }
}

//! Four-letter display controller implementation.

use crate::adapter::HardwareAdapter;
use crate::brightness::{Brightness, TimeOfDay};
use crate::config::HardwareConfig;
use crate::driver::I2cConnector;
use crate::error::ControllerError;
use crate::event::{ClockTime, HostEvent};
use crate::os::BootFiles;
use crate::settings::{JsonFileStore, Settings, SettingsStore};
use crate::state::{CELL_COUNT, DisplayState};

use log::{debug, info, warn};
use std::io;

/// Cell whose decimal point signals active alarms.
pub const ALARM_CELL: usize = 3;

/// What to do with hardware-absent failures during start and stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwarePolicy {
    /// Return every error.
    Propagate,
    /// Log [`ControllerError::NotInstalled`] and [`ControllerError::NotConnected`] and carry on.
    IgnoreAbsent,
}

impl HardwarePolicy {
    fn apply(
        self,
        context: &str,
        result: Result<(), ControllerError>,
    ) -> Result<(), ControllerError> {
        match (self, result) {
            (HardwarePolicy::IgnoreAbsent, Err(e)) if e.is_hardware_absent() => {
                warn!("{} skipped: {}", context, e);
                Ok(())
            }
            (_, result) => result,
        }
    }
}

/// The four-letter display controller.
///
/// Owns the display state and translates commands and host events into hardware calls.
/// Every hardware call re-checks that the bus is installed first.
///
/// # Example
///
/// ```
/// use fourletter_core::{
///     Brightness, FourLetterController, HardwareAdapter, MemoryStore, MockConnector, MockOs,
/// };
///
/// let connector = MockConnector::new();
/// let adapter = HardwareAdapter::new(
///     Box::new(MockOs::new(true, true)),
///     Box::new(connector.clone()),
/// );
/// let mut controller = FourLetterController::new(adapter, Box::new(MemoryStore::new()))?;
///
/// controller.enable_night_mode(true)?;
/// controller.set_night_brightness(Brightness::new(2)?)?;
/// controller.on_sunset()?;
/// assert_eq!(connector.display().brightness_writes().last(), Some(&2));
/// # Ok::<(), fourletter_core::ControllerError>(())
/// ```
pub struct FourLetterController {
    adapter: HardwareAdapter,
    store: Box<dyn SettingsStore>,
    settings: Settings,
    time_of_day: TimeOfDay,
    indicators: [bool; CELL_COUNT],
}

impl FourLetterController {
    /// Create a controller, loading the persisted settings. The hardware is not touched.
    pub fn new(
        adapter: HardwareAdapter,
        store: Box<dyn SettingsStore>,
    ) -> Result<Self, ControllerError> {
        let settings = store.load()?;
        debug!("loaded settings: {:?}", settings);
        Ok(Self {
            adapter,
            store,
            settings,
            time_of_day: TimeOfDay::Day,
            indicators: [false; CELL_COUNT],
        })
    }

    /// Create a controller for the real hardware described by `config`.
    pub fn open(config: &HardwareConfig) -> Result<Self, ControllerError> {
        let adapter = HardwareAdapter::new(
            Box::new(BootFiles::new(&config.boot_config, &config.modules_file)),
            Box::new(I2cConnector::new(
                &config.i2c_bus,
                config.address,
                config.scroll_delay(),
            )),
        );
        Self::new(adapter, Box::new(JsonFileStore::new(&config.settings_path)))
    }

    /// Get a snapshot of the current state.
    pub fn state(&self) -> DisplayState {
        DisplayState {
            brightness: self.settings.brightness,
            night_brightness: self.settings.night_brightness,
            night_mode: self.settings.night_mode,
            time_of_day: self.time_of_day,
            indicators: self.indicators,
        }
    }

    /// The persisted settings as currently held.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Enable the I2C bus and module.
    pub fn install(&mut self) -> io::Result<()> {
        self.adapter.install()
    }

    /// Leaves the bus and module enabled; see [`HardwareAdapter::uninstall`].
    pub fn uninstall(&mut self) {
        self.adapter.uninstall()
    }

    /// Whether the I2C prerequisites are in place.
    pub fn is_installed(&self) -> bool {
        self.adapter.is_installed()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Re-apply the persisted brightness and show the current time.
    pub fn start(
        &mut self,
        now: ClockTime,
        policy: HardwarePolicy,
    ) -> Result<(), ControllerError> {
        info!("starting four-letter display controller");
        let brightness = self.state().effective_brightness();
        let result = self.apply_brightness(brightness);
        policy.apply("restoring brightness", result)?;
        let result = self.render_time(now);
        policy.apply("rendering time", result)
    }

    /// Blank the display.
    pub fn stop(&mut self, policy: HardwarePolicy) -> Result<(), ControllerError> {
        info!("stopping four-letter display controller");
        let result = self.clear();
        policy.apply("clearing display", result)
    }

    // -------------------------------------------------------------------------
    // Brightness and night mode
    // -------------------------------------------------------------------------

    /// Set the daytime brightness. The display only changes outside the night state.
    pub fn set_brightness(&mut self, brightness: Brightness) -> Result<(), ControllerError> {
        self.settings.brightness = brightness;
        self.persist()?;
        if self.state().is_night_state() {
            debug!("brightness {} stored, night brightness stays on", brightness);
            return Ok(());
        }
        self.apply_brightness(brightness)
    }

    /// Set the night brightness. The display only changes in the night state.
    pub fn set_night_brightness(&mut self, brightness: Brightness) -> Result<(), ControllerError> {
        self.settings.night_brightness = brightness;
        self.persist()?;
        if !self.state().is_night_state() {
            debug!("night brightness {} stored for later", brightness);
            return Ok(());
        }
        self.apply_brightness(brightness)
    }

    /// Turn night mode on or off and apply the resulting brightness right away.
    pub fn enable_night_mode(&mut self, enable: bool) -> Result<(), ControllerError> {
        self.settings.night_mode = enable;
        self.persist()?;
        let brightness = self.state().effective_brightness();
        debug!("night mode {}, applying {}", if enable { "on" } else { "off" }, brightness);
        self.apply_brightness(brightness)
    }

    /// The sun rose.
    pub fn on_sunrise(&mut self) -> Result<(), ControllerError> {
        self.time_of_day = TimeOfDay::Day;
        if !self.settings.night_mode {
            return Ok(());
        }
        let brightness = self.settings.brightness;
        info!("sunrise: restore brightness to {}", brightness);
        self.apply_brightness(brightness)
    }

    /// The sun set.
    pub fn on_sunset(&mut self) -> Result<(), ControllerError> {
        self.time_of_day = TimeOfDay::Night;
        if !self.settings.night_mode {
            return Ok(());
        }
        let brightness = self.settings.night_brightness;
        info!("sunset: dim brightness to {}", brightness);
        self.apply_brightness(brightness)
    }

    // -------------------------------------------------------------------------
    // Content
    // -------------------------------------------------------------------------

    /// Show a message. Text longer than four cells scrolls.
    pub fn display_message(&mut self, message: &str) -> Result<(), ControllerError> {
        if message.is_empty() {
            return Err(ControllerError::InvalidParameter {
                name: "message",
                message: "Parameter \"message\" must not be empty".to_string(),
            });
        }
        debug!("display message {:?}", message);
        self.adapter.with_device(|d| d.print_text(message))
    }

    /// Switch one decimal-point indicator.
    pub fn set_indicator(&mut self, cell: usize, on: bool) -> Result<(), ControllerError> {
        if cell >= CELL_COUNT {
            return Err(ControllerError::InvalidParameter {
                name: "cell",
                message: format!("Parameter \"cell\" must be between 0..{}", CELL_COUNT - 1),
            });
        }
        let mut indicators = self.indicators;
        indicators[cell] = on;
        self.set_indicators(indicators)
    }

    /// Set all four decimal-point indicators at once.
    pub fn set_indicators(
        &mut self,
        indicators: [bool; CELL_COUNT],
    ) -> Result<(), ControllerError> {
        self.indicators = indicators;
        self.adapter.with_device(|d| {
            for (cell, on) in indicators.iter().enumerate() {
                d.set_decimal(cell, *on)?;
            }
            d.show()
        })
    }

    /// Blank every cell and indicator.
    pub fn clear(&mut self) -> Result<(), ControllerError> {
        self.adapter.with_device(|d| {
            d.clear()?;
            d.show()
        })?;
        self.indicators = [false; CELL_COUNT];
        Ok(())
    }

    /// Show the time as `HH.MM`. The separator is part of the text, so the indicators are
    /// left alone.
    pub fn render_time(&mut self, now: ClockTime) -> Result<(), ControllerError> {
        let text = format!("{:02}.{:02}", now.hour(), now.minute());
        self.display_message(&text)
    }

    /// Light the alarm indicator while any alarm is active.
    pub fn set_alarm_count(&mut self, count: u32) -> Result<(), ControllerError> {
        debug!("{} active alarm(s)", count);
        self.set_indicator(ALARM_CELL, count > 0)
    }

    /// Dispatch a host event.
    pub fn handle_event(&mut self, event: &HostEvent) -> Result<(), ControllerError> {
        match event {
            HostEvent::Sunrise => self.on_sunrise(),
            HostEvent::Sunset => self.on_sunset(),
            HostEvent::TimeNow(now) => self.render_time(*now),
            HostEvent::DisplayMessage(message) => self.display_message(message),
            HostEvent::AlarmCount(count) => self.set_alarm_count(*count),
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn apply_brightness(&mut self, brightness: Brightness) -> Result<(), ControllerError> {
        self.adapter
            .with_device(|d| d.set_brightness(brightness.value()))?;
        debug!("brightness set to {}", brightness);
        if self.settings.applied_brightness != Some(brightness) {
            self.settings.applied_brightness = Some(brightness);
            self.persist()?;
        }
        Ok(())
    }

    fn persist(&mut self) -> Result<(), ControllerError> {
        self.store.save(&self.settings)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{DisplayOp, MemoryStore, MockConnector, MockOs};

    struct Rig {
        controller: FourLetterController,
        os: MockOs,
        connector: MockConnector,
        store: MemoryStore,
    }

    impl Rig {
        fn new() -> Self {
            Self::with_settings(Settings::default())
        }

        fn with_settings(settings: Settings) -> Self {
            let os = MockOs::new(true, true);
            let connector = MockConnector::new();
            let store = MemoryStore::with_settings(settings);
            let adapter = HardwareAdapter::new(Box::new(os.clone()), Box::new(connector.clone()));
            let controller = FourLetterController::new(adapter, Box::new(store.clone())).unwrap();
            Self {
                controller,
                os,
                connector,
                store,
            }
        }

        fn ops(&self) -> Vec<DisplayOp> {
            self.connector.display().ops()
        }

        fn brightness_writes(&self) -> Vec<u8> {
            self.connector.display().brightness_writes()
        }

        fn reset(&self) {
            self.connector.display().clear_ops();
        }
    }

    fn b(v: u8) -> Brightness {
        Brightness::new(v).unwrap()
    }

    fn night_settings() -> Settings {
        Settings {
            brightness: b(15),
            night_mode: true,
            night_brightness: b(4),
            applied_brightness: None,
        }
    }

    #[test]
    fn test_set_brightness_during_day() {
        for v in 0..=15 {
            let mut rig = Rig::new();
            rig.controller.set_brightness(b(v)).unwrap();
            assert_eq!(rig.store.saved().unwrap().brightness, b(v));
            assert_eq!(rig.brightness_writes(), vec![v]);
        }
    }

    #[test]
    fn test_set_brightness_during_night() {
        let mut rig = Rig::with_settings(night_settings());
        rig.controller.on_sunset().unwrap();
        rig.reset();

        rig.controller.set_brightness(b(2)).unwrap();
        assert_eq!(rig.store.saved().unwrap().brightness, b(2));
        assert!(rig.brightness_writes().is_empty());
    }

    #[test]
    fn test_set_brightness_at_night_without_night_mode() {
        let mut rig = Rig::new();
        rig.controller.on_sunset().unwrap();
        rig.controller.set_brightness(b(6)).unwrap();
        assert_eq!(rig.brightness_writes(), vec![6]);
    }

    #[test]
    fn test_set_night_brightness_during_day() {
        let mut rig = Rig::with_settings(night_settings());
        rig.controller.set_night_brightness(b(12)).unwrap();
        assert_eq!(rig.store.saved().unwrap().night_brightness, b(12));
        assert!(rig.brightness_writes().is_empty());
    }

    #[test]
    fn test_set_night_brightness_during_night() {
        let mut rig = Rig::with_settings(night_settings());
        rig.controller.on_sunset().unwrap();
        rig.reset();

        rig.controller.set_night_brightness(b(2)).unwrap();
        assert_eq!(rig.store.saved().unwrap().night_brightness, b(2));
        assert_eq!(rig.brightness_writes(), vec![2]);
    }

    #[test]
    fn test_sunset_then_sunrise() {
        let mut rig = Rig::with_settings(night_settings());
        rig.controller.on_sunset().unwrap();
        assert_eq!(rig.brightness_writes(), vec![4]);
        assert_eq!(rig.controller.state().time_of_day, TimeOfDay::Night);

        rig.controller.on_sunrise().unwrap();
        assert_eq!(rig.brightness_writes(), vec![4, 15]);
        assert_eq!(rig.controller.state().time_of_day, TimeOfDay::Day);
    }

    #[test]
    fn test_sun_events_without_night_mode() {
        let mut rig = Rig::new();
        rig.controller.on_sunset().unwrap();
        rig.controller.on_sunrise().unwrap();
        assert!(rig.ops().is_empty());
    }

    #[test]
    fn test_sun_events_track_time_of_day_without_hardware() {
        let mut rig = Rig::new();
        rig.os.set_state(false, false);
        rig.controller.on_sunset().unwrap();
        assert!(rig.controller.state().time_of_day == TimeOfDay::Night);
    }

    #[test]
    fn test_enable_night_mode_during_day() {
        let mut rig = Rig::with_settings(Settings {
            brightness: b(6),
            ..Settings::default()
        });
        rig.controller.enable_night_mode(true).unwrap();
        assert!(rig.store.saved().unwrap().night_mode);
        assert_eq!(rig.brightness_writes(), vec![6]);
    }

    #[test]
    fn test_enable_night_mode_during_night() {
        let mut rig = Rig::with_settings(Settings {
            brightness: b(15),
            night_brightness: b(6),
            ..Settings::default()
        });
        rig.controller.on_sunset().unwrap();
        rig.controller.enable_night_mode(true).unwrap();
        assert_eq!(rig.brightness_writes(), vec![6]);
    }

    #[test]
    fn test_disable_night_mode_during_night_restores_brightness() {
        let mut rig = Rig::with_settings(night_settings());
        rig.controller.on_sunset().unwrap();
        rig.controller.enable_night_mode(false).unwrap();
        assert!(!rig.store.saved().unwrap().night_mode);
        assert_eq!(rig.brightness_writes(), vec![4, 15]);
    }

    #[test]
    fn test_applied_brightness_persisted() {
        let mut rig = Rig::with_settings(night_settings());
        rig.controller.on_sunset().unwrap();
        assert_eq!(rig.store.saved().unwrap().applied_brightness, Some(b(4)));
    }

    #[test]
    fn test_applied_brightness_saved_only_when_changed() {
        let mut rig = Rig::with_settings(night_settings());
        rig.controller.on_sunset().unwrap();
        let saves = rig.store.save_count();

        rig.controller.on_sunset().unwrap();
        assert_eq!(rig.brightness_writes(), vec![4, 4]);
        assert_eq!(rig.store.save_count(), saves);

        rig.controller.on_sunrise().unwrap();
        assert_eq!(rig.store.save_count(), saves + 1);
        assert_eq!(rig.store.saved().unwrap().applied_brightness, Some(b(15)));
    }

    #[test]
    fn test_not_installed_means_no_writes() {
        let mut rig = Rig::new();
        rig.os.set_state(true, false);

        let results = [
            rig.controller.set_brightness(b(3)),
            rig.controller.enable_night_mode(true),
            rig.controller.display_message("helo"),
            rig.controller.set_indicators([true; CELL_COUNT]),
            rig.controller.set_indicator(0, true),
            rig.controller.clear(),
        ];
        for result in results {
            assert!(matches!(result, Err(ControllerError::NotInstalled)));
        }
        assert!(rig.ops().is_empty());
        assert_eq!(rig.connector.connect_count(), 0);
    }

    #[test]
    fn test_not_connected() {
        let mut rig = Rig::new();
        rig.connector.set_connect_error(true);
        let err = rig.controller.display_message("helo").unwrap_err();
        assert!(matches!(err, ControllerError::NotConnected(_)));
        assert!(
            err.to_string()
                .starts_with("Four-letter display does not seem connected")
        );
    }

    #[test]
    fn test_brightness_persisted_even_without_hardware() {
        let mut rig = Rig::new();
        rig.os.set_state(false, false);
        assert!(rig.controller.set_brightness(b(9)).is_err());
        assert_eq!(rig.store.saved().unwrap().brightness, b(9));
    }

    #[test]
    fn test_display_message() {
        let mut rig = Rig::new();
        rig.controller.display_message("helo").unwrap();
        assert_eq!(rig.ops(), vec![DisplayOp::Print("helo".to_string())]);
    }

    #[test]
    fn test_display_empty_message_rejected() {
        let mut rig = Rig::new();
        let err = rig.controller.display_message("").unwrap_err();
        assert!(matches!(err, ControllerError::InvalidParameter { name: "message", .. }));
        assert!(rig.ops().is_empty());
    }

    #[test]
    fn test_set_indicators() {
        let mut rig = Rig::new();
        rig.controller
            .set_indicators([true, false, true, false])
            .unwrap();
        assert_eq!(
            rig.ops(),
            vec![
                DisplayOp::Decimal(0, true),
                DisplayOp::Decimal(1, false),
                DisplayOp::Decimal(2, true),
                DisplayOp::Decimal(3, false),
                DisplayOp::Show,
            ]
        );
        assert_eq!(rig.controller.state().indicators, [true, false, true, false]);
    }

    #[test]
    fn test_set_single_indicator_writes_full_vector() {
        let mut rig = Rig::new();
        rig.controller.set_indicator(2, true).unwrap();
        rig.reset();
        rig.controller.set_indicator(0, true).unwrap();
        assert_eq!(
            rig.ops(),
            vec![
                DisplayOp::Decimal(0, true),
                DisplayOp::Decimal(1, false),
                DisplayOp::Decimal(2, true),
                DisplayOp::Decimal(3, false),
                DisplayOp::Show,
            ]
        );
        assert!(rig.controller.set_indicator(4, true).is_err());
    }

    #[test]
    fn test_clear() {
        let mut rig = Rig::new();
        rig.controller.set_indicators([true; CELL_COUNT]).unwrap();
        rig.reset();

        rig.controller.clear().unwrap();
        assert_eq!(rig.ops(), vec![DisplayOp::Clear, DisplayOp::Show]);
        assert_eq!(rig.controller.state().indicators, [false; CELL_COUNT]);
    }

    #[test]
    fn test_render_time() {
        let mut rig = Rig::new();
        rig.controller
            .render_time(ClockTime::new(7, 5).unwrap())
            .unwrap();
        assert_eq!(rig.ops(), vec![DisplayOp::Print("07.05".to_string())]);
    }

    #[test]
    fn test_render_time_leaves_indicators_alone() {
        let mut rig = Rig::new();
        rig.controller.set_indicators([false; CELL_COUNT]).unwrap();
        rig.reset();

        rig.controller
            .handle_event(&HostEvent::TimeNow(ClockTime::new(21, 30).unwrap()))
            .unwrap();
        assert_eq!(rig.controller.state().indicators, [false; CELL_COUNT]);
        assert!(
            rig.ops()
                .iter()
                .all(|op| !matches!(op, DisplayOp::Decimal(..)))
        );
    }

    #[test]
    fn test_alarm_indicator() {
        let mut rig = Rig::new();
        rig.controller.handle_event(&HostEvent::AlarmCount(2)).unwrap();
        assert!(rig.controller.state().indicators[ALARM_CELL]);
        rig.controller.handle_event(&HostEvent::AlarmCount(0)).unwrap();
        assert!(!rig.controller.state().indicators[ALARM_CELL]);
    }

    #[test]
    fn test_start_restores_brightness_and_time() {
        let mut rig = Rig::with_settings(Settings {
            brightness: b(11),
            ..Settings::default()
        });
        rig.controller
            .start(ClockTime::new(12, 34).unwrap(), HardwarePolicy::Propagate)
            .unwrap();
        let ops = rig.ops();
        assert_eq!(ops[0], DisplayOp::Brightness(11));
        assert_eq!(ops[1], DisplayOp::Print("12.34".to_string()));
    }

    #[test]
    fn test_start_without_hardware() {
        let mut rig = Rig::new();
        rig.os.set_state(false, false);
        let now = ClockTime::new(0, 0).unwrap();

        assert!(rig.controller.start(now, HardwarePolicy::IgnoreAbsent).is_ok());
        assert!(matches!(
            rig.controller.start(now, HardwarePolicy::Propagate),
            Err(ControllerError::NotInstalled)
        ));
    }

    #[test]
    fn test_start_propagates_storage_errors() {
        let mut rig = Rig::new();
        rig.store.set_save_error(true);
        let now = ClockTime::new(0, 0).unwrap();
        assert!(matches!(
            rig.controller.start(now, HardwarePolicy::IgnoreAbsent),
            Err(ControllerError::Settings(_))
        ));
    }

    #[test]
    fn test_stop_suppresses_hardware_errors() {
        let mut rig = Rig::new();
        rig.connector.set_connect_error(true);
        assert!(rig.controller.stop(HardwarePolicy::IgnoreAbsent).is_ok());

        rig.connector.set_connect_error(false);
        rig.controller.stop(HardwarePolicy::IgnoreAbsent).unwrap();
        assert_eq!(rig.ops(), vec![DisplayOp::Clear, DisplayOp::Show]);
    }

    #[test]
    fn test_uninstall_leaves_os_alone() {
        let mut rig = Rig::new();
        rig.controller.uninstall();
        assert_eq!(rig.os.enable_calls(), 0);
        assert!(rig.controller.is_installed());
    }
}

use std::path::Path;

use fourletter_core::{Brightness, CELL_COUNT, FourLetterController, HardwareConfig};
use iced::keyboard::{self, Event as KeyboardEvent, Key};
use iced::widget::{button, column, container, row, slider, text, text_input, toggler};
use iced::{Element, Subscription, Task, Theme};

/// Environment variable pointing at a JSON hardware config.
const CONFIG_ENV: &str = "FOURLETTER_CONFIG";

pub fn main() -> iced::Result {
    env_logger::init();

    iced::application(Panel::default, Panel::update, Panel::view)
        .title("Four-letter Display")
        .subscription(Panel::subscription)
        .theme(Panel::theme)
        .run()
}

struct Panel {
    controller: Option<FourLetterController>,
    status: Option<String>,
    installed: bool,

    message: String,
    indicators: [bool; CELL_COUNT],
    brightness: u8,
    night_brightness: u8,
    night_mode: bool,
}

#[derive(Debug, Clone)]
enum Message {
    // Content
    MessageChanged(String),
    SendMessage,
    ToggleIndicator(usize, bool),
    Clear,

    // Brightness
    BrightnessChanged(u8),
    NightBrightnessChanged(u8),
    IncreaseBrightness,
    DecreaseBrightness,
    ToggleNightMode(bool),

    // Setup
    Install,

    // Keyboard event
    KeyboardEvent(KeyboardEvent),
}

fn load_config() -> Result<HardwareConfig, String> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => HardwareConfig::load(Path::new(&path)).map_err(|e| e.to_string()),
        None => Ok(HardwareConfig::default()),
    }
}

impl Default for Panel {
    fn default() -> Self {
        let mut panel = Self {
            controller: None,
            status: None,
            installed: false,
            message: String::new(),
            indicators: [false; CELL_COUNT],
            brightness: Brightness::MAX.value(),
            night_brightness: Brightness::NIGHT_DEFAULT.value(),
            night_mode: false,
        };

        let opened = load_config().and_then(|config| {
            FourLetterController::open(&config).map_err(|e| e.to_string())
        });
        match opened {
            Ok(controller) => {
                panel.controller = Some(controller);
                panel.refresh();
            }
            Err(e) => {
                panel.status = Some(format!("Failed to initialize: {}", e));
            }
        }

        panel
    }
}

impl Panel {
    fn refresh(&mut self) {
        if let Some(ref controller) = self.controller {
            let state = controller.state();
            self.installed = controller.is_installed();
            self.indicators = state.indicators;
            self.brightness = state.brightness.value();
            self.night_brightness = state.night_brightness.value();
            self.night_mode = state.night_mode;
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        // Clear previous status on new actions
        if !matches!(
            message,
            Message::MessageChanged(_) | Message::KeyboardEvent(_)
        ) {
            self.status = None;
        }

        let Some(controller) = self.controller.as_mut() else {
            return Task::none();
        };

        let result = match message {
            Message::MessageChanged(value) => {
                self.message = value;
                Ok(())
            }

            Message::SendMessage => controller.display_message(&self.message),

            Message::ToggleIndicator(cell, on) => controller.set_indicator(cell, on),

            Message::Clear => controller.clear(),

            Message::BrightnessChanged(value) => {
                Brightness::new(value).and_then(|b| controller.set_brightness(b))
            }

            Message::NightBrightnessChanged(value) => {
                Brightness::new(value).and_then(|b| controller.set_night_brightness(b))
            }

            Message::IncreaseBrightness => {
                let value = (self.brightness + 1).min(Brightness::MAX.value());
                return self.update(Message::BrightnessChanged(value));
            }

            Message::DecreaseBrightness => {
                let value = self.brightness.saturating_sub(1);
                return self.update(Message::BrightnessChanged(value));
            }

            Message::ToggleNightMode(enabled) => controller.enable_night_mode(enabled),

            Message::Install => {
                self.status = Some(match controller.install() {
                    Ok(()) => "I2C enabled, reboot to apply".to_string(),
                    Err(e) => format!("Install error: {}", e),
                });
                Ok(())
            }

            Message::KeyboardEvent(event) => {
                if let KeyboardEvent::KeyPressed { key, modifiers, .. } = event {
                    if modifiers.control() && modifiers.shift() {
                        match key.as_ref() {
                            Key::Character(c) if c == "." || c == ">" => {
                                return self.update(Message::IncreaseBrightness);
                            }
                            Key::Character(c) if c == "," || c == "<" => {
                                return self.update(Message::DecreaseBrightness);
                            }
                            _ => {}
                        }
                    }
                }
                Ok(())
            }
        };

        if let Err(e) = result {
            self.status = Some(e.to_string());
        }
        self.refresh();
        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        let title = text("Four-letter Display").size(24);

        let status = if let Some(ref msg) = self.status {
            text(msg).size(14)
        } else {
            text("").size(14)
        };

        // Install hint, only while the bus is not set up
        let install_section = if self.installed {
            column![]
        } else {
            column![
                text("I2C bus or i2c-dev module not enabled").size(14),
                button("Install").on_press(Message::Install),
            ]
            .spacing(5)
        };

        let message_section = row![
            text_input("Message", &self.message)
                .on_input(Message::MessageChanged)
                .on_submit(Message::SendMessage),
            button("Display").on_press(Message::SendMessage),
            button("Clear").on_press(Message::Clear),
        ]
        .spacing(10);

        let indicators = self
            .indicators
            .iter()
            .enumerate()
            .fold(row![].spacing(10), |r, (cell, on)| {
                r.push(
                    toggler(*on)
                        .label(format!("Dot {}", cell + 1))
                        .on_toggle(move |on| Message::ToggleIndicator(cell, on)),
                )
            });

        let brightness_section = column![
            text(format!("Brightness: {}/15", self.brightness)).size(16),
            slider(0..=15, self.brightness, Message::BrightnessChanged).step(1u8),
        ]
        .spacing(5);

        let night_section = column![
            toggler(self.night_mode)
                .label("Night mode")
                .on_toggle(Message::ToggleNightMode),
            text(format!("Night brightness: {}/15", self.night_brightness)).size(14),
            slider(
                0..=15,
                self.night_brightness,
                Message::NightBrightnessChanged
            )
            .step(1u8),
        ]
        .spacing(5);

        let shortcuts_hint = text("Shortcuts: Ctrl+Shift+< / > (brightness)").size(12);

        let content = column![
            title,
            status,
            install_section,
            message_section,
            indicators,
            brightness_section,
            night_section,
            shortcuts_hint,
        ]
        .spacing(15)
        .padding(20);

        container(content).into()
    }

    fn subscription(&self) -> Subscription<Message> {
        keyboard::listen().map(Message::KeyboardEvent)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

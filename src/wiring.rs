// This module handles board-specific pin mappings and initialization.
// Profiles are selected via Cargo features; the classic ESP32 and the
// `devkit-esp32s3` board have their own maps, every other chip shares one.
//! The following wiring is assumed (generic profile):
//! - PREVIOUS => GPIO4
//! - NEXT     => GPIO5
//! - MENU     => GPIO6
//! - STOP     => GPIO7
//! - GONG     => GPIO3 (doorbell push button / bell transformer opto)
//! - LED      => GPIO2 (active high, via resistor to GND)
//! All inputs use the internal pull-up and are pulled to GND when pressed.

use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::peripherals::Peripherals;

pub struct BoardPins<'a> {
    pub prev: Input<'a>,
    pub next: Input<'a>,
    pub menu: Input<'a>,
    pub stop: Input<'a>,
    pub gong: Input<'a>,
    pub led: Output<'a>,
}

fn button<'a>(pin: impl esp_hal::gpio::InputPin + 'a) -> Input<'a> {
    Input::new(pin, InputConfig::default().with_pull(Pull::Up))
}

fn led<'a>(pin: impl esp_hal::gpio::OutputPin + 'a) -> Output<'a> {
    Output::new(pin, Level::Low, OutputConfig::default())
}

pub fn init_board_pins(p: Peripherals) -> BoardPins<'static> {
    cfg_if::cfg_if! {
        if #[cfg(feature = "esp32")] {
            // GPIO6..11 are the flash bus on the classic ESP32
            BoardPins {
                prev: button(p.GPIO25),
                next: button(p.GPIO26),
                menu: button(p.GPIO27),
                stop: button(p.GPIO32),
                gong: button(p.GPIO33),
                led: led(p.GPIO2),
            }
        } else if #[cfg(feature = "devkit-esp32s3")] {
            BoardPins {
                prev: button(p.GPIO4),
                next: button(p.GPIO5),
                menu: button(p.GPIO6),
                stop: button(p.GPIO7),
                gong: button(p.GPIO0),
                led: led(p.GPIO21),
            }
        } else {
            BoardPins {
                prev: button(p.GPIO4),
                next: button(p.GPIO5),
                menu: button(p.GPIO6),
                stop: button(p.GPIO7),
                gong: button(p.GPIO3),
                led: led(p.GPIO2),
            }
        }
    }
}

//! Doorbell front panel
//! ========================================
//! Polls the five doorbell inputs and drives the status LED.
//! Build with a chip feature, e.g. `--features esp32s3`.
//! ========================================
//!
//! The audio player and the settings store are separate collaborators; this
//! loop only logs the actions they would be asked to perform.

#![no_std]
#![no_main]

// Define the application description, which is placed in a special section of the binary.
// This is used by the bootloader to verify the application.
esp_bootloader_esp_idf::esp_app_desc!();

use esp_backtrace as _;

use embedded_hal::digital::{InputPin, PinState};
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::main;
use esp_hal::time::Instant;
use log::{info, LevelFilter};

use doorbell_io::{
    blink::Blinker,
    clock::{Clock, Timeout},
    indicator::Indicator,
    input::{Button, Gesture, ResetScope},
    patterns,
    wiring::{init_board_pins, BoardPins},
};

/// Leave edit mode after this long without a button (milliseconds)
const EDIT_TIMEOUT_MS: u32 = 20_000;
/// Assume the ringtone ended after this long (milliseconds)
const RING_TIMEOUT_MS: u32 = 10_000;
/// Loop pacing; well below the 20 ms debounce window
const POLL_INTERVAL_US: u32 = 500;

#[derive(Clone, Copy)]
struct HalClock;

impl Clock for HalClock {
    fn now_ms(&self) -> u32 {
        Instant::now().duration_since_epoch().as_millis() as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    Idle,
    Edit,
    Ringing,
}

fn log_gestures<P: InputPin>(btn: &mut Button<P, HalClock>) {
    let name = btn.name();
    if btn.on_double() {
        info!("{}: double click", name);
    }
    if btn.on_very_long_click() {
        info!("{}: very long click", name);
    }
}

#[main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    log::set_max_level(LevelFilter::Info);

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);
    let delay = Delay::new();

    let BoardPins {
        prev,
        next,
        menu,
        stop,
        gong,
        led,
    } = init_board_pins(peripherals);

    let mut btn_prev = Button::active_low(prev, HalClock).with_name("PREVIOUS");
    let mut btn_next = Button::active_low(next, HalClock).with_name("NEXT");
    let mut btn_menu = Button::active_low(menu, HalClock).with_name("MENU");
    let mut btn_stop = Button::active_low(stop, HalClock).with_name("STOP");
    let mut btn_gong = Button::active_low(gong, HalClock).with_name("GONG");

    let mut indicator: Indicator<'static, _, _, Status> =
        Indicator::new(Blinker::new(led, HalClock, PinState::Low));

    let mut edit_timer = Timeout::new(EDIT_TIMEOUT_MS);
    let mut ring_timer = Timeout::new(RING_TIMEOUT_MS);
    let mut status = Status::Idle;
    let mut booting = true;

    info!("=== Doorbell panel ===");
    indicator.blinker().play(&patterns::STARTUP);

    loop {
        let now = HalClock.now_ms();

        if btn_gong.on_press() {
            if status == Status::Ringing {
                info!("gong: already ringing, skipped");
            } else {
                info!("gong: play ringtone");
                status = Status::Ringing;
                ring_timer.start(now);
            }
        }

        if btn_prev.is_held() || btn_next.is_held() || btn_menu.is_held() {
            edit_timer.start(now);
            if status == Status::Idle {
                info!("edit: start");
                status = Status::Edit;
            }
        } else if status == Status::Edit
            && (edit_timer.expired(now) || btn_stop.peek(Gesture::Click))
        {
            info!("edit: cancelled");
            edit_timer.stop();
            status = Status::Idle;
        }

        if btn_menu.is_held() {
            if btn_prev.on_click() {
                btn_menu.reset(ResetScope::All);
                info!("volume down");
            } else if btn_next.on_click() {
                btn_menu.reset(ResetScope::All);
                info!("volume up");
            } else if btn_menu.on_long() {
                info!("test ringtone");
            }
        }

        if btn_prev.on_click() {
            info!("previous file");
        } else if btn_next.on_click() {
            info!("next file");
        } else if btn_menu.on_click() {
            info!("next play mode");
        } else if btn_prev.on_long() {
            info!("previous folder");
        } else if btn_next.on_long() {
            info!("next folder");
        } else if btn_stop.on_click() {
            info!("stop");
            status = Status::Idle;
            ring_timer.stop();
        } else if btn_stop.on_long() {
            info!("save settings");
            indicator.stop(PinState::Low);
            status = Status::Idle;
        }

        if ring_timer.expired(now) {
            status = Status::Idle;
        }

        for btn in [
            &mut btn_prev,
            &mut btn_next,
            &mut btn_menu,
            &mut btn_stop,
            &mut btn_gong,
        ] {
            btn.update();
            log_gestures(btn);
        }

        indicator.update();

        if booting {
            booting = indicator.blinker().is_playing();
        } else {
            match status {
                Status::Idle => indicator.show(Status::Idle, &patterns::IDLE),
                Status::Edit => indicator.show(Status::Edit, &patterns::EDIT),
                Status::Ringing => indicator.show(Status::Ringing, &patterns::RINGING),
            }
        }

        delay.delay_micros(POLL_INTERVAL_US);
    }
}

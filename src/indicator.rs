//! Status LED that only restarts its pattern when the status changes.
//!
//! The main loop calls `show()` with the current status every iteration;
//! restarting the pattern each time would freeze it on its first element, so
//! the last shown status is remembered here.

use embedded_hal::digital::{OutputPin, PinState};

use log::debug;

use crate::blink::{Blinker, Pattern};
use crate::clock::Clock;

pub struct Indicator<'a, P, C, S> {
    blinker: Blinker<'a, P, C>,
    current: Option<S>,
}

impl<'a, P, C, S> Indicator<'a, P, C, S>
where
    P: OutputPin,
    C: Clock,
    S: Copy + PartialEq,
{
    pub fn new(blinker: Blinker<'a, P, C>) -> Self {
        Self {
            blinker,
            current: None,
        }
    }

    /// Play `pattern` for `status` unless that status is already showing.
    /// A rejected pattern is not remembered, so the next call retries.
    pub fn show(&mut self, status: S, pattern: &'a [u16]) {
        if self.current == Some(status) {
            return;
        }
        match Pattern::parse(pattern) {
            Ok(p) => {
                self.blinker.play_pattern(p);
                if self.blinker.is_playing() {
                    self.current = Some(status);
                }
            }
            Err(e) => debug!("indicator: status pattern rejected: {}", e),
        }
    }

    pub fn current(&self) -> Option<S> {
        self.current
    }

    /// Stop and forget the status so the next `show()` always plays.
    pub fn stop(&mut self, level: PinState) {
        self.current = None;
        self.blinker.stop(level);
    }

    pub fn update(&mut self) {
        self.blinker.update();
    }

    pub fn blinker(&mut self) -> &mut Blinker<'a, P, C> {
        &mut self.blinker
    }
}

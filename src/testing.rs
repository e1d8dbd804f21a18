//! Host-side doubles for unit tests: a hand-advanced clock and pins backed
//! by `Cell`s so a test can keep driving a line after handing the pin over.

use core::cell::Cell;
use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::clock::Clock;

pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }

    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

/// Input line whose level is whatever the shared cell says (`true` = HIGH).
pub struct LinePin<'a>(pub &'a Cell<bool>);

impl ErrorType for LinePin<'_> {
    type Error = Infallible;
}

impl InputPin for LinePin<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.get())
    }
}

/// Output line that mirrors its level into a shared cell and counts writes
/// that actually changed it.
pub struct LedPin<'a> {
    pub level: &'a Cell<bool>,
    pub toggles: &'a Cell<u32>,
}

impl ErrorType for LedPin<'_> {
    type Error = Infallible;
}

impl LedPin<'_> {
    fn write(&mut self, high: bool) {
        if self.level.get() != high {
            self.toggles.set(self.toggles.get() + 1);
        }
        self.level.set(high);
    }
}

impl OutputPin for LedPin<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

/// Input that always fails to read, for checking the "keep last level" path.
pub struct BrokenPin;

#[derive(Debug)]
pub struct ReadFault;

impl embedded_hal::digital::Error for ReadFault {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl ErrorType for BrokenPin {
    type Error = ReadFault;
}

impl InputPin for BrokenPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Err(ReadFault)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Err(ReadFault)
    }
}

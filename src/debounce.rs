//! Level debouncer for one digital input.
//!
//! Any raw transition, even a single glitch, restarts the settle window. The
//! debounced state only follows the raw line after it has stayed put for longer
//! than `settle_ms`. Must be polled more often than `settle_ms`.

use embedded_hal::digital::{InputPin, PinState};

use crate::clock::{elapsed16, Clock};

/// Default settle window (milliseconds)
pub const DEBOUNCE_MS: u16 = 20;

pub struct Debouncer<P, C> {
    pin: P,
    clock: C,
    name: &'static str,
    /// Raw level that counts as "pressed"
    active: PinState,
    pub settle_ms: u16,
    /// Raw level seen on the previous sample (true = HIGH)
    last_raw_high: bool,
    held: bool,
    settled: bool,
    /// Timestamp when the current raw level first appeared
    since_ms: u16,
}

impl<P, C> Debouncer<P, C>
where
    P: InputPin,
    C: Clock,
{
    pub fn new(pin: P, clock: C, active: PinState, settle_ms: u16) -> Self {
        let mut this = Self {
            pin,
            clock,
            name: "button",
            active,
            settle_ms,
            last_raw_high: false,
            held: false,
            settled: false,
            since_ms: 0,
        };
        this.start();
        this
    }

    /// Label used in log records.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Take the current raw level as baseline and restart settling.
    pub fn start(&mut self) {
        self.since_ms = self.now();
        self.last_raw_high = self.read_raw();
        self.settled = false;
    }

    /// Debounced press state.
    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn is_debouncing(&self) -> bool {
        !self.settled
    }

    /// Sample the line once. Returns true while filtering is in progress.
    pub fn update(&mut self) -> bool {
        let raw_high = self.read_raw();
        let now = self.now();

        if raw_high != self.last_raw_high {
            self.last_raw_high = raw_high;
            self.since_ms = now;
            self.settled = false;
            return true;
        }

        if self.settled {
            return false;
        }

        if elapsed16(now, self.since_ms) > self.settle_ms {
            self.settled = true;
            self.held = raw_high == (self.active == PinState::High);
        }
        true
    }

    #[inline]
    pub(crate) fn now(&self) -> u16 {
        // Truncation is intended: button timers run on a 16-bit clock.
        self.clock.now_ms() as u16
    }

    /// A failed read counts as "no change".
    fn read_raw(&mut self) -> bool {
        self.pin.is_high().unwrap_or(self.last_raw_high)
    }
}

//! Millisecond time source and wraparound-safe elapsed arithmetic.
//!
//! Every timer in this crate stores a raw timestamp and compares
//! `now.wrapping_sub(start)` against a threshold. Unsigned wrapping
//! subtraction gives the right answer across a counter overflow as long as
//! both sides use the same width, so the button code stays on `u16`
//! (wraps every ~65 s) and the blink code on `u32`.

/// Monotonic millisecond counter. Allowed to wrap.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Milliseconds between `since` and `now` on a 16-bit clock.
#[inline]
pub fn elapsed16(now: u16, since: u16) -> u16 {
    now.wrapping_sub(since)
}

/// Milliseconds between `since` and `now` on a 32-bit clock.
#[inline]
pub fn elapsed(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Polled one-shot timeout.
///
/// `expired` reports `true` exactly once after the period has passed and then
/// disarms itself, the same way the LED/sleep timers in a polling loop are
/// checked and cleared.
#[derive(Clone, Copy, Debug)]
pub struct Timeout {
    period_ms: u32,
    started_ms: u32,
    active: bool,
}

impl Timeout {
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            started_ms: 0,
            active: false,
        }
    }

    /// Arm (or re-arm) the timeout from `now_ms`.
    pub fn start(&mut self, now_ms: u32) {
        self.active = true;
        self.started_ms = now_ms;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Returns true once when more than `period_ms` has elapsed.
    pub fn expired(&mut self, now_ms: u32) -> bool {
        if !self.active {
            return false;
        }
        if elapsed(now_ms, self.started_ms) > self.period_ms {
            self.active = false;
            true
        } else {
            false
        }
    }
}

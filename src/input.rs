//! Button gesture detection on top of [`Debouncer`].
//!
//! This module provides:
//! - `ButtonConfig` with the gesture thresholds
//! - `Button`, which turns the debounced level into pending gesture flags
//!   (press, release, click, long, very-long, long-click, very-long-click,
//!   double-click)
//! - `Gesture` and `ResetScope` for the query and reset API
//!
//! `update()` must run every loop iteration. Queries only read (and by
//! default clear) the flags it left behind, so the caller can consume events
//! whenever it likes.

use embedded_hal::digital::{InputPin, PinState};
use log::trace;

use crate::clock::{elapsed16, Clock};
use crate::debounce::{Debouncer, DEBOUNCE_MS};

/// Default long-press threshold (milliseconds)
pub const LONG_MS: u16 = 1000;
/// Default very-long-press threshold (milliseconds)
pub const VERY_LONG_MS: u16 = 3000;
/// Default max press length inside a double-click (milliseconds)
pub const DOUBLE_PRESS_MS: u16 = 200;
/// Default max gap between the two clicks (milliseconds)
pub const DOUBLE_RELEASE_MS: u16 = 200;
/// Minimum press/release length inside a double-click (milliseconds)
pub const DOUBLE_GUARD_MS: u16 = 60;

/// Gesture timing thresholds. Zero values are allowed and simply make the
/// corresponding event fire immediately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonConfig {
    pub debounce_ms: u16,
    pub long_ms: u16,
    pub very_long_ms: u16,
    pub double_press_ms: u16,
    pub double_release_ms: u16,
    pub double_guard_ms: u16,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_MS,
            long_ms: LONG_MS,
            very_long_ms: VERY_LONG_MS,
            double_press_ms: DOUBLE_PRESS_MS,
            double_release_ms: DOUBLE_RELEASE_MS,
            double_guard_ms: DOUBLE_GUARD_MS,
        }
    }
}

impl ButtonConfig {
    pub fn with_debounce(mut self, ms: u16) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn with_long(mut self, ms: u16) -> Self {
        self.long_ms = ms;
        self
    }

    pub fn with_very_long(mut self, ms: u16) -> Self {
        self.very_long_ms = ms;
        self
    }

    pub fn with_double_press(mut self, ms: u16) -> Self {
        self.double_press_ms = ms;
        self
    }

    pub fn with_double_release(mut self, ms: u16) -> Self {
        self.double_release_ms = ms;
        self
    }

    pub fn with_double_guard(mut self, ms: u16) -> Self {
        self.double_guard_ms = ms;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    Press,
    Release,
    Click,
    Long,
    VeryLong,
    LongClick,
    VeryLongClick,
    Double,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetScope {
    /// Drop timers, flags and double-click progress, then resync.
    All,
    Press,
    Release,
    /// `Long` and `LongClick`
    Long,
    /// `VeryLong` and `VeryLongClick`
    VeryLong,
}

/// Progress through press → release → press → release.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum DoublePhase {
    #[default]
    Idle,
    FirstPress,
    Gap,
    SecondPress,
}

#[derive(Clone, Copy, Debug, Default)]
struct Pending {
    press: bool,
    release: bool,
    click: bool,
    long: bool,
    very_long: bool,
    long_click: bool,
    very_long_click: bool,
    double: bool,
}

impl Pending {
    fn slot(&mut self, gesture: Gesture) -> &mut bool {
        match gesture {
            Gesture::Press => &mut self.press,
            Gesture::Release => &mut self.release,
            Gesture::Click => &mut self.click,
            Gesture::Long => &mut self.long,
            Gesture::VeryLong => &mut self.very_long,
            Gesture::LongClick => &mut self.long_click,
            Gesture::VeryLongClick => &mut self.very_long_click,
            Gesture::Double => &mut self.double,
        }
    }
}

pub struct Button<P, C> {
    debounce: Debouncer<P, C>,
    config: ButtonConfig,
    /// Held state seen by the previous `update()`
    was_held: bool,
    /// Long timer start; `None` when disarmed
    long_since: Option<u16>,
    double_since: u16,
    double_phase: DoublePhase,
    pending: Pending,
    long_reported: bool,
    very_long_reported: bool,
}

impl<P, C> Button<P, C>
where
    P: InputPin,
    C: Clock,
{
    /// Button that reads `active` on the pin while pressed.
    pub fn new(pin: P, clock: C, active: PinState, config: ButtonConfig) -> Self {
        Self {
            debounce: Debouncer::new(pin, clock, active, config.debounce_ms),
            config,
            was_held: false,
            long_since: None,
            double_since: 0,
            double_phase: DoublePhase::Idle,
            pending: Pending::default(),
            long_reported: false,
            very_long_reported: false,
        }
    }

    /// Pull-up wiring: the switch shorts the line to ground.
    pub fn active_low(pin: P, clock: C) -> Self {
        Self::new(pin, clock, PinState::Low, ButtonConfig::default())
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.debounce = self.debounce.with_name(name);
        self
    }

    pub fn name(&self) -> &'static str {
        self.debounce.name()
    }

    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }

    /// Swap thresholds. Takes effect on the next `update()`.
    pub fn set_config(&mut self, config: ButtonConfig) {
        self.debounce.settle_ms = config.debounce_ms;
        self.config = config;
    }

    /// Reinitialize. Pass `held_at_boot = true` when the button is already
    /// down so that no press is reported for it.
    pub fn start(&mut self, held_at_boot: bool) {
        self.reset(ResetScope::All);
        self.was_held = held_at_boot;
    }

    pub fn is_held(&self) -> bool {
        self.debounce.is_held()
    }

    pub fn is_debouncing(&self) -> bool {
        self.debounce.is_debouncing()
    }

    /// True while a double-click is partially entered.
    pub fn is_double_pending(&self) -> bool {
        self.double_phase != DoublePhase::Idle
    }

    pub fn update(&mut self) {
        self.debounce.update();
        let held = self.debounce.is_held();
        let now = self.now();
        let pressed_now = held && !self.was_held;

        match (self.was_held, held) {
            (true, true) => {
                if let Some(since) = self.long_since {
                    let d = elapsed16(now, since);
                    if d > self.config.long_ms {
                        self.pending.long = true;
                    }
                    if d > self.config.very_long_ms {
                        self.pending.very_long = true;
                    }
                }
            }
            (true, false) => {
                self.pending.release = true;
                self.long_reported = false;
                self.very_long_reported = false;
                if let Some(since) = self.long_since.take() {
                    let d = elapsed16(now, since);
                    if d < self.config.long_ms {
                        self.pending.click = true;
                        trace!("{}: click ({} ms)", self.name(), d);
                    } else if d < self.config.very_long_ms {
                        self.pending.long_click = true;
                        trace!("{}: long click ({} ms)", self.name(), d);
                    } else {
                        self.pending.very_long_click = true;
                        trace!("{}: very long click ({} ms)", self.name(), d);
                    }
                }
                self.was_held = false;
            }
            (false, true) => {
                self.pending.press = true;
                self.long_since = Some(now);
                self.was_held = true;
                trace!("{}: press", self.name());
            }
            (false, false) => {}
        }

        self.update_double(now, held, pressed_now);
    }

    fn update_double(&mut self, now: u16, held: bool, pressed_now: bool) {
        let dt = elapsed16(now, self.double_since);
        let cfg = &self.config;

        match self.double_phase {
            DoublePhase::Idle => {
                if pressed_now {
                    self.double_since = now;
                    self.double_phase = DoublePhase::FirstPress;
                }
            }
            DoublePhase::FirstPress => {
                if dt > cfg.double_press_ms {
                    self.double_phase = DoublePhase::Idle;
                } else if !held && dt > cfg.double_guard_ms {
                    self.double_since = now;
                    self.double_phase = DoublePhase::Gap;
                }
            }
            DoublePhase::Gap => {
                if dt > cfg.double_release_ms {
                    self.double_phase = DoublePhase::Idle;
                } else if held && dt > cfg.double_guard_ms {
                    self.double_since = now;
                    self.double_phase = DoublePhase::SecondPress;
                }
            }
            DoublePhase::SecondPress => {
                if dt > cfg.double_press_ms {
                    self.double_phase = DoublePhase::Idle;
                } else if !held && dt > cfg.double_guard_ms {
                    self.double_since = 0;
                    self.double_phase = DoublePhase::Idle;
                    self.pending.double = true;
                    trace!("{}: double click", self.name());
                }
            }
        }
    }

    /// Read a pending gesture, clearing it when `clear` is set.
    ///
    /// `Long` and `VeryLong` are additionally read-once per hold: after the
    /// first `true` they read `false` until the button has been released,
    /// whatever `clear` says.
    pub fn check(&mut self, gesture: Gesture, clear: bool) -> bool {
        let slot = self.pending.slot(gesture);
        let mut value = *slot;
        if clear {
            *slot = false;
        }

        let latch = match gesture {
            Gesture::Long => Some(&mut self.long_reported),
            Gesture::VeryLong => Some(&mut self.very_long_reported),
            _ => None,
        };
        if let (true, Some(reported)) = (value, latch) {
            if *reported {
                value = false;
            } else {
                *reported = true;
            }
        }
        value
    }

    /// Same as [`check`](Self::check) without clearing.
    pub fn peek(&mut self, gesture: Gesture) -> bool {
        self.check(gesture, false)
    }

    pub fn on_press(&mut self) -> bool {
        self.check(Gesture::Press, true)
    }

    pub fn on_release(&mut self) -> bool {
        self.check(Gesture::Release, true)
    }

    pub fn on_click(&mut self) -> bool {
        self.check(Gesture::Click, true)
    }

    pub fn on_long(&mut self) -> bool {
        self.check(Gesture::Long, true)
    }

    pub fn on_very_long(&mut self) -> bool {
        self.check(Gesture::VeryLong, true)
    }

    pub fn on_long_click(&mut self) -> bool {
        self.check(Gesture::LongClick, true)
    }

    pub fn on_very_long_click(&mut self) -> bool {
        self.check(Gesture::VeryLongClick, true)
    }

    pub fn on_double(&mut self) -> bool {
        self.check(Gesture::Double, true)
    }

    pub fn reset(&mut self, scope: ResetScope) {
        match scope {
            ResetScope::All => {
                self.long_since = None;
                self.double_since = 0;
                self.double_phase = DoublePhase::Idle;
                self.pending = Pending::default();
                self.update();
            }
            ResetScope::Press => self.pending.press = false,
            ResetScope::Release => self.pending.release = false,
            ResetScope::Long => {
                self.pending.long = false;
                self.pending.long_click = false;
            }
            ResetScope::VeryLong => {
                self.pending.very_long = false;
                self.pending.very_long_click = false;
            }
        }
    }

    fn now(&self) -> u16 {
        self.debounce.now()
    }
}

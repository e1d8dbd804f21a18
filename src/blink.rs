//! Pattern-driven blinking of one output line.
//!
//! A pattern is a borrowed, zero-terminated `&[u16]`. The top two bits of the
//! first element pick the playback mode:
//!
//! - `Once`    `[on, off, on, ..., 0]` plays once, header bits `00`.
//! - `Repeat`  `[REPEAT | n, on, off, ..., 0]` plays the cycle `n` times.
//! - `Timed`   `[TIMED | ticks, on, off, ..., 0]` loops until `ticks` have
//!   passed, then forces the line off.
//! - `Forever` `[FOREVER, on, off, ..., 0]` loops until stopped.
//!
//! Durations are in ticks of `tick_time` milliseconds (1 by default). The end of
//! the slice counts as a terminator too. See [`crate::patterns`] for encoders
//! and stock patterns.

use core::fmt;

use embedded_hal::digital::{OutputPin, PinState};
use log::debug;

use crate::clock::{elapsed, Clock};

pub const MODE_MASK: u16 = 0xC000;
pub const PARAM_MASK: u16 = 0x3FFF;

/// Default tick length (milliseconds)
pub const DEFAULT_TICK_MS: u16 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayMode {
    Once,
    Repeat(u16),
    /// Overall duration in ticks
    Timed(u16),
    Forever,
}

impl PlayMode {
    pub fn decode(header: u16) -> Self {
        let param = header & PARAM_MASK;
        match header & MODE_MASK {
            0x0000 => PlayMode::Once,
            0x4000 => PlayMode::Repeat(param),
            0x8000 => PlayMode::Timed(param),
            _ => PlayMode::Forever,
        }
    }

    /// Index of the first on/off command.
    fn first_index(self) -> usize {
        match self {
            PlayMode::Once => 0,
            _ => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternError {
    /// Slice has no elements at all
    Empty,
    /// Repeat header with a count of zero
    ZeroRepeat,
    /// First command is zero or missing
    NoCommands,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Empty => write!(f, "empty pattern"),
            PatternError::ZeroRepeat => write!(f, "repeat count is zero"),
            PatternError::NoCommands => write!(f, "pattern has no on/off commands"),
        }
    }
}

impl core::error::Error for PatternError {}

/// A checked view of a blink pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pattern<'a> {
    commands: &'a [u16],
    mode: PlayMode,
}

impl<'a> Pattern<'a> {
    pub fn parse(commands: &'a [u16]) -> Result<Self, PatternError> {
        let header = *commands.first().ok_or(PatternError::Empty)?;
        let mode = PlayMode::decode(header);
        if mode == PlayMode::Repeat(0) {
            return Err(PatternError::ZeroRepeat);
        }
        match commands.get(mode.first_index()) {
            Some(&c) if c != 0 => Ok(Self { commands, mode }),
            _ => Err(PatternError::NoCommands),
        }
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    /// Command at `index`, with anything past the slice reading as the
    /// terminator.
    fn command(&self, index: usize) -> u16 {
        self.commands.get(index).copied().unwrap_or(0)
    }
}

pub struct Blinker<'a, P, C> {
    pin: P,
    clock: C,
    lit: bool,
    tick_ms: u16,
    pattern: Option<Pattern<'a>>,
    index: usize,
    repeats_left: u16,
    playing: bool,
    /// Start of the current element
    step_since: u32,
    step_ms: u32,
    /// Start and length of a `Timed` run
    run_since: u32,
    run_ms: u32,
}

impl<'a, P, C> Blinker<'a, P, C>
where
    P: OutputPin,
    C: Clock,
{
    pub fn new(pin: P, clock: C, initial: PinState) -> Self {
        let mut this = Self {
            pin,
            clock,
            lit: false,
            tick_ms: DEFAULT_TICK_MS,
            pattern: None,
            index: 0,
            repeats_left: 0,
            playing: false,
            step_since: 0,
            step_ms: 0,
            run_since: 0,
            run_ms: 0,
        };
        this.set(initial == PinState::High);
        this
    }

    pub fn on(&mut self) {
        self.set(true);
    }

    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn is_on(&self) -> bool {
        self.lit
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Mode of the pattern being played, if any.
    pub fn mode(&self) -> Option<PlayMode> {
        self.pattern.filter(|_| self.playing).map(|p| p.mode())
    }

    pub fn tick_time(&self) -> u16 {
        self.tick_ms
    }

    /// Milliseconds per tick. A running pattern picks it up from its next
    /// element; a `Timed` run keeps the deadline computed at `play()`.
    pub fn set_tick_time(&mut self, ms: u16) {
        self.tick_ms = ms;
    }

    /// Start `commands`, replacing whatever is playing. Invalid patterns and a
    /// zero tick time leave the blinker untouched.
    pub fn play(&mut self, commands: &'a [u16]) {
        match Pattern::parse(commands) {
            Ok(pattern) => self.play_pattern(pattern),
            Err(e) => debug!("blink: ignoring pattern: {}", e),
        }
    }

    pub fn play_pattern(&mut self, pattern: Pattern<'a>) {
        if self.tick_ms == 0 {
            debug!("blink: tick time is zero, ignoring pattern");
            return;
        }

        let now = self.clock.now_ms();
        let mode = pattern.mode();
        self.index = mode.first_index();
        self.repeats_left = 0;
        match mode {
            PlayMode::Repeat(n) => self.repeats_left = n,
            PlayMode::Timed(ticks) => {
                self.run_since = now;
                self.run_ms = u32::from(ticks) * u32::from(self.tick_ms);
            }
            PlayMode::Once | PlayMode::Forever => {}
        }
        self.step_ms = self.ticks_to_ms(pattern.command(self.index));
        self.pattern = Some(pattern);

        self.on();
        self.step_since = now;
        self.playing = true;
        debug!("blink: play {:?}", mode);
    }

    /// Cancel playback and force the line to `level`.
    pub fn stop(&mut self, level: PinState) {
        self.playing = false;
        self.set(level == PinState::High);
    }

    /// Advance playback. Toggles the line at most once per call; if several
    /// element deadlines were missed they collapse into one toggle and the
    /// element timer restarts from now.
    pub fn update(&mut self) {
        if !self.playing {
            return;
        }
        let Some(pattern) = self.pattern else {
            self.playing = false;
            return;
        };
        let now = self.clock.now_ms();

        if let PlayMode::Timed(_) = pattern.mode() {
            if elapsed(now, self.run_since) > self.run_ms {
                self.playing = false;
                self.off();
                debug!("blink: timed run finished");
                return;
            }
        }

        if elapsed(now, self.step_since) <= self.step_ms {
            return;
        }

        self.index += 1;
        if pattern.command(self.index) == 0 {
            match pattern.mode() {
                PlayMode::Repeat(_) => {
                    if self.repeats_left <= 1 {
                        self.playing = false;
                        return;
                    }
                    self.repeats_left -= 1;
                    self.index = 1;
                }
                PlayMode::Timed(_) | PlayMode::Forever => self.index = 1,
                PlayMode::Once => {
                    self.toggle();
                    self.playing = false;
                    return;
                }
            }
        }

        self.toggle();
        self.step_since = now;
        self.step_ms = self.ticks_to_ms(pattern.command(self.index));
    }

    fn ticks_to_ms(&self, ticks: u16) -> u32 {
        u32::from(ticks) * u32::from(self.tick_ms)
    }

    fn toggle(&mut self) {
        self.set(!self.lit);
    }

    fn set(&mut self, lit: bool) {
        let _ = if lit {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        self.lit = lit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{repeat, timed, FOREVER};
    use crate::testing::{LedPin, ManualClock};
    use core::cell::Cell;

    struct Led {
        level: Cell<bool>,
        toggles: Cell<u32>,
    }

    impl Led {
        fn new() -> Self {
            Self {
                level: Cell::new(false),
                toggles: Cell::new(0),
            }
        }

        fn pin(&self) -> LedPin<'_> {
            LedPin {
                level: &self.level,
                toggles: &self.toggles,
            }
        }
    }

    type TestBlinker<'a> = Blinker<'a, LedPin<'a>, &'a ManualClock>;

    fn step(b: &mut TestBlinker<'_>, clock: &ManualClock, n: u32) {
        for _ in 0..n {
            clock.advance(1);
            b.update();
        }
    }

    #[test]
    fn repeat_three_cycles_then_stops_off() {
        static SEQ: [u16; 4] = [repeat(3), 10, 10, 0];
        let clock = ManualClock::new(0);
        let led = Led::new();
        let mut b = Blinker::new(led.pin(), &clock, PinState::Low);

        b.play(&SEQ);
        assert!(b.is_playing());
        assert_eq!(b.mode(), Some(PlayMode::Repeat(3)));
        assert!(led.level.get());

        step(&mut b, &clock, 65);
        assert!(b.is_playing());
        step(&mut b, &clock, 1);
        assert!(!b.is_playing());
        assert!(!led.level.get());
        assert_eq!(led.toggles.get(), 6);

        step(&mut b, &clock, 200);
        assert_eq!(led.toggles.get(), 6);
        assert_eq!(b.mode(), None);
    }

    #[test]
    fn timed_run_stops_mid_cycle_at_deadline() {
        static SEQ: [u16; 4] = [timed(25), 10, 10, 0];
        let clock = ManualClock::new(0);
        let led = Led::new();
        let mut b = Blinker::new(led.pin(), &clock, PinState::Low);

        b.play(&SEQ);
        step(&mut b, &clock, 25);
        assert!(b.is_playing());
        assert!(led.level.get(), "third element is an on phase");

        step(&mut b, &clock, 1);
        assert!(!b.is_playing());
        assert!(!led.level.get());
    }

    #[test]
    fn timed_duration_scales_with_tick_time() {
        static SEQ: [u16; 4] = [timed(25), 100, 100, 0];
        let clock = ManualClock::new(0);
        let led = Led::new();
        let mut b = Blinker::new(led.pin(), &clock, PinState::Low);
        b.set_tick_time(2);

        b.play(&SEQ);
        step(&mut b, &clock, 50);
        assert!(b.is_playing());
        step(&mut b, &clock, 1);
        assert!(!b.is_playing());
        assert!(!led.level.get());
    }

    #[test]
    fn tick_time_change_applies_from_next_element() {
        static SEQ: [u16; 4] = [FOREVER, 10, 10, 0];
        let clock = ManualClock::new(0);
        let led = Led::new();
        let mut b = Blinker::new(led.pin(), &clock, PinState::Low);

        b.play(&SEQ);
        step(&mut b, &clock, 5);
        b.set_tick_time(3);
        step(&mut b, &clock, 6);
        assert!(!led.level.get(), "current element keeps its 10 ms");

        step(&mut b, &clock, 30);
        assert!(!led.level.get());
        step(&mut b, &clock, 1);
        assert!(led.level.get());
    }

    #[test]
    fn once_plays_to_terminator_and_toggles_out() {
        static SEQ: [u16; 4] = [5, 5, 5, 0];
        let clock = ManualClock::new(0);
        let led = Led::new();
        let mut b = Blinker::new(led.pin(), &clock, PinState::Low);

        b.play(&SEQ);
        assert_eq!(b.mode(), Some(PlayMode::Once));
        step(&mut b, &clock, 6);
        assert!(!led.level.get());
        step(&mut b, &clock, 6);
        assert!(led.level.get());
        step(&mut b, &clock, 6);
        assert!(!b.is_playing());
        assert!(!led.level.get());
        assert_eq!(led.toggles.get(), 4);
    }

    #[test]
    fn forever_runs_until_stopped() {
        static SEQ: [u16; 4] = [FOREVER, 5, 5, 0];
        let clock = ManualClock::new(0);
        let led = Led::new();
        let mut b = Blinker::new(led.pin(), &clock, PinState::Low);

        b.play(&SEQ);
        step(&mut b, &clock, 1_000);
        assert!(b.is_playing());
        assert!(led.toggles.get() > 100);

        b.stop(PinState::High);
        assert!(!b.is_playing());
        assert!(led.level.get());
        let toggles = led.toggles.get();
        step(&mut b, &clock, 100);
        assert_eq!(led.toggles.get(), toggles);
    }

    #[test]
    fn slice_end_acts_as_terminator() {
        static SEQ: [u16; 3] = [FOREVER, 5, 5];
        let clock = ManualClock::new(0);
        let led = Led::new();
        let mut b = Blinker::new(led.pin(), &clock, PinState::Low);

        b.play(&SEQ);
        step(&mut b, &clock, 100);
        assert!(b.is_playing());
    }

    #[test]
    fn invalid_patterns_are_ignored() {
        static ZERO_REPEAT: [u16; 3] = [repeat(0), 10, 0];
        static NO_COMMANDS: [u16; 2] = [FOREVER, 0];
        static EMPTY_ONCE: [u16; 1] = [0];
        static EMPTY: [u16; 0] = [];
        let clock = ManualClock::new(0);
        let led = Led::new();
        let mut b = Blinker::new(led.pin(), &clock, PinState::Low);

        assert_eq!(Pattern::parse(&ZERO_REPEAT), Err(PatternError::ZeroRepeat));
        assert_eq!(Pattern::parse(&NO_COMMANDS), Err(PatternError::NoCommands));
        assert_eq!(Pattern::parse(&EMPTY_ONCE), Err(PatternError::NoCommands));
        assert_eq!(Pattern::parse(&EMPTY), Err(PatternError::Empty));

        for seq in [&ZERO_REPEAT[..], &NO_COMMANDS[..], &EMPTY_ONCE[..], &EMPTY[..]] {
            b.play(seq);
            assert!(!b.is_playing());
        }
        assert_eq!(led.toggles.get(), 0);
    }

    #[test]
    fn zero_tick_time_is_ignored() {
        static SEQ: [u16; 4] = [FOREVER, 5, 5, 0];
        let clock = ManualClock::new(0);
        let led = Led::new();
        let mut b = Blinker::new(led.pin(), &clock, PinState::Low);
        b.set_tick_time(0);

        b.play(&SEQ);
        assert!(!b.is_playing());
        assert!(!led.level.get());
    }

    #[test]
    fn missed_deadlines_collapse_into_one_toggle() {
        static SEQ: [u16; 4] = [FOREVER, 10, 10, 0];
        let clock = ManualClock::new(0);
        let led = Led::new();
        let mut b = Blinker::new(led.pin(), &clock, PinState::Low);

        b.play(&SEQ);
        let after_play = led.toggles.get();
        clock.advance(100);
        b.update();
        assert_eq!(led.toggles.get(), after_play + 1);
        b.update();
        assert_eq!(led.toggles.get(), after_play + 1);

        // Timer resynced to the late poll, not to the missed schedule.
        step(&mut b, &clock, 10);
        assert_eq!(led.toggles.get(), after_play + 1);
        step(&mut b, &clock, 1);
        assert_eq!(led.toggles.get(), after_play + 2);
    }

    #[test]
    fn update_without_elapsed_time_is_idempotent() {
        static SEQ: [u16; 4] = [FOREVER, 10, 10, 0];
        let clock = ManualClock::new(0);
        let led = Led::new();
        let mut b = Blinker::new(led.pin(), &clock, PinState::Low);

        b.play(&SEQ);
        step(&mut b, &clock, 15);
        let toggles = led.toggles.get();
        for _ in 0..100 {
            b.update();
        }
        assert_eq!(led.toggles.get(), toggles);
    }

    #[test]
    fn replay_after_stop_starts_fresh() {
        static FIRST: [u16; 4] = [FOREVER, 7, 3, 0];
        static SECOND: [u16; 4] = [repeat(1), 10, 10, 0];
        let clock = ManualClock::new(0);
        let led = Led::new();
        let mut b = Blinker::new(led.pin(), &clock, PinState::Low);

        b.play(&FIRST);
        step(&mut b, &clock, 13);
        b.stop(PinState::Low);
        b.play(&SECOND);
        assert!(led.level.get());
        assert_eq!(b.mode(), Some(PlayMode::Repeat(1)));

        step(&mut b, &clock, 10);
        assert!(led.level.get());
        step(&mut b, &clock, 1);
        assert!(!led.level.get());
        step(&mut b, &clock, 11);
        assert!(!b.is_playing());
        assert!(!led.level.get());
    }

    #[test]
    fn play_replaces_running_pattern() {
        static SLOW: [u16; 4] = [FOREVER, 500, 500, 0];
        static FAST: [u16; 4] = [repeat(2), 5, 5, 0];
        let clock = ManualClock::new(0);
        let led = Led::new();
        let mut b = Blinker::new(led.pin(), &clock, PinState::Low);

        b.play(&SLOW);
        step(&mut b, &clock, 100);
        b.play(&FAST);
        step(&mut b, &clock, 30);
        assert!(!b.is_playing());
    }

    #[test]
    fn playback_across_32_bit_wraparound() {
        static SEQ: [u16; 4] = [repeat(2), 10, 10, 0];
        let clock = ManualClock::new(u32::MAX - 20);
        let led = Led::new();
        let mut b = Blinker::new(led.pin(), &clock, PinState::Low);

        b.play(&SEQ);
        step(&mut b, &clock, 43);
        assert!(b.is_playing());
        step(&mut b, &clock, 1);
        assert!(!b.is_playing());
        assert_eq!(led.toggles.get(), 4);
    }

    #[test]
    fn manual_on_off() {
        let clock = ManualClock::new(0);
        let led = Led::new();
        let mut b = Blinker::new(led.pin(), &clock, PinState::High);
        assert!(b.is_on());
        b.off();
        assert!(!led.level.get());
        b.on();
        assert!(led.level.get());
        assert_eq!(b.tick_time(), DEFAULT_TICK_MS);
    }
}

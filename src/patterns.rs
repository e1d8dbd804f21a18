//! Header encoders and the stock blink patterns used by the doorbell.
//!
//! All durations below are in ticks, which are milliseconds at the default
//! tick time.

use crate::blink::PARAM_MASK;

/// Play the sequence once. The header is the first on-duration itself.
pub const ONCE: u16 = 0x0000;
pub const REPEAT: u16 = 0x4000;
pub const TIMED: u16 = 0x8000;
pub const FOREVER: u16 = 0xC000;

/// Header for a cycle played `count` times (at most 16383).
pub const fn repeat(count: u16) -> u16 {
    REPEAT | (count & PARAM_MASK)
}

/// Header for a cycle looped for `ticks` ticks (at most 16383).
pub const fn timed(ticks: u16) -> u16 {
    TIMED | (ticks & PARAM_MASK)
}

/// Boot jingle: three short blinks then a long one, five times.
pub static STARTUP: [u16; 8] = [repeat(5), 100, 100, 100, 100, 100, 500, 0];

/// Audio player did not answer: fast flicker for two seconds.
pub static PLAYER_ERROR: [u16; 4] = [timed(2000), 20, 20, 0];

/// Settings are being edited.
pub static EDIT: [u16; 4] = [FOREVER, 1000, 50, 0];

/// Idle heartbeat.
pub static IDLE: [u16; 4] = [FOREVER, 100, 5000, 0];

/// A ringtone is playing.
pub static RINGING: [u16; 4] = [FOREVER, 200, 200, 0];

pub static MISSING_DEFAULT: [u16; 4] = [FOREVER, 50, 50, 0];

pub static GENERAL_ERROR: [u16; 4] = [FOREVER, 50, 50, 0];

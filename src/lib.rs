#![cfg_attr(not(test), no_std)]

pub mod blink;
pub mod clock;
pub mod debounce;
pub mod indicator;
pub mod input;
pub mod patterns;

#[cfg(feature = "firmware")]
pub mod wiring;

#[cfg(test)]
mod testing;

//! Control firmware for a scanning obstacle-avoiding robot
//!
//! The behavior, UI and melody logic are written against `embedded-hal`
//! traits and the small seam traits in [`drivers`], so they run unchanged on
//! the ATmega128 board and in host tests. The register-level board glue lives
//! in `hal` and is only built for AVR with the `board` feature.
#![cfg_attr(not(test), no_std)]
#![cfg_attr(
    all(feature = "board", target_arch = "avr"),
    feature(abi_avr_interrupt)
)]

#[macro_use]
mod logger;

pub mod application;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod os;
pub mod rtos;

#[cfg(all(feature = "board", target_arch = "avr"))]
pub mod hal;

#[cfg(test)]
pub mod testing;

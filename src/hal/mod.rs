//! ATmega128 board support
//!
//! Thin glue between the chip's registers and the `embedded-hal` traits the
//! rest of the crate is written against. Every driver here consumes the
//! `avr-device` peripheral it programs, so each block has a single owner.

pub mod gpio;
pub mod power;
pub mod pwm;
pub mod spi;
pub mod timer;
pub mod twi;
pub mod uart;

pub use gpio::{DynPin, Gpio, Port};
pub use power::Power;
pub use pwm::ServoPwm;
pub use spi::Spi;
pub use timer::{Delay, Micros, Millis};
pub use twi::{Twi, TwiError};
pub use uart::Usart0;

//! Timer0 as the 1 ms system tick
//!
//! CTC mode, 16 MHz / 64 = 250 kHz, compare at 249: one interrupt per
//! millisecond and one counter step per 4 µs. The microsecond clock combines
//! both.

use core::cell::Cell;

use avr_device::atmega128a::TC0;
use avr_device::interrupt::{self, Mutex};
use embedded_hal::blocking::delay::DelayUs;

use crate::drivers::MicrosTimer;
use crate::os::{Clock, Tick};

const WGM01: u8 = 1 << 3;
/// CS02 on Timer0 is clk/64
const PRESCALE_64: u8 = 1 << 2;
const OCIE0: u8 = 1 << 1;
const OCF0: u8 = 1 << 1;
const COMPARE_TOP: u8 = 249;
const US_PER_COUNT: u32 = 4;

static MILLIS: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

/// Starts the tick and gives up Timer0 for good. Interrupts must be enabled
/// afterwards for it to count.
pub fn init(tc0: TC0) {
    // SAFETY: raw bit patterns from the Timer0 register description
    unsafe {
        tc0.tccr0.write(|w| w.bits(0));
        tc0.tcnt0.write(|w| w.bits(0));
        tc0.ocr0.write(|w| w.bits(COMPARE_TOP));
        tc0.tifr.write(|w| w.bits(OCF0));
        tc0.timsk.modify(|r, w| w.bits(r.bits() | OCIE0));
        tc0.tccr0.write(|w| w.bits(WGM01 | PRESCALE_64));
    }
}

#[avr_device::interrupt(atmega128a)]
fn TIMER0_COMP() {
    interrupt::free(|cs| {
        let millis = MILLIS.borrow(cs);
        millis.set(millis.get().wrapping_add(1));
    });
}

/// Millisecond [`Clock`] fed by the tick interrupt.
#[derive(Clone, Copy, Default)]
pub struct Millis;

impl Clock for Millis {
    fn now(&self) -> Tick {
        Tick::from_millis(interrupt::free(|cs| MILLIS.borrow(cs).get()))
    }
}

/// Microsecond counter with 4 µs resolution.
#[derive(Clone, Copy, Default)]
pub struct Micros;

impl MicrosTimer for Micros {
    fn now_us(&self) -> u32 {
        // SAFETY: read-only access to a timer that `init` configured once
        let tc0 = unsafe { &*TC0::ptr() };
        interrupt::free(|cs| {
            let mut ms = MILLIS.borrow(cs).get();
            let mut count = tc0.tcnt0.read().bits();
            if tc0.tifr.read().bits() & OCF0 != 0 {
                // Compare hit while we held interrupts off
                ms = ms.wrapping_add(1);
                count = tc0.tcnt0.read().bits();
            }
            ms.wrapping_mul(1000)
                .wrapping_add(count as u32 * US_PER_COUNT)
        })
    }
}

/// Busy-wait delay on the microsecond counter. Needs the tick running.
#[derive(Clone, Copy, Default)]
pub struct Delay;

impl DelayUs<u16> for Delay {
    fn delay_us(&mut self, us: u16) {
        let start = Micros.now_us();
        while Micros.now_us().wrapping_sub(start) < us as u32 {}
    }
}

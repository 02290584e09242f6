//! Timer1 channel A as a 50 Hz servo PWM
//!
//! Fast PWM with ICR1 as top: 16 MHz / 8 = 2 MHz, 40000 counts per 20 ms
//! frame. Output on OC1A.

use avr_device::atmega128a::TC1;
use embedded_hal::PwmPin;

const FRAME_COUNTS: u16 = 40_000;

const COM1A1: u8 = 1 << 7;
const WGM11: u8 = 1 << 1;
const WGM12: u8 = 1 << 3;
const WGM13: u8 = 1 << 4;
const CS11: u8 = 1 << 1;

pub struct ServoPwm {
    tc1: TC1,
    duty: u16,
}

impl ServoPwm {
    /// Starts the timer with the output disconnected. The OC1A pin must be
    /// configured as an output.
    pub fn new(tc1: TC1) -> Self {
        // SAFETY: raw bit patterns from the Timer1 register description
        unsafe {
            tc1.tccr1b.write(|w| w.bits(0));
            tc1.icr1.write(|w| w.bits(FRAME_COUNTS - 1));
            tc1.tccr1a.write(|w| w.bits(WGM11));
            tc1.tccr1b.write(|w| w.bits(WGM13 | WGM12 | CS11));
        }
        Self { tc1, duty: 0 }
    }
}

impl PwmPin for ServoPwm {
    type Duty = u16;

    fn disable(&mut self) {
        // SAFETY: only the COM1A1 bit changes
        self.tc1
            .tccr1a
            .modify(|r, w| unsafe { w.bits(r.bits() & !COM1A1) });
    }

    fn enable(&mut self) {
        // SAFETY: only the COM1A1 bit changes
        self.tc1
            .tccr1a
            .modify(|r, w| unsafe { w.bits(r.bits() | COM1A1) });
    }

    fn get_duty(&self) -> u16 {
        self.duty
    }

    fn get_max_duty(&self) -> u16 {
        FRAME_COUNTS
    }

    fn set_duty(&mut self, duty: u16) {
        let duty = duty.min(FRAME_COUNTS - 1);
        // 16-bit write goes through the shared TEMP register
        avr_device::interrupt::free(|_| {
            // SAFETY: any count below top is a valid compare value
            self.tc1.ocr1a.write(|w| unsafe { w.bits(duty) });
        });
        self.duty = duty;
    }
}

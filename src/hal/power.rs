use avr_device::atmega128a::CPU;

const SE: u8 = 1 << 5;
/// SM1, SM0 and SM2; all clear selects Idle
const SM_MASK: u8 = (1 << 4) | (1 << 3) | (1 << 2);

pub struct Power {
    cpu: CPU,
}

impl Power {
    pub fn new(cpu: CPU) -> Self {
        Self { cpu }
    }

    /// Sleeps until the next interrupt. Timers and the USART keep running,
    /// so the 1 ms tick bounds the nap.
    pub fn enter_idle_mode(&mut self) {
        // SAFETY: only the sleep bits change
        self.cpu
            .mcucr
            .modify(|r, w| unsafe { w.bits((r.bits() & !SM_MASK) | SE) });
        avr_device::asm::sleep();
        self.cpu
            .mcucr
            .modify(|r, w| unsafe { w.bits(r.bits() & !SE) });
    }
}

use core::convert::Infallible;

use avr_device::atmega128a::{PORTA, PORTB, PORTC};
use embedded_hal::digital::v2::{InputPin, OutputPin};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Port {
    A,
    B,
    C,
}

/// Runs `$body` with the PINx, DDRx and PORTx registers of `$port` bound.
macro_rules! on_port {
    ($port:expr, |$pin:ident, $ddr:ident, $out:ident| $body:expr) => {
        // SAFETY: the port blocks are owned by `Gpio`; every pin only
        // touches its own bit, read-modify-writes run with interrupts off
        unsafe {
            match $port {
                Port::A => {
                    let p = &*PORTA::ptr();
                    let ($pin, $ddr, $out) = (&p.pina, &p.ddra, &p.porta);
                    $body
                }
                Port::B => {
                    let p = &*PORTB::ptr();
                    let ($pin, $ddr, $out) = (&p.pinb, &p.ddrb, &p.portb);
                    $body
                }
                Port::C => {
                    let p = &*PORTC::ptr();
                    let ($pin, $ddr, $out) = (&p.pinc, &p.ddrc, &p.portc);
                    $body
                }
            }
        }
    };
}

/// The GPIO ports the robot is wired to.
pub struct Gpio {
    _porta: PORTA,
    _portb: PORTB,
    _portc: PORTC,
}

impl Gpio {
    pub fn new(porta: PORTA, portb: PORTB, portc: PORTC) -> Self {
        Self {
            _porta: porta,
            _portb: portb,
            _portc: portc,
        }
    }

    /// Configures the pin as a push-pull output driven low.
    pub fn output(&mut self, (port, bit): (Port, u8)) -> DynPin {
        let mask = 1 << bit;
        avr_device::interrupt::free(|_| {
            on_port!(port, |_pin, ddr, out| {
                out.modify(|r, w| w.bits(r.bits() & !mask));
                ddr.modify(|r, w| w.bits(r.bits() | mask));
            })
        });
        DynPin { port, mask }
    }

    /// Configures the pin as a floating input.
    pub fn input(&mut self, (port, bit): (Port, u8)) -> DynPin {
        let mask = 1 << bit;
        avr_device::interrupt::free(|_| {
            on_port!(port, |_pin, ddr, out| {
                ddr.modify(|r, w| w.bits(r.bits() & !mask));
                out.modify(|r, w| w.bits(r.bits() & !mask));
            })
        });
        DynPin { port, mask }
    }
}

/// A GPIO line whose port is chosen at run time, so pins on different ports
/// share one type.
#[derive(Debug)]
pub struct DynPin {
    port: Port,
    mask: u8,
}

impl OutputPin for DynPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        let mask = self.mask;
        avr_device::interrupt::free(|_| {
            on_port!(self.port, |_pin, _ddr, out| out
                .modify(|r, w| w.bits(r.bits() & !mask)))
        });
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        let mask = self.mask;
        avr_device::interrupt::free(|_| {
            on_port!(self.port, |_pin, _ddr, out| out
                .modify(|r, w| w.bits(r.bits() | mask)))
        });
        Ok(())
    }
}

impl InputPin for DynPin {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        let mask = self.mask;
        Ok(on_port!(self.port, |pin, _ddr, _out| pin.read().bits() & mask != 0))
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

/// Board wiring
pub mod board {
    use super::Port;

    /// Wheel H-bridge inputs: (forward, backward)
    pub const RIGHT_FRONT: (Port, u8, u8) = (Port::A, 0, 1);
    pub const RIGHT_BACK: (Port, u8, u8) = (Port::A, 2, 3);
    pub const LEFT_FRONT: (Port, u8, u8) = (Port::A, 4, 5);
    pub const LEFT_BACK: (Port, u8, u8) = (Port::A, 6, 7);

    pub const LED_RED: (Port, u8) = (Port::C, 0);
    pub const LED_GREEN: (Port, u8) = (Port::C, 1);
    pub const LED_BLUE: (Port, u8) = (Port::C, 2);
    pub const BUZZER: (Port, u8) = (Port::C, 3);

    pub const SONAR_TRIGGER: (Port, u8) = (Port::C, 4);
    pub const SONAR_ECHO: (Port, u8) = (Port::C, 5);

    /// OC1A
    pub const SERVO: (Port, u8) = (Port::B, 5);

    /// SPI lines. SS doubles as the display's chip select.
    pub const SPI_SS: (Port, u8) = (Port::B, 0);
    pub const SPI_SCK: (Port, u8) = (Port::B, 1);
    pub const SPI_MOSI: (Port, u8) = (Port::B, 2);
    pub const DISPLAY_DC: (Port, u8) = (Port::B, 4);
}

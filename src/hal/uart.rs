//! USART0 with an interrupt-fed receive ring
//!
//! The RX interrupt only queues bytes; the control loop drains them through
//! [`embedded_hal::serial::Read`]. Transmission polls the data register.

use core::cell::RefCell;
use core::convert::Infallible;

use avr_device::atmega128a::USART0;
use avr_device::interrupt::{self, Mutex};
use embedded_hal::serial::{Read, Write};

use crate::config::{CPU_FREQ_HZ, UART_BAUD};

// Power of two so indices wrap with a mask
const BUFFER_SIZE: usize = 32;
const BUFFER_MASK: usize = BUFFER_SIZE - 1;

const U2X: u8 = 1 << 1;
const UDRE: u8 = 1 << 5;
const RXCIE: u8 = 1 << 7;
const RXEN: u8 = 1 << 4;
const TXEN: u8 = 1 << 3;
/// 8 data bits, no parity, 1 stop bit
const FRAME_8N1: u8 = 0x06;

struct Buffer {
    data: [u8; BUFFER_SIZE],
    write_idx: usize,
    read_idx: usize,
}

impl Buffer {
    const fn new() -> Self {
        Self {
            data: [0; BUFFER_SIZE],
            write_idx: 0,
            read_idx: 0,
        }
    }

    /// Drops the byte when full.
    fn write(&mut self, byte: u8) -> bool {
        let next_write = (self.write_idx + 1) & BUFFER_MASK;
        if next_write != self.read_idx {
            self.data[self.write_idx] = byte;
            self.write_idx = next_write;
            true
        } else {
            false
        }
    }

    fn read(&mut self) -> Option<u8> {
        if self.read_idx != self.write_idx {
            let byte = self.data[self.read_idx];
            self.read_idx = (self.read_idx + 1) & BUFFER_MASK;
            Some(byte)
        } else {
            None
        }
    }
}

static RX_BUFFER: Mutex<RefCell<Buffer>> = Mutex::new(RefCell::new(Buffer::new()));

pub struct Usart0 {
    usart: USART0,
}

impl Usart0 {
    pub fn new(usart: USART0) -> Self {
        // Double speed keeps 115200 baud within 2.1% at 16 MHz
        let ubrr = (CPU_FREQ_HZ / (8 * UART_BAUD) - 1) as u16;
        // SAFETY: raw bit patterns from the USART register description
        unsafe {
            usart.ubrr0h.write(|w| w.bits((ubrr >> 8) as u8));
            usart.ubrr0l.write(|w| w.bits(ubrr as u8));
            usart.ucsr0a.write(|w| w.bits(U2X));
            usart.ucsr0c.write(|w| w.bits(FRAME_8N1));
            usart.ucsr0b.write(|w| w.bits(RXCIE | RXEN | TXEN));
        }
        Self { usart }
    }

    fn data_register_empty(&self) -> bool {
        self.usart.ucsr0a.read().bits() & UDRE != 0
    }
}

impl Read<u8> for Usart0 {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        interrupt::free(|cs| RX_BUFFER.borrow(cs).borrow_mut().read()).ok_or(nb::Error::WouldBlock)
    }
}

impl Write<u8> for Usart0 {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Infallible> {
        if !self.data_register_empty() {
            return Err(nb::Error::WouldBlock);
        }
        // SAFETY: any byte is a valid data register value
        self.usart.udr0.write(|w| unsafe { w.bits(word) });
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        if self.data_register_empty() {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

#[avr_device::interrupt(atmega128a)]
fn USART0_RX() {
    // SAFETY: the ISR only reads UDR0, which the owner never reads
    let byte = unsafe { (*USART0::ptr()).udr0.read().bits() };
    interrupt::free(|cs| {
        RX_BUFFER.borrow(cs).borrow_mut().write(byte);
    });
}

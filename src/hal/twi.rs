//! TWI (I2C) master, write transfers only

use avr_device::atmega128a::TWI;
use embedded_hal::blocking::i2c::Write;

const TWINT: u8 = 1 << 7;
const TWSTA: u8 = 1 << 5;
const TWSTO: u8 = 1 << 4;
const TWEN: u8 = 1 << 2;

/// TWI status codes
const START: u8 = 0x08;
const REP_START: u8 = 0x10;
const ADDR_WRITE_ACK: u8 = 0x18;
const DATA_WRITE_ACK: u8 = 0x28;

/// Polls before a bus step is given up
const SPIN_LIMIT: u16 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TwiError {
    Start,
    AddressNack,
    DataNack,
    Timeout,
}

pub struct Twi {
    twi: TWI,
}

impl Twi {
    /// 100 kHz at 16 MHz
    pub fn new(twi: TWI) -> Self {
        // SAFETY: raw bit patterns from the TWI register description
        unsafe {
            twi.twsr.write(|w| w.bits(0));
            twi.twbr.write(|w| w.bits(72));
            twi.twcr.write(|w| w.bits(TWEN));
        }
        Self { twi }
    }

    fn control(&mut self, bits: u8) {
        // SAFETY: TWINT/TWSTA/TWSTO/TWEN combinations only
        self.twi.twcr.write(|w| unsafe { w.bits(bits) });
    }

    fn step(&mut self, control: u8) -> Result<u8, TwiError> {
        self.control(control | TWINT | TWEN);
        let mut spins = 0;
        while self.twi.twcr.read().bits() & TWINT == 0 {
            spins += 1;
            if spins > SPIN_LIMIT {
                return Err(TwiError::Timeout);
            }
        }
        Ok(self.twi.twsr.read().bits() & 0xF8)
    }

    fn send(&mut self, byte: u8) -> Result<u8, TwiError> {
        // SAFETY: any byte is a valid data register value
        self.twi.twdr.write(|w| unsafe { w.bits(byte) });
        self.step(0)
    }

    fn transfer(&mut self, address: u8, bytes: &[u8]) -> Result<(), TwiError> {
        let status = self.step(TWSTA)?;
        if status != START && status != REP_START {
            return Err(TwiError::Start);
        }

        if self.send(address << 1)? != ADDR_WRITE_ACK {
            return Err(TwiError::AddressNack);
        }

        for &byte in bytes {
            if self.send(byte)? != DATA_WRITE_ACK {
                return Err(TwiError::DataNack);
            }
        }
        Ok(())
    }
}

impl Write for Twi {
    type Error = TwiError;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), TwiError> {
        let result = self.transfer(address, bytes);
        self.control(TWINT | TWSTO | TWEN);
        result
    }
}

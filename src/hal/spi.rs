//! SPI master, mode 0, MSB first, fosc/2

use core::convert::Infallible;

use avr_device::atmega128a::SPI;
use embedded_hal::blocking::spi::Write;

const SPE: u8 = 1 << 6;
const MSTR: u8 = 1 << 4;
const SPI2X: u8 = 1 << 0;
const SPIF: u8 = 1 << 7;

/// SCK, MOSI and SS must already be outputs, or a low SS drops the
/// peripheral out of master mode.
pub struct Spi {
    spi: SPI,
}

impl Spi {
    pub fn new(spi: SPI) -> Self {
        // SAFETY: raw bit patterns from the SPI register description
        unsafe {
            spi.spcr.write(|w| w.bits(SPE | MSTR));
            spi.spsr.write(|w| w.bits(SPI2X));
        }
        Self { spi }
    }
}

impl Write<u8> for Spi {
    type Error = Infallible;

    fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
        for &byte in words {
            // SAFETY: any byte is a valid data register value
            self.spi.spdr.write(|w| unsafe { w.bits(byte) });
            while self.spi.spsr.read().bits() & SPIF == 0 {}
        }
        Ok(())
    }
}

use embedded_hal::serial::{Read, Write};
use ufmt::uWrite;

/// Command input and status output over one serial port.
///
/// Reads never block: a byte that has not arrived yet reads as `None`.
pub struct SerialConsole<S> {
    serial: S,
}

impl<S> SerialConsole<S>
where
    S: Read<u8> + Write<u8>,
{
    pub fn new(serial: S) -> Self {
        Self { serial }
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        self.serial.read().ok()
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<(), <S as Write<u8>>::Error> {
        nb::block!(self.serial.write(byte))
    }

    pub fn write_line(&mut self, s: &str) -> Result<(), <S as Write<u8>>::Error> {
        self.write_str(s)?;
        self.write_str("\r\n")
    }

    pub fn release(self) -> S {
        self.serial
    }
}

impl<S> uWrite for SerialConsole<S>
where
    S: Read<u8> + Write<u8>,
{
    type Error = <S as Write<u8>>::Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        for byte in s.bytes() {
            self.write_byte(byte)?;
        }
        Ok(())
    }
}

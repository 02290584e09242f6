//! 16x2 HD44780 character panel behind a PCF8574 I2C backpack
//!
//! The backpack maps P0 = RS, P2 = EN, P3 = backlight and P4..P7 = D4..D7, so
//! the controller runs in 4-bit mode. Every byte costs four bus writes plus
//! the controller's settle time, which is why [`StatusPanel::show`] rewrites
//! a row only when its text changed.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::i2c::Write;
use heapless::String;

use super::StatusPanel;

pub const DEFAULT_ADDRESS: u8 = 0x27;
pub const COLUMNS: usize = 16;

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x06;
const CMD_DISPLAY_OFF: u8 = 0x08;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const ROW_ADDRESS: [u8; 2] = [0x80, 0xC0];

pub struct Lcd1602<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    rows: [String<COLUMNS>; 2],
}

impl<I, D> Lcd1602<I, D>
where
    I: Write,
    D: DelayUs<u16>,
{
    /// Runs the 4-bit init sequence and clears the panel.
    pub fn new(i2c: I, delay: D, address: u8) -> Result<Self, I::Error> {
        let mut lcd = Self {
            i2c,
            delay,
            address,
            rows: [String::new(), String::new()],
        };
        lcd.init()?;
        Ok(lcd)
    }

    fn init(&mut self) -> Result<(), I::Error> {
        self.delay.delay_us(50_000);

        // Three times 8-bit mode to resync, then switch to 4-bit
        for settle in [5_000, 100, 100] {
            self.write_nibble(0x30, 0)?;
            self.delay.delay_us(settle);
        }
        self.write_nibble(0x20, 0)?;
        self.delay.delay_us(100);

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_OFF)?;
        self.command(CMD_CLEAR)?;
        self.delay.delay_us(2_000);
        self.command(CMD_ENTRY_MODE)?;
        self.command(CMD_DISPLAY_ON)
    }

    /// Writes `text` at the start of `row`, padded to the full width.
    pub fn write_row(&mut self, row: usize, text: &str) -> Result<(), I::Error> {
        self.command(ROW_ADDRESS[row % 2])?;
        let bytes = text.as_bytes();
        for col in 0..COLUMNS {
            self.data(bytes.get(col).copied().unwrap_or(b' '))?;
        }
        Ok(())
    }

    fn command(&mut self, cmd: u8) -> Result<(), I::Error> {
        self.write_byte(cmd, 0)
    }

    fn data(&mut self, byte: u8) -> Result<(), I::Error> {
        self.write_byte(byte, RS)
    }

    fn write_byte(&mut self, byte: u8, mode: u8) -> Result<(), I::Error> {
        let high = (byte & 0xF0) | mode | BACKLIGHT;
        let low = ((byte << 4) & 0xF0) | mode | BACKLIGHT;
        self.i2c
            .write(self.address, &[high | EN, high, low | EN, low])?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), I::Error> {
        let bits = (nibble & 0xF0) | mode | BACKLIGHT;
        self.i2c.write(self.address, &[bits | EN, bits])
    }

    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }
}

impl<I, D> StatusPanel for Lcd1602<I, D>
where
    I: Write,
    D: DelayUs<u16>,
{
    fn show(&mut self, line1: &str, line2: &str) {
        for (row, text) in [line1, line2].into_iter().enumerate() {
            let text = fit(text);
            if self.rows[row].as_str() == text {
                continue;
            }
            match self.write_row(row, text) {
                Ok(()) => {
                    self.rows[row].clear();
                    self.rows[row].push_str(text).ok();
                }
                Err(_) => {
                    warn!("status panel write failed, row {=usize}", row);
                    self.rows[row].clear();
                }
            }
        }
    }
}

/// Cuts `text` to the panel width on a char boundary.
fn fit(text: &str) -> &str {
    let mut end = text.len().min(COLUMNS);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

//! ST7735S 160x80 TFT in landscape, 16-bit color over SPI
//!
//! The 80-row panel sits in the middle of the controller's 132x162 RAM, so
//! every window is shifted by [`ROW_OFFSET`] before it reaches the chip.

use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{ContainsPoint, Rectangle};
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::spi::Write;
use embedded_hal::digital::v2::OutputPin;

pub const WIDTH: u32 = 160;
pub const HEIGHT: u32 = 80;

const COLUMN_OFFSET: u16 = 0;
const ROW_OFFSET: u16 = 26;

const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;

/// Row/column exchange plus column mirror: landscape, RGB order
const MADCTL_LANDSCAPE: u8 = 0x60;
const COLMOD_16BIT: u8 = 0x05;

/// Pixels sent per SPI burst when filling
const BURST_PIXELS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    Bus,
    Pin,
}

pub struct St7735<SPI, DC, CS> {
    spi: SPI,
    dc: DC,
    cs: CS,
}

impl<SPI, DC, CS> St7735<SPI, DC, CS>
where
    SPI: Write<u8>,
    DC: OutputPin,
    CS: OutputPin,
{
    /// Resets the controller, wakes it and turns the panel on.
    pub fn new<D: DelayUs<u16>>(
        spi: SPI,
        dc: DC,
        cs: CS,
        delay: &mut D,
    ) -> Result<Self, DisplayError> {
        let mut display = Self { spi, dc, cs };
        display.cs.set_high().map_err(|_| DisplayError::Pin)?;

        display.command(SWRESET, &[])?;
        delay_ms(delay, 150);
        display.command(SLPOUT, &[])?;
        delay_ms(delay, 150);
        display.command(MADCTL, &[MADCTL_LANDSCAPE])?;
        display.command(COLMOD, &[COLMOD_16BIT])?;
        display.command(DISPON, &[])?;
        delay_ms(delay, 100);

        Ok(display)
    }

    fn command(&mut self, cmd: u8, params: &[u8]) -> Result<(), DisplayError> {
        self.cs.set_low().map_err(|_| DisplayError::Pin)?;
        let result = self.command_selected(cmd, params);
        self.cs.set_high().map_err(|_| DisplayError::Pin)?;
        result
    }

    fn command_selected(&mut self, cmd: u8, params: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|_| DisplayError::Pin)?;
        self.spi.write(&[cmd]).map_err(|_| DisplayError::Bus)?;
        if !params.is_empty() {
            self.dc.set_high().map_err(|_| DisplayError::Pin)?;
            self.spi.write(params).map_err(|_| DisplayError::Bus)?;
        }
        Ok(())
    }

    /// Opens the inclusive window `(x0, y0)..=(x1, y1)` for a RAM write.
    fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), DisplayError> {
        let (x0, x1) = (x0 + COLUMN_OFFSET, x1 + COLUMN_OFFSET);
        let (y0, y1) = (y0 + ROW_OFFSET, y1 + ROW_OFFSET);
        self.command(CASET, &[(x0 >> 8) as u8, x0 as u8, (x1 >> 8) as u8, x1 as u8])?;
        self.command(RASET, &[(y0 >> 8) as u8, y0 as u8, (y1 >> 8) as u8, y1 as u8])
    }

    /// Streams `count` pixels of one color into the open window.
    fn write_color(&mut self, color: Rgb565, count: u32) -> Result<(), DisplayError> {
        let [hi, lo] = color.into_storage().to_be_bytes();
        let mut burst = [0u8; BURST_PIXELS * 2];
        for pair in burst.chunks_exact_mut(2) {
            pair[0] = hi;
            pair[1] = lo;
        }

        self.cs.set_low().map_err(|_| DisplayError::Pin)?;
        let result = self.command_selected(RAMWR, &[]).and_then(|()| {
            self.dc.set_high().map_err(|_| DisplayError::Pin)?;
            let mut left = count as usize;
            while left > 0 {
                let n = left.min(BURST_PIXELS);
                self.spi.write(&burst[..n * 2]).map_err(|_| DisplayError::Bus)?;
                left -= n;
            }
            Ok(())
        });
        self.cs.set_high().map_err(|_| DisplayError::Pin)?;
        result
    }

    pub fn release(self) -> (SPI, DC, CS) {
        (self.spi, self.dc, self.cs)
    }
}

fn delay_ms<D: DelayUs<u16>>(delay: &mut D, ms: u16) {
    for _ in 0..ms {
        delay.delay_us(1_000);
    }
}

impl<SPI, DC, CS> OriginDimensions for St7735<SPI, DC, CS> {
    fn size(&self) -> Size {
        Size::new(WIDTH, HEIGHT)
    }
}

impl<SPI, DC, CS> DrawTarget for St7735<SPI, DC, CS>
where
    SPI: Write<u8>,
    DC: OutputPin,
    CS: OutputPin,
{
    type Color = Rgb565;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let bounds = self.bounding_box();
        for Pixel(point, color) in pixels {
            if !bounds.contains(point) {
                continue;
            }
            let (x, y) = (point.x as u16, point.y as u16);
            self.set_window(x, y, x, y)?;
            self.write_color(color, 1)?;
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        self.set_window(
            area.top_left.x as u16,
            area.top_left.y as u16,
            bottom_right.x as u16,
            bottom_right.y as u16,
        )?;
        self.write_color(color, area.size.width * area.size.height)
    }
}

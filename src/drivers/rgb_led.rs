use embedded_hal::digital::v2::OutputPin;

use super::{Color, Indicator};

/// Common-cathode tri-color LED, one pin per channel.
pub struct RgbLed<P> {
    red: P,
    green: P,
    blue: P,
}

impl<P: OutputPin> RgbLed<P> {
    pub fn new(red: P, green: P, blue: P) -> Result<Self, P::Error> {
        let mut led = Self { red, green, blue };
        led.set(Color::Off)?;
        Ok(led)
    }

    pub fn set(&mut self, color: Color) -> Result<(), P::Error> {
        // Orange is red and green together
        let (r, g) = match color {
            Color::Off => (false, false),
            Color::Green => (false, true),
            Color::Red => (true, false),
            Color::Orange => (true, true),
        };
        write(&mut self.green, g)?;
        write(&mut self.red, r)?;
        self.blue.set_low()
    }
}

fn write<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), P::Error> {
    if high {
        pin.set_high()
    } else {
        pin.set_low()
    }
}

impl<P: OutputPin> Indicator for RgbLed<P> {
    fn set_color(&mut self, color: Color) {
        self.set(color).ok();
    }
}
